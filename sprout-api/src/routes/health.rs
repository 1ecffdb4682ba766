use axum::Json;

use sprout_shared::types::api::HealthResponse;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("sprout-api", env!("CARGO_PKG_VERSION")))
}
