use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use sprout_shared::errors::{AppError, AppResult, ErrorCode};
use sprout_shared::types::api::ApiResponse;
use sprout_shared::types::auth::AuthUser;

use crate::models::{Plant, UserPlant};
use crate::services::user_plant_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TrackedPlant {
    #[serde(flatten)]
    pub user_plant: UserPlant,
    pub plant: Plant,
}

/// GET /my/plants
pub async fn list_my_plants(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<TrackedPlant>>>> {
    let rows = user_plant_service::list_user_plants(&state.db, auth_user.id)?;

    let items = rows
        .into_iter()
        .map(|(user_plant, plant)| TrackedPlant { user_plant, plant })
        .collect();
    Ok(Json(ApiResponse::ok(items)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddPlantRequest {
    pub plant_id: i32,
    #[validate(length(min = 1, max = 100, message = "customize_name must be 1-100 characters"))]
    pub customize_name: Option<String>,
}

/// POST /my/plants
pub async fn add_my_plant(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Json(req): Json<AddPlantRequest>,
) -> AppResult<Json<ApiResponse<UserPlant>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let row = user_plant_service::add_user_plant(
        &state.db,
        auth_user.id,
        req.plant_id,
        req.customize_name,
    )?;
    Ok(Json(ApiResponse::ok_with_message(row, "plant added to your garden")))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenamePlantRequest {
    #[validate(length(min = 1, max = 100, message = "customize_name must be 1-100 characters"))]
    pub customize_name: String,
}

/// PUT /my/plants/:id/customize-name
pub async fn rename_my_plant(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(req): Json<RenamePlantRequest>,
) -> AppResult<Json<ApiResponse<UserPlant>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let row = user_plant_service::rename_user_plant(&state.db, id, auth_user.id, req.customize_name)?;
    Ok(Json(ApiResponse::ok(row)))
}

/// DELETE /my/plants/:id
pub async fn remove_my_plant(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    user_plant_service::remove_user_plant(&state.db, id, auth_user.id)?;
    Ok(Json(ApiResponse::ok_with_message(serde_json::json!({}), "plant removed from your garden")))
}
