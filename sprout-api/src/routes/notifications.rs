use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use sprout_shared::errors::AppResult;
use sprout_shared::types::api::ApiResponse;
use sprout_shared::types::auth::AuthUser;
use sprout_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::Notification;
use crate::services::notification_service;
use crate::AppState;

/// GET /notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Notification>>>> {
    let (items, total) = notification_service::list_notifications(
        &state.db,
        auth_user.id,
        params.limit() as i64,
        params.offset() as i64,
    )?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let unread = notification_service::count_unread(&state.db, auth_user.id)?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { unread })))
}

/// POST /notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = notification_service::mark_read(&state.db, id, auth_user.id)?;
    Ok(Json(ApiResponse::ok(notification)))
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub removed: usize,
}

/// DELETE /notifications
pub async fn clear_notifications(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<ClearedResponse>>> {
    let removed = notification_service::delete_all(&state.db, auth_user.id)?;
    Ok(Json(ApiResponse::ok_with_message(
        ClearedResponse { removed },
        "notifications cleared",
    )))
}
