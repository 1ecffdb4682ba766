use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use sprout_shared::errors::AppResult;
use sprout_shared::types::api::ApiResponse;
use sprout_shared::types::auth::AuthUser;
use sprout_shared::types::schedule::{Cadence, WallTime};

use crate::models::CustomizeWateringReminder;
use crate::services::reminder_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub plant_id: i32,
    pub time: WallTime,
    #[serde(rename = "type")]
    pub cadence: Cadence,
    #[serde(default)]
    pub recurring: bool,
}

/// POST /reminders/customized
///
/// The time and cadence deserialize through their strict parsers, so a
/// malformed "HH:MM" or an unknown cadence is rejected before it can reach
/// the database.
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Json(req): Json<CreateReminderRequest>,
) -> AppResult<Json<ApiResponse<CustomizeWateringReminder>>> {
    let reminder = reminder_service::create_customized(
        &state.db,
        auth_user.id,
        req.plant_id,
        req.time,
        req.cadence,
        req.recurring,
    )?;
    Ok(Json(ApiResponse::ok_with_message(reminder, "reminder created")))
}

/// GET /reminders/customized
pub async fn list_reminders(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<CustomizeWateringReminder>>>> {
    let reminders = reminder_service::list_customized(&state.db, auth_user.id)?;
    Ok(Json(ApiResponse::ok(reminders)))
}

/// DELETE /reminders/customized/:id
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    reminder_service::delete_customized(&state.db, id, auth_user.id)?;
    Ok(Json(ApiResponse::ok_with_message(serde_json::json!({}), "reminder deleted")))
}
