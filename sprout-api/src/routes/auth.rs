use std::str::FromStr;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use validator::Validate;

use sprout_shared::errors::{AppError, AppResult, ErrorCode};
use sprout_shared::types::auth::{AccessToken, AuthUser, UserRole};
use sprout_shared::types::ApiResponse;

use crate::models::{NewUser, User};
use crate::schema::users;
use crate::services::{auth_service, token_service};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    auth_service::validate_password(&req.password)?;

    let password_hash = auth_service::hash_password(&req.password)?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let exists: i64 = users::table
        .filter(users::email.eq(req.email.to_lowercase()))
        .count()
        .get_result(&mut conn)?;
    if exists > 0 {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
    }

    let user: User = diesel::insert_into(users::table)
        .values(&NewUser {
            name: req.name,
            email: req.email.to_lowercase(),
            password_hash,
            role: UserRole::User.to_string(),
        })
        .get_result(&mut conn)?;

    let token = token_service::create_access_token(
        user.id,
        UserRole::User,
        &state.config.jwt_secret,
        state.config.jwt_access_ttl,
    )?;

    tracing::info!(user_id = user.id, email = %user.email, "user registered");

    Ok(Json(ApiResponse::ok(AccessToken::new(token, state.config.jwt_access_ttl))))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user = users::table
        .filter(users::email.eq(req.email.to_lowercase()))
        .first::<User>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    if !auth_service::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"));
    }

    let role = UserRole::from_str(&user.role).unwrap_or(UserRole::User);
    let token = token_service::create_access_token(
        user.id,
        role,
        &state.config.jwt_secret,
        state.config.jwt_access_ttl,
    )?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(ApiResponse::ok(AccessToken::new(token, state.config.jwt_access_ttl))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user = users::table
        .find(auth_user.id)
        .first::<User>(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => AppError::not_found("user not found"),
            other => AppError::Database(other),
        })?;

    Ok(Json(ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeviceTokenRequest {
    #[validate(length(min = 1, message = "device token must not be empty"))]
    pub fcm_token: String,
}

/// PUT /auth/device-token
/// Stores the mobile push token the dispatcher will deliver to.
pub async fn update_device_token(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Json(req): Json<DeviceTokenRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    diesel::update(users::table.find(auth_user.id))
        .set(users::fcm_token.eq(Some(req.fcm_token)))
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::ok_with_message(
        serde_json::json!({}),
        "device token updated",
    )))
}
