use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: Plant catalog errors
/// - E3xxx: Plant tracking errors
/// - E4xxx: Watering reminder errors
/// - E5xxx: Notification errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    BadRequest,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    TokenExpired,
    TokenInvalid,
    PasswordTooWeak,

    // Plant catalog (E2xxx)
    PlantNotFound,
    PlantCategoryNotFound,
    PlantNameTaken,

    // Plant tracking (E3xxx)
    UserPlantNotFound,
    AlreadyTracking,

    // Watering reminders (E4xxx)
    ReminderNotFound,
    InvalidWateringTime,
    InvalidCadence,

    // Notifications (E5xxx)
    NotificationNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::ServiceUnavailable => "E0006",
            Self::BadRequest => "E0007",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::TokenExpired => "E1003",
            Self::TokenInvalid => "E1004",
            Self::PasswordTooWeak => "E1005",

            // Plant catalog
            Self::PlantNotFound => "E2001",
            Self::PlantCategoryNotFound => "E2002",
            Self::PlantNameTaken => "E2003",

            // Plant tracking
            Self::UserPlantNotFound => "E3001",
            Self::AlreadyTracking => "E3002",

            // Watering reminders
            Self::ReminderNotFound => "E4001",
            Self::InvalidWateringTime => "E4002",
            Self::InvalidCadence => "E4003",

            // Notifications
            Self::NotificationNotFound => "E5001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::InvalidWateringTime | Self::InvalidCadence => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::PlantNotFound | Self::PlantCategoryNotFound
            | Self::UserPlantNotFound | Self::ReminderNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EmailAlreadyExists | Self::PlantNameTaken | Self::AlreadyTracking => {
                StatusCode::CONFLICT
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_strings_are_unique() {
        let codes = [
            ErrorCode::InternalError,
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::InvalidCredentials,
            ErrorCode::PlantNotFound,
            ErrorCode::UserPlantNotFound,
            ErrorCode::ReminderNotFound,
            ErrorCode::InvalidWateringTime,
            ErrorCode::NotificationNotFound,
        ];
        let mut strings: Vec<&str> = codes.iter().map(|c| c.code()).collect();
        strings.sort();
        strings.dedup();
        assert_eq!(strings.len(), codes.len());
    }

    #[test]
    fn reminder_codes_map_to_expected_statuses() {
        assert_eq!(ErrorCode::InvalidWateringTime.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidCadence.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ReminderNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::AlreadyTracking.status_code(), StatusCode::CONFLICT);
    }
}
