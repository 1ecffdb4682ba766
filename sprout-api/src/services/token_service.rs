use jsonwebtoken::{encode, EncodingKey, Header};

use sprout_shared::errors::AppError;
use sprout_shared::types::auth::{Claims, UserRole};

pub fn create_access_token(
    user_id: i32,
    role: UserRole,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, role, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}
