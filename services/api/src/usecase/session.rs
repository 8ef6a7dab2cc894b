use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use peraccess_auth_types::cookie::SESSION_TOKEN_EXP;
use peraccess_auth_types::token::JwtClaims;

use crate::error::ApiError;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Issue a signed session token for `user_id`, expiring in 24 hours.
/// Returns the token and its absolute expiry (seconds since epoch).
pub fn issue_session_token(user_id: Uuid, secret: &str) -> Result<(String, u64), ApiError> {
    let exp = now_secs() + SESSION_TOKEN_EXP;
    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))?;
    Ok((token, exp))
}
