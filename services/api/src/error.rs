use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// One field-level validation failure, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDetail {
    pub path: String,
    pub message: String,
}

impl FieldDetail {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// API service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldDetail>),
    #[error("no token provided")]
    NoToken,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    InvalidToken,
    #[error("user not found")]
    SessionUserNotFound,
    // Identical wording for unknown email, wrong password, and bad OTP —
    // the response body must not reveal which check failed.
    #[error("email or password is invalid")]
    InvalidCredential,
    #[error("email not verified")]
    Unverified,
    #[error("verification code expired")]
    ExpiredCredential,
    #[error("verification already pending")]
    VerificationPending,
    #[error("permission denied")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("role not found")]
    RoleNotFound,
    #[error("permission not found")]
    PermissionNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("role already exists")]
    RoleAlreadyExists,
    #[error("permission already exists")]
    PermissionAlreadyExists,
    #[error("missing data")]
    MissingData,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::NoToken => "NO_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::SessionUserNotFound => "SESSION_USER_NOT_FOUND",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::Unverified => "UNVERIFIED",
            Self::ExpiredCredential => "EXPIRED_CREDENTIAL",
            Self::VerificationPending => "VERIFICATION_PENDING",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RoleNotFound => "ROLE_NOT_FOUND",
            Self::PermissionNotFound => "PERMISSION_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::RoleAlreadyExists => "ROLE_ALREADY_EXISTS",
            Self::PermissionAlreadyExists => "PERMISSION_ALREADY_EXISTS",
            Self::MissingData => "MISSING_DATA",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_)
            | Self::SessionUserNotFound
            | Self::VerificationPending
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::NoToken
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::InvalidCredential
            | Self::Unverified
            | Self::ExpiredCredential => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::RoleNotFound | Self::PermissionNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::UserAlreadyExists | Self::RoleAlreadyExists | Self::PermissionAlreadyExists => {
                StatusCode::CONFLICT
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for all requests. 4xx are expected client errors; logging them here
        // would be noise. Internal errors need the anyhow chain logged so the
        // root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = match &self {
            Self::Validation(details) => serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
                "errors": details,
            }),
            _ => serde_json::json!({
                "kind": self.kind(),
                "message": self.to_string(),
            }),
        };
        (status, axum::Json(body)).into_response()
    }
}
