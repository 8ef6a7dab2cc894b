//! Session extraction: `NoToken → Verifying → {Authorized | Rejected}`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use peraccess_auth_types::cookie::SESSION_COOKIE;
use peraccess_auth_types::token::{AuthError, validate_session_token};
use peraccess_domain::permission::PermissionSet;

use crate::domain::repository::UserRepository;
use crate::error::ApiError;
use crate::state::AppState;

/// Authorized request context: the signed identity resolved to a live user
/// record plus the flattened permission set.
///
/// The lookup runs on every request (no session cache), so a revoked role
/// takes effect on the very next request.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: String,
    pub permissions: PermissionSet,
}

impl AuthSession {
    /// Conjunctive permission gate. Every required name must be present;
    /// there is no partial-access concept.
    pub fn authorize(&self, required: &[&str]) -> Result<(), ApiError> {
        if self.permissions.allows_all(required) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    // axum-core defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract the cookie synchronously, then resolve the user in a 'static
    // async move block holding a cloned state handle.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token_value = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned());
        let state = state.clone();

        async move {
            let token_value = token_value.ok_or(ApiError::NoToken)?;

            // Expired and invalid are distinguished for client UX, not for
            // security.
            let info =
                validate_session_token(&token_value, &state.jwt_secret).map_err(|e| match e {
                    AuthError::Expired => ApiError::TokenExpired,
                    AuthError::InvalidSignature | AuthError::Malformed => ApiError::InvalidToken,
                })?;

            let users = state.user_repo();
            let user = users
                .find_by_id(info.user_id)
                .await?
                .ok_or(ApiError::SessionUserNotFound)?;
            let permissions = users.permissions_of(user.id).await?;

            Ok(Self {
                user_id: user.id,
                email: user.email,
                permissions,
            })
        }
    }
}
