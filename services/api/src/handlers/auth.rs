use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use peraccess_auth_types::cookie::{clear_session_cookie, set_session_cookie};

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::signin::{SigninInput, SigninUseCase};
use crate::usecase::signup::{SignupInput, SignupUseCase};
use crate::usecase::verification::{RequestVerificationInput, RequestVerificationUseCase};
use crate::validation;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ── POST /api/signin ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::signin(&body.email, &body.password)?;

    let usecase = SigninUseCase {
        users: state.user_repo(),
        hasher: state.hasher,
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(SigninInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(
        jar,
        out.session_token,
        state.cookie_domain.clone(),
        state.cookie_secure,
    );
    Ok((
        StatusCode::OK,
        jar,
        Json(MessageResponse {
            message: "signed in successfully",
        }),
    ))
}

// ── POST /api/signup ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    /// The 6-digit code from the verification email.
    pub token: u32,
    pub reference_code: String,
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::signup(
        &body.firstname,
        &body.lastname,
        &body.email,
        &body.password,
        body.token,
        &body.reference_code,
    )?;

    let usecase = SignupUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        roles: state.role_repo(),
        statistics: state.statistic_repo(),
        hasher: state.hasher,
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(SignupInput {
            firstname: body.firstname.trim().to_owned(),
            lastname: body.lastname.trim().to_owned(),
            email: body.email,
            password: body.password,
            code: body.token.to_string(),
            reference_code: body.reference_code,
        })
        .await?;

    let jar = set_session_cookie(
        jar,
        out.session_token,
        state.cookie_domain.clone(),
        state.cookie_secure,
    );
    Ok((
        StatusCode::OK,
        jar,
        Json(MessageResponse {
            message: "signed up successfully",
        }),
    ))
}

// ── POST /api/signout ────────────────────────────────────────────────────────

pub async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let jar = clear_session_cookie(jar, state.cookie_domain.clone(), state.cookie_secure);
    Ok((StatusCode::NO_CONTENT, jar))
}

// ── POST /api/verify/email ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct VerifyEmailResponse {
    pub reference_code: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>, ApiError> {
    validation::verify_email(&body.email)?;

    let usecase = RequestVerificationUseCase {
        tokens: state.token_repo(),
        mailer: state.mailer.clone(),
    };
    let out = usecase
        .execute(RequestVerificationInput { email: body.email })
        .await?;

    Ok(Json(VerifyEmailResponse {
        reference_code: out.reference_code,
    }))
}
