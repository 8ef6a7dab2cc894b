use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{Mailer, TokenRepository};
use crate::domain::types::{OTP_TTL_SECS, OneTimeToken, PURPOSE_VERIFY_EMAIL};
use crate::error::ApiError;

/// Six-digit numeric verification code.
fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..1_000_000u32).to_string()
}

fn verification_email_html(code: &str, reference_code: &str) -> String {
    format!(
        "<html><body>\
         <p>Your PerAccess verification code is</p>\
         <h2>{code}</h2>\
         <p>It expires in 15 minutes.</p>\
         <p style=\"color:#888\">ref: {reference_code}</p>\
         </body></html>"
    )
}

pub struct RequestVerificationInput {
    pub email: String,
}

#[derive(Debug)]
pub struct RequestVerificationOutput {
    /// Opaque correlation id handed to the client in place of the code.
    pub reference_code: String,
}

pub struct RequestVerificationUseCase<T, M>
where
    T: TokenRepository,
    M: Mailer,
{
    pub tokens: T,
    pub mailer: M,
}

impl<T, M> RequestVerificationUseCase<T, M>
where
    T: TokenRepository,
    M: Mailer,
{
    pub async fn execute(
        &self,
        input: RequestVerificationInput,
    ) -> Result<RequestVerificationOutput, ApiError> {
        // 1. At most one pending code per (email, purpose) — a repeat request
        //    is a user error, not a crash.
        if self
            .tokens
            .find_pending(&input.email, PURPOSE_VERIFY_EMAIL)
            .await?
            .is_some()
        {
            return Err(ApiError::VerificationPending);
        }

        // 2. Drop expired leftovers, then persist a fresh code + correlation
        //    id with a 15-minute expiry.
        self.tokens
            .purge(&input.email, PURPOSE_VERIFY_EMAIL)
            .await?;
        let code = generate_code();
        let reference_code = Uuid::new_v4().to_string();
        let now = Utc::now();
        let token = OneTimeToken {
            id: Uuid::new_v4(),
            email: input.email.clone(),
            code: code.clone(),
            purpose: PURPOSE_VERIFY_EMAIL.to_owned(),
            reference_code: reference_code.clone(),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            used_at: None,
            created_at: now,
        };
        self.tokens.create(&token).await?;

        // 3. Dispatch the code by email. A failure here propagates as a 500;
        //    the already-persisted token just expires on its own.
        self.mailer
            .send(
                &input.email,
                "PerAccess : OTP Verification Code",
                &verification_email_html(&code, &reference_code),
            )
            .await?;

        Ok(RequestVerificationOutput { reference_code })
    }
}
