use uuid::Uuid;

use crate::domain::repository::{PasswordHasher, UserRepository};
use crate::error::ApiError;
use crate::usecase::session::issue_session_token;

pub struct SigninInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct SigninOutput {
    pub user_id: Uuid,
    pub session_token: String,
    pub session_exp: u64,
}

pub struct SigninUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub hasher: H,
    pub jwt_secret: String,
}

impl<U, H> SigninUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub async fn execute(&self, input: SigninInput) -> Result<SigninOutput, ApiError> {
        // Unknown email and wrong password must be indistinguishable to the
        // client — both map to the same InvalidCredential response.
        let credential = self
            .users
            .find_credential_by_email(&input.email)
            .await?
            .ok_or(ApiError::InvalidCredential)?;

        if !credential.status {
            return Err(ApiError::Forbidden);
        }
        if credential.email_verified_at.is_none() {
            return Err(ApiError::Unverified);
        }
        if !self
            .hasher
            .verify(&input.password, &credential.password_hash)?
        {
            return Err(ApiError::InvalidCredential);
        }

        let (session_token, session_exp) =
            issue_session_token(credential.user_id, &self.jwt_secret)?;
        Ok(SigninOutput {
            user_id: credential.user_id,
            session_token,
            session_exp,
        })
    }
}
