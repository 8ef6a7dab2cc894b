use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{
    PasswordHasher, RoleRepository, StatisticRepository, TokenRepository, UserRepository,
};
use crate::domain::types::{DEFAULT_ROLE, NewUser, PURPOSE_VERIFY_EMAIL, STAT_AMOUNT_USER};
use crate::error::ApiError;
use crate::usecase::session::issue_session_token;

pub struct SignupInput {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    /// The 6-digit code the user received by email.
    pub code: String,
    /// The correlation id returned by the verification request.
    pub reference_code: String,
}

#[derive(Debug)]
pub struct SignupOutput {
    pub user_id: Uuid,
    pub session_token: String,
    pub session_exp: u64,
}

pub struct SignupUseCase<U, T, R, S, H>
where
    U: UserRepository,
    T: TokenRepository,
    R: RoleRepository,
    S: StatisticRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub tokens: T,
    pub roles: R,
    pub statistics: S,
    pub hasher: H,
    pub jwt_secret: String,
}

impl<U, T, R, S, H> SignupUseCase<U, T, R, S, H>
where
    U: UserRepository,
    T: TokenRepository,
    R: RoleRepository,
    S: StatisticRepository,
    H: PasswordHasher,
{
    pub async fn execute(&self, input: SignupInput) -> Result<SignupOutput, ApiError> {
        // 1. Email must be free; this runs before any token check.
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }

        // 2. Match the (code, reference_code) pair. Consumed → invalid,
        //    past expiry → expired.
        let token = self
            .tokens
            .find_by_code_and_reference(&input.code, &input.reference_code, PURPOSE_VERIFY_EMAIL)
            .await?
            .ok_or(ApiError::InvalidCredential)?;
        if token.is_used() {
            return Err(ApiError::InvalidCredential);
        }
        if token.is_expired() {
            return Err(ApiError::ExpiredCredential);
        }

        // 3. Consume the token and drop any leftover codes for this email.
        self.tokens.consume(token.id).await?;
        self.tokens.purge(&input.email, PURPOSE_VERIFY_EMAIL).await?;

        // 4. Create the verified user with the default role.
        let password_hash = self.hasher.hash(&input.password)?;
        let now = Utc::now();
        let user_id = Uuid::now_v7();
        let user = NewUser {
            id: user_id,
            email: input.email,
            password_hash,
            firstname: input.firstname,
            lastname: input.lastname,
            status: true,
            email_verified_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        let role_ids: Vec<Uuid> = self
            .roles
            .find_by_name(DEFAULT_ROLE)
            .await?
            .map(|role| vec![role.id])
            .unwrap_or_default();
        self.users
            .create_with_roles(&user, &role_ids, user_id)
            .await?;

        self.statistics.adjust(STAT_AMOUNT_USER, 1).await?;

        let (session_token, session_exp) = issue_session_token(user_id, &self.jwt_secret)?;
        Ok(SignupOutput {
            user_id,
            session_token,
            session_exp,
        })
    }
}
