use chrono::Utc;
use uuid::Uuid;

use peraccess_domain::pagination::{PageRequest, total_pages};

use crate::domain::repository::{PasswordHasher, StatisticRepository, UserRepository};
use crate::domain::types::{
    NewUser, STAT_AMOUNT_USER, User, UserChanges, UserSortBy, UserWithRoles,
};
use crate::error::ApiError;

// ── CreateUser (admin) ───────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub status: bool,
    pub role_ids: Vec<Uuid>,
    /// The acting admin, recorded as `assigned_by` on the role rows.
    pub created_by: Uuid,
}

pub struct CreateUserUseCase<U, S, H>
where
    U: UserRepository,
    S: StatisticRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub statistics: S,
    pub hasher: H,
}

impl<U, S, H> CreateUserUseCase<U, S, H>
where
    U: UserRepository,
    S: StatisticRepository,
    H: PasswordHasher,
{
    pub async fn execute(&self, input: CreateUserInput) -> Result<User, ApiError> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let now = Utc::now();
        let user = NewUser {
            id: Uuid::now_v7(),
            email: input.email,
            password_hash,
            firstname: input.firstname,
            lastname: input.lastname,
            status: input.status,
            // Admin-created accounts still have to pass OTP verification
            // before they can sign in.
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users
            .create_with_roles(&user, &input.role_ids, input.created_by)
            .await?;
        self.statistics.adjust(STAT_AMOUNT_USER, 1).await?;

        Ok(User {
            id: user.id,
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
            status: user.status,
            email_verified_at: user.email_verified_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<UserWithRoles, ApiError> {
        self.users
            .find_with_roles(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
    pub total_pages: u64,
}

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        sort_by: UserSortBy,
        page: PageRequest,
    ) -> Result<UserPage, ApiError> {
        let page = page.clamped();
        let (users, total) = self.users.list(search, sort_by, page).await?;
        Ok(UserPage {
            users,
            total,
            total_pages: total_pages(total, page.page_size),
        })
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub status: Option<bool>,
    pub password: Option<String>,
    pub role_ids: Option<Vec<Uuid>>,
    pub updated_by: Uuid,
}

pub struct UpdateUserUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub users: U,
    pub hasher: H,
}

impl<U, H> UpdateUserUseCase<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub async fn execute(&self, user_id: Uuid, input: UpdateUserInput) -> Result<(), ApiError> {
        let changes = UserChanges {
            firstname: input.firstname,
            lastname: input.lastname,
            status: input.status,
            password_hash: input
                .password
                .map(|password| self.hasher.hash(&password))
                .transpose()?,
        };
        if changes.is_empty() && input.role_ids.is_none() {
            return Err(ApiError::MissingData);
        }
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ApiError::UserNotFound);
        }
        self.users
            .update(user_id, &changes, input.role_ids.as_deref(), input.updated_by)
            .await
    }
}

// ── DeleteUsers ──────────────────────────────────────────────────────────────

pub struct DeleteUsersUseCase<U, S>
where
    U: UserRepository,
    S: StatisticRepository,
{
    pub users: U,
    pub statistics: S,
}

impl<U, S> DeleteUsersUseCase<U, S>
where
    U: UserRepository,
    S: StatisticRepository,
{
    pub async fn execute(&self, user_ids: &[Uuid]) -> Result<u64, ApiError> {
        if user_ids.is_empty() {
            return Err(ApiError::MissingData);
        }
        let deleted = self.users.delete_many(user_ids).await?;
        if deleted > 0 {
            self.statistics
                .adjust(STAT_AMOUNT_USER, -(deleted as i64))
                .await?;
        }
        Ok(deleted)
    }
}
