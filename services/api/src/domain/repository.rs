#![allow(async_fn_in_trait)]

use uuid::Uuid;

use peraccess_domain::pagination::PageRequest;
use peraccess_domain::permission::PermissionSet;

use crate::domain::types::{
    Credential, NameSortBy, NewUser, OneTimeToken, Permission, Role, RoleWithPermissions,
    Statistic, User, UserChanges, UserSortBy, UserWithRoles,
};
use crate::error::ApiError;

/// Repository for user rows and their role assignments.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Signin lookup: includes the password hash and the signin gates.
    async fn find_credential_by_email(&self, email: &str)
    -> Result<Option<Credential>, ApiError>;

    async fn find_with_roles(&self, id: Uuid) -> Result<Option<UserWithRoles>, ApiError>;

    /// Paginated listing. `search` matches email, firstname, or lastname.
    /// Returns the page of rows plus the total row count before paging.
    async fn list(
        &self,
        search: Option<&str>,
        sort_by: UserSortBy,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), ApiError>;

    /// Insert the user and its role assignments in one transaction.
    /// A duplicate email (including the check-then-insert race) surfaces as
    /// `UserAlreadyExists`.
    async fn create_with_roles(
        &self,
        user: &NewUser,
        role_ids: &[Uuid],
        assigned_by: Uuid,
    ) -> Result<(), ApiError>;

    /// Apply the non-`None` changes; when `role_ids` is `Some`, replace the
    /// user's role assignments in the same transaction.
    async fn update(
        &self,
        id: Uuid,
        changes: &UserChanges,
        role_ids: Option<&[Uuid]>,
        assigned_by: Uuid,
    ) -> Result<(), ApiError>;

    /// Bulk delete. Returns the number of rows removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError>;

    /// Flatten the user's roles into a permission-name set. Called on every
    /// authorized request, so revocations take effect immediately.
    async fn permissions_of(&self, user_id: Uuid) -> Result<PermissionSet, ApiError>;
}

/// Repository for one-time email-verification tokens.
pub trait TokenRepository: Send + Sync {
    /// Find the pending (unused, unexpired) token for (email, purpose), if any.
    async fn find_pending(
        &self,
        email: &str,
        purpose: &str,
    ) -> Result<Option<OneTimeToken>, ApiError>;

    async fn create(&self, token: &OneTimeToken) -> Result<(), ApiError>;

    /// Find by the (code, reference_code, purpose) triple regardless of
    /// expiry or consumption — the flow distinguishes those failures itself.
    async fn find_by_code_and_reference(
        &self,
        code: &str,
        reference_code: &str,
        purpose: &str,
    ) -> Result<Option<OneTimeToken>, ApiError>;

    /// Mark a token consumed (sets `used_at = now`).
    async fn consume(&self, id: Uuid) -> Result<(), ApiError>;

    /// Delete the unconsumed tokens for (email, purpose). Called before a
    /// new code is issued and after a successful signup; consumed rows stay
    /// behind as a trace.
    async fn purge(&self, email: &str, purpose: &str) -> Result<(), ApiError>;
}

/// Repository for roles and their permission grants.
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, ApiError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, ApiError>;
    async fn find_with_permissions(&self, id: Uuid)
    -> Result<Option<RoleWithPermissions>, ApiError>;

    async fn list(
        &self,
        search: Option<&str>,
        sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Role>, u64), ApiError>;

    /// Insert the role and its permission grants in one transaction.
    /// A duplicate name surfaces as `RoleAlreadyExists`.
    async fn create_with_permissions(
        &self,
        role: &Role,
        permission_ids: &[Uuid],
        assigned_by: Uuid,
    ) -> Result<(), ApiError>;

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        permission_ids: Option<&[Uuid]>,
        assigned_by: Uuid,
    ) -> Result<(), ApiError>;

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError>;
}

/// Repository for the permission catalog.
pub trait PermissionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, ApiError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Permission>, ApiError>;

    async fn list(
        &self,
        search: Option<&str>,
        sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Permission>, u64), ApiError>;

    async fn create(&self, permission: &Permission) -> Result<(), ApiError>;
    async fn update_name(&self, id: Uuid, name: &str) -> Result<(), ApiError>;
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError>;
}

/// Repository for the denormalized dashboard counters.
pub trait StatisticRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Statistic>, ApiError>;

    /// Adjust a counter by `delta` with a single atomic UPDATE — never a
    /// read-modify-write.
    async fn adjust(&self, name: &str, delta: i64) -> Result<(), ApiError>;
}

/// Outbound mail port. Failures propagate to the caller as internal errors;
/// nothing is retried.
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ApiError>;
}

/// One-way password hashing with constant-time verification.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, ApiError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError>;
}
