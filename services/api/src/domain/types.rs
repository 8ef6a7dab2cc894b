use chrono::{DateTime, Utc};
use uuid::Uuid;

use peraccess_domain::pagination::Sort;

/// User profile as exposed to handlers. The password hash never leaves the
/// repository except inside [`Credential`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub status: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Signin-relevant slice of a user record, including the password hash.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub status: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub status: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a user row; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub status: Option<bool>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.firstname.is_none()
            && self.lastname.is_none()
            && self.status.is_none()
            && self.password_hash.is_none()
    }
}

/// A user together with the roles assigned to them.
#[derive(Debug, Clone)]
pub struct UserWithRoles {
    pub user: User,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role together with the permissions it grants.
#[derive(Debug, Clone)]
pub struct RoleWithPermissions {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One-time verification code bound to an email address. The client holds
/// the opaque `reference_code`; the numeric `code` travels only by email.
#[derive(Debug, Clone)]
pub struct OneTimeToken {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub purpose: String,
    pub reference_code: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeToken {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Pending = neither consumed nor expired.
    pub fn is_pending(&self) -> bool {
        !self.is_used() && !self.is_expired()
    }
}

/// Denormalized dashboard counter.
#[derive(Debug, Clone)]
pub struct Statistic {
    pub id: Uuid,
    pub name: String,
    pub amount: i64,
}

/// Purpose tag for email-verification tokens.
pub const PURPOSE_VERIFY_EMAIL: &str = "verify_email";

/// One-time token time-to-live in seconds (15 minutes).
pub const OTP_TTL_SECS: i64 = 900;

/// Statistic row names.
pub const STAT_AMOUNT_USER: &str = "amount_user";
pub const STAT_AMOUNT_ROLE: &str = "amount_role";
pub const STAT_AMOUNT_PERMISSION: &str = "amount_permission";

/// Name of the role every signup receives.
pub const DEFAULT_ROLE: &str = "user";

/// Sort options for user list queries.
#[derive(Debug, Clone, Copy)]
pub enum UserSortBy {
    CreatedAt(Sort),
    Email(Sort),
    Firstname(Sort),
    Lastname(Sort),
}

impl Default for UserSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl UserSortBy {
    /// Parse the `sortField` / `sortOrder` query pair.
    pub fn from_query(field: &str, order: Sort) -> Option<Self> {
        match field {
            "created_at" => Some(Self::CreatedAt(order)),
            "email" => Some(Self::Email(order)),
            "firstname" => Some(Self::Firstname(order)),
            "lastname" => Some(Self::Lastname(order)),
            _ => None,
        }
    }
}

/// Sort options for role and permission list queries (name or creation time).
#[derive(Debug, Clone, Copy)]
pub enum NameSortBy {
    CreatedAt(Sort),
    Name(Sort),
}

impl Default for NameSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl NameSortBy {
    pub fn from_query(field: &str, order: Sort) -> Option<Self> {
        match field {
            "created_at" => Some(Self::CreatedAt(order)),
            "name" => Some(Self::Name(order)),
            _ => None,
        }
    }
}
