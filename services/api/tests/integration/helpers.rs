use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use peraccess_api::domain::repository::{
    Mailer, PasswordHasher, PermissionRepository, RoleRepository, StatisticRepository,
    TokenRepository, UserRepository,
};
use peraccess_api::domain::types::{
    Credential, NameSortBy, NewUser, OneTimeToken, PURPOSE_VERIFY_EMAIL, Permission, Role,
    RoleWithPermissions, Statistic, User, UserChanges, UserSortBy, UserWithRoles,
};
use peraccess_api::error::ApiError;
use peraccess_domain::pagination::PageRequest;
use peraccess_domain::permission::PermissionSet;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
    pub role_ids: Vec<Uuid>,
}

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<StoredUser>>>,
    pub permissions: PermissionSet,
}

impl MockUserRepo {
    pub fn new(users: Vec<StoredUser>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            permissions: PermissionSet::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the stored users for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<StoredUser>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user.id == id)
            .map(|s| s.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user.email == email)
            .map(|s| s.user.clone()))
    }

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user.email == email)
            .map(|s| Credential {
                user_id: s.user.id,
                email: s.user.email.clone(),
                password_hash: s.password_hash.clone(),
                status: s.user.status,
                email_verified_at: s.user.email_verified_at,
            }))
    }

    async fn find_with_roles(&self, id: Uuid) -> Result<Option<UserWithRoles>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user.id == id)
            .map(|s| UserWithRoles {
                user: s.user.clone(),
                roles: vec![],
            }))
    }

    async fn list(
        &self,
        search: Option<&str>,
        _sort_by: UserSortBy,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), ApiError> {
        let users = self.users.lock().unwrap();
        let matching: Vec<User> = users
            .iter()
            .filter(|s| {
                search.is_none_or(|term| {
                    s.user.email.contains(term)
                        || s.user.firstname.contains(term)
                        || s.user.lastname.contains(term)
                })
            })
            .map(|s| s.user.clone())
            .collect();
        let total = matching.len() as u64;
        let page_rows = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok((page_rows, total))
    }

    async fn create_with_roles(
        &self,
        user: &NewUser,
        role_ids: &[Uuid],
        _assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        // Simulates the unique index on email, including the race outcome.
        if users.iter().any(|s| s.user.email == user.email) {
            return Err(ApiError::UserAlreadyExists);
        }
        users.push(StoredUser {
            user: User {
                id: user.id,
                email: user.email.clone(),
                firstname: user.firstname.clone(),
                lastname: user.lastname.clone(),
                status: user.status,
                email_verified_at: user.email_verified_at,
                created_at: user.created_at,
                updated_at: user.updated_at,
            },
            password_hash: user.password_hash.clone(),
            role_ids: role_ids.to_vec(),
        });
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UserChanges,
        role_ids: Option<&[Uuid]>,
        _assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(stored) = users.iter_mut().find(|s| s.user.id == id) {
            if let Some(ref firstname) = changes.firstname {
                stored.user.firstname = firstname.clone();
            }
            if let Some(ref lastname) = changes.lastname {
                stored.user.lastname = lastname.clone();
            }
            if let Some(status) = changes.status {
                stored.user.status = status;
            }
            if let Some(ref password_hash) = changes.password_hash {
                stored.password_hash = password_hash.clone();
            }
            if let Some(role_ids) = role_ids {
                stored.role_ids = role_ids.to_vec();
            }
            stored.user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|s| !ids.contains(&s.user.id));
        Ok((before - users.len()) as u64)
    }

    async fn permissions_of(&self, _user_id: Uuid) -> Result<PermissionSet, ApiError> {
        Ok(self.permissions.clone())
    }
}

// ── MockTokenRepo ────────────────────────────────────────────────────────────

pub struct MockTokenRepo {
    pub tokens: Arc<Mutex<Vec<OneTimeToken>>>,
}

impl MockTokenRepo {
    pub fn new(tokens: Vec<OneTimeToken>) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn tokens_handle(&self) -> Arc<Mutex<Vec<OneTimeToken>>> {
        Arc::clone(&self.tokens)
    }
}

impl TokenRepository for MockTokenRepo {
    async fn find_pending(
        &self,
        email: &str,
        purpose: &str,
    ) -> Result<Option<OneTimeToken>, ApiError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.email == email && t.purpose == purpose && t.is_pending())
            .cloned())
    }

    async fn create(&self, token: &OneTimeToken) -> Result<(), ApiError> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn find_by_code_and_reference(
        &self,
        code: &str,
        reference_code: &str,
        purpose: &str,
    ) -> Result<Option<OneTimeToken>, ApiError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.code == code && t.reference_code == reference_code && t.purpose == purpose)
            .cloned())
    }

    async fn consume(&self, id: Uuid) -> Result<(), ApiError> {
        let mut tokens = self.tokens.lock().unwrap();
        if let Some(t) = tokens.iter_mut().find(|t| t.id == id) {
            t.used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn purge(&self, email: &str, purpose: &str) -> Result<(), ApiError> {
        self.tokens
            .lock()
            .unwrap()
            .retain(|t| !(t.email == email && t.purpose == purpose && t.used_at.is_none()));
        Ok(())
    }
}

// ── MockRoleRepo ─────────────────────────────────────────────────────────────

pub struct MockRoleRepo {
    pub roles: Arc<Mutex<Vec<Role>>>,
}

impl MockRoleRepo {
    pub fn new(roles: Vec<Role>) -> Self {
        Self {
            roles: Arc::new(Mutex::new(roles)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn roles_handle(&self) -> Arc<Mutex<Vec<Role>>> {
        Arc::clone(&self.roles)
    }
}

impl RoleRepository for MockRoleRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, ApiError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, ApiError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn find_with_permissions(
        &self,
        id: Uuid,
    ) -> Result<Option<RoleWithPermissions>, ApiError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| RoleWithPermissions {
                role: r.clone(),
                permissions: vec![],
            }))
    }

    async fn list(
        &self,
        search: Option<&str>,
        _sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Role>, u64), ApiError> {
        let roles = self.roles.lock().unwrap();
        let matching: Vec<Role> = roles
            .iter()
            .filter(|r| search.is_none_or(|term| r.name.contains(term)))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let page_rows = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok((page_rows, total))
    }

    async fn create_with_permissions(
        &self,
        role: &Role,
        _permission_ids: &[Uuid],
        _assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let mut roles = self.roles.lock().unwrap();
        if roles.iter().any(|r| r.name == role.name) {
            return Err(ApiError::RoleAlreadyExists);
        }
        roles.push(role.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        _permission_ids: Option<&[Uuid]>,
        _assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let mut roles = self.roles.lock().unwrap();
        if let Some(role) = roles.iter_mut().find(|r| r.id == id) {
            if let Some(name) = name {
                role.name = name.to_owned();
            }
            role.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError> {
        let mut roles = self.roles.lock().unwrap();
        let before = roles.len();
        roles.retain(|r| !ids.contains(&r.id));
        Ok((before - roles.len()) as u64)
    }
}

// ── MockPermissionRepo ───────────────────────────────────────────────────────

pub struct MockPermissionRepo {
    pub permissions: Arc<Mutex<Vec<Permission>>>,
}

impl MockPermissionRepo {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self {
            permissions: Arc::new(Mutex::new(permissions)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl PermissionRepository for MockPermissionRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, ApiError> {
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Permission>, ApiError> {
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn list(
        &self,
        search: Option<&str>,
        _sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Permission>, u64), ApiError> {
        let permissions = self.permissions.lock().unwrap();
        let matching: Vec<Permission> = permissions
            .iter()
            .filter(|p| search.is_none_or(|term| p.name.contains(term)))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let page_rows = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok((page_rows, total))
    }

    async fn create(&self, permission: &Permission) -> Result<(), ApiError> {
        let mut permissions = self.permissions.lock().unwrap();
        if permissions.iter().any(|p| p.name == permission.name) {
            return Err(ApiError::PermissionAlreadyExists);
        }
        permissions.push(permission.clone());
        Ok(())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<(), ApiError> {
        let mut permissions = self.permissions.lock().unwrap();
        if let Some(permission) = permissions.iter_mut().find(|p| p.id == id) {
            permission.name = name.to_owned();
            permission.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError> {
        let mut permissions = self.permissions.lock().unwrap();
        let before = permissions.len();
        permissions.retain(|p| !ids.contains(&p.id));
        Ok((before - permissions.len()) as u64)
    }
}

// ── MockStatisticRepo ────────────────────────────────────────────────────────

pub struct MockStatisticRepo {
    pub amounts: Arc<Mutex<HashMap<String, i64>>>,
}

impl MockStatisticRepo {
    pub fn empty() -> Self {
        Self {
            amounts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn amounts_handle(&self) -> Arc<Mutex<HashMap<String, i64>>> {
        Arc::clone(&self.amounts)
    }
}

impl StatisticRepository for MockStatisticRepo {
    async fn list(&self) -> Result<Vec<Statistic>, ApiError> {
        Ok(self
            .amounts
            .lock()
            .unwrap()
            .iter()
            .map(|(name, amount)| Statistic {
                id: Uuid::new_v4(),
                name: name.clone(),
                amount: *amount,
            })
            .collect())
    }

    async fn adjust(&self, name: &str, delta: i64) -> Result<(), ApiError> {
        *self
            .amounts
            .lock()
            .unwrap()
            .entry(name.to_owned())
            .or_insert(0) += delta;
        Ok(())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Clone)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: true,
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<SentMail>>> {
        Arc::clone(&self.sent)
    }
}

impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ApiError> {
        if self.fail {
            return Err(ApiError::Internal(anyhow::anyhow!("smtp connection refused")));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            html_body: html_body.to_owned(),
        });
        Ok(())
    }
}

// ── PlainHasher ──────────────────────────────────────────────────────────────

/// Deterministic stand-in hasher so tests avoid argon2 cost.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, ApiError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(email: &str) -> StoredUser {
    let now = Utc::now();
    StoredUser {
        user: User {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            firstname: "Ada".to_owned(),
            lastname: "Lovelace".to_owned(),
            status: true,
            email_verified_at: Some(now),
            created_at: now,
            updated_at: now,
        },
        password_hash: "hashed:Str0ng!pass".to_owned(),
        role_ids: vec![],
    }
}

pub fn test_token(email: &str, code: &str, expires_in_secs: i64) -> OneTimeToken {
    let now = Utc::now();
    OneTimeToken {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        code: code.to_owned(),
        purpose: PURPOSE_VERIFY_EMAIL.to_owned(),
        reference_code: Uuid::new_v4().to_string(),
        expires_at: now + Duration::seconds(expires_in_secs),
        used_at: None,
        created_at: now,
    }
}

pub fn test_role(name: &str) -> Role {
    let now = Utc::now();
    Role {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        created_at: now,
        updated_at: now,
    }
}
