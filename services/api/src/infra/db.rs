use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    SqlErr, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use peraccess_api_schema::{
    one_time_tokens, permissions, role_permissions, roles, statistics, user_roles, users,
};
use peraccess_domain::pagination::{PageRequest, Sort};
use peraccess_domain::permission::PermissionSet;

use crate::domain::repository::{
    PermissionRepository, RoleRepository, StatisticRepository, TokenRepository, UserRepository,
};
use crate::domain::types::{
    Credential, NameSortBy, NewUser, OneTimeToken, Permission, Role, RoleWithPermissions,
    Statistic, User, UserChanges, UserSortBy, UserWithRoles,
};
use crate::error::ApiError;

/// Collapse a transaction failure into the domain conflict when the root
/// cause is a unique-constraint violation (the check-then-insert race), and
/// into an internal error otherwise.
fn conflict_or_internal(
    err: TransactionError<sea_orm::DbErr>,
    conflict: ApiError,
    op: &'static str,
) -> ApiError {
    match err {
        TransactionError::Transaction(db_err)
            if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
        {
            conflict
        }
        other => ApiError::Internal(anyhow::Error::new(other).context(op)),
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find credential by email")?;
        Ok(model.map(|m| Credential {
            user_id: m.id,
            email: m.email,
            password_hash: m.password_hash,
            status: m.status,
            email_verified_at: m.email_verified_at,
        }))
    }

    async fn find_with_roles(&self, id: Uuid) -> Result<Option<UserWithRoles>, ApiError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user with roles")?
        else {
            return Ok(None);
        };

        let role_ids: Vec<Uuid> = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(id))
            .all(&self.db)
            .await
            .context("list user role ids")?
            .into_iter()
            .map(|row| row.role_id)
            .collect();

        let roles = roles::Entity::find()
            .filter(roles::Column::Id.is_in(role_ids))
            .all(&self.db)
            .await
            .context("list user roles")?
            .into_iter()
            .map(role_from_model)
            .collect();

        Ok(Some(UserWithRoles {
            user: user_from_model(model),
            roles,
        }))
    }

    async fn list(
        &self,
        search: Option<&str>,
        sort_by: UserSortBy,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), ApiError> {
        let page = page.clamped();
        let mut query = users::Entity::find();
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(users::Column::Email.contains(term))
                    .add(users::Column::Firstname.contains(term))
                    .add(users::Column::Lastname.contains(term)),
            );
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count users")?;

        query = match sort_by {
            UserSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(users::Column::CreatedAt),
            UserSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(users::Column::CreatedAt),
            UserSortBy::Email(Sort::Desc) => query.order_by_desc(users::Column::Email),
            UserSortBy::Email(Sort::Asc) => query.order_by_asc(users::Column::Email),
            UserSortBy::Firstname(Sort::Desc) => query.order_by_desc(users::Column::Firstname),
            UserSortBy::Firstname(Sort::Asc) => query.order_by_asc(users::Column::Firstname),
            UserSortBy::Lastname(Sort::Desc) => query.order_by_desc(users::Column::Lastname),
            UserSortBy::Lastname(Sort::Asc) => query.order_by_asc(users::Column::Lastname),
        };

        let models = query
            .offset(page.offset())
            .limit(page.page_size as u64)
            .all(&self.db)
            .await
            .context("list users")?;
        Ok((models.into_iter().map(user_from_model).collect(), total))
    }

    async fn create_with_roles(
        &self,
        user: &NewUser,
        role_ids: &[Uuid],
        assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let user = user.clone();
        let role_ids = role_ids.to_vec();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id),
                        email: Set(user.email.clone()),
                        password_hash: Set(user.password_hash.clone()),
                        firstname: Set(user.firstname.clone()),
                        lastname: Set(user.lastname.clone()),
                        status: Set(user.status),
                        email_verified_at: Set(user.email_verified_at),
                        created_at: Set(user.created_at),
                        updated_at: Set(user.updated_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_user_roles(txn, user.id, &role_ids, assigned_by).await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::UserAlreadyExists, "create user"))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UserChanges,
        role_ids: Option<&[Uuid]>,
        assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let changes = changes.clone();
        let role_ids = role_ids.map(|ids| ids.to_vec());
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let mut am = users::ActiveModel {
                        id: Set(id),
                        ..Default::default()
                    };
                    if let Some(firstname) = changes.firstname {
                        am.firstname = Set(firstname);
                    }
                    if let Some(lastname) = changes.lastname {
                        am.lastname = Set(lastname);
                    }
                    if let Some(status) = changes.status {
                        am.status = Set(status);
                    }
                    if let Some(password_hash) = changes.password_hash {
                        am.password_hash = Set(password_hash);
                    }
                    am.updated_at = Set(Utc::now());
                    am.update(txn).await?;

                    // Replace-style role sync: drop every assignment, then
                    // write the requested set.
                    if let Some(role_ids) = role_ids {
                        user_roles::Entity::delete_many()
                            .filter(user_roles::Column::UserId.eq(id))
                            .exec(txn)
                            .await?;
                        insert_user_roles(txn, id, &role_ids, assigned_by).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| {
                ApiError::Internal(anyhow::Error::new(e).context("update user"))
            })
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError> {
        let result = users::Entity::delete_many()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .context("delete users")?;
        Ok(result.rows_affected)
    }

    async fn permissions_of(&self, user_id: Uuid) -> Result<PermissionSet, ApiError> {
        let role_ids: Vec<Uuid> = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("list role ids for permissions")?
            .into_iter()
            .map(|row| row.role_id)
            .collect();
        if role_ids.is_empty() {
            return Ok(PermissionSet::new());
        }

        let permission_ids: Vec<Uuid> = role_permissions::Entity::find()
            .filter(role_permissions::Column::RoleId.is_in(role_ids))
            .all(&self.db)
            .await
            .context("list permission ids for permissions")?
            .into_iter()
            .map(|row| row.permission_id)
            .collect();
        if permission_ids.is_empty() {
            return Ok(PermissionSet::new());
        }

        let names = permissions::Entity::find()
            .filter(permissions::Column::Id.is_in(permission_ids))
            .all(&self.db)
            .await
            .context("list permission names")?
            .into_iter()
            .map(|row| row.name);
        Ok(names.collect())
    }
}

async fn insert_user_roles(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    role_ids: &[Uuid],
    assigned_by: Uuid,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    for role_id in role_ids {
        user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(*role_id),
            assigned_by: Set(assigned_by),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        firstname: model.firstname,
        lastname: model.lastname,
        status: model.status,
        email_verified_at: model.email_verified_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── One-time token repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

impl TokenRepository for DbTokenRepository {
    async fn find_pending(
        &self,
        email: &str,
        purpose: &str,
    ) -> Result<Option<OneTimeToken>, ApiError> {
        let now = Utc::now();
        let model = one_time_tokens::Entity::find()
            .filter(one_time_tokens::Column::Email.eq(email))
            .filter(one_time_tokens::Column::Purpose.eq(purpose))
            .filter(one_time_tokens::Column::UsedAt.is_null())
            .filter(one_time_tokens::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find pending token")?;
        Ok(model.map(token_from_model))
    }

    async fn create(&self, token: &OneTimeToken) -> Result<(), ApiError> {
        one_time_tokens::ActiveModel {
            id: Set(token.id),
            email: Set(token.email.clone()),
            code: Set(token.code.clone()),
            purpose: Set(token.purpose.clone()),
            reference_code: Set(token.reference_code.clone()),
            expires_at: Set(token.expires_at),
            used_at: Set(None),
            created_at: Set(token.created_at),
        }
        .insert(&self.db)
        .await
        .context("create token")?;
        Ok(())
    }

    async fn find_by_code_and_reference(
        &self,
        code: &str,
        reference_code: &str,
        purpose: &str,
    ) -> Result<Option<OneTimeToken>, ApiError> {
        let model = one_time_tokens::Entity::find()
            .filter(one_time_tokens::Column::Code.eq(code))
            .filter(one_time_tokens::Column::ReferenceCode.eq(reference_code))
            .filter(one_time_tokens::Column::Purpose.eq(purpose))
            .one(&self.db)
            .await
            .context("find token by code and reference")?;
        Ok(model.map(token_from_model))
    }

    async fn consume(&self, id: Uuid) -> Result<(), ApiError> {
        let now = Utc::now();
        one_time_tokens::ActiveModel {
            id: Set(id),
            used_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("consume token")?;
        Ok(())
    }

    async fn purge(&self, email: &str, purpose: &str) -> Result<(), ApiError> {
        one_time_tokens::Entity::delete_many()
            .filter(one_time_tokens::Column::Email.eq(email))
            .filter(one_time_tokens::Column::Purpose.eq(purpose))
            .filter(one_time_tokens::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("purge stale tokens")?;
        Ok(())
    }
}

fn token_from_model(model: one_time_tokens::Model) -> OneTimeToken {
    OneTimeToken {
        id: model.id,
        email: model.email,
        code: model.code,
        purpose: model.purpose,
        reference_code: model.reference_code,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}

// ── Role repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, ApiError> {
        let model = roles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find role by id")?;
        Ok(model.map(role_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, ApiError> {
        let model = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find role by name")?;
        Ok(model.map(role_from_model))
    }

    async fn find_with_permissions(
        &self,
        id: Uuid,
    ) -> Result<Option<RoleWithPermissions>, ApiError> {
        let Some(model) = roles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find role with permissions")?
        else {
            return Ok(None);
        };

        let permission_ids: Vec<Uuid> = role_permissions::Entity::find()
            .filter(role_permissions::Column::RoleId.eq(id))
            .all(&self.db)
            .await
            .context("list role permission ids")?
            .into_iter()
            .map(|row| row.permission_id)
            .collect();

        let permissions = permissions::Entity::find()
            .filter(permissions::Column::Id.is_in(permission_ids))
            .all(&self.db)
            .await
            .context("list role permissions")?
            .into_iter()
            .map(permission_from_model)
            .collect();

        Ok(Some(RoleWithPermissions {
            role: role_from_model(model),
            permissions,
        }))
    }

    async fn list(
        &self,
        search: Option<&str>,
        sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Role>, u64), ApiError> {
        let page = page.clamped();
        let mut query = roles::Entity::find();
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            query = query.filter(roles::Column::Name.contains(term));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count roles")?;

        query = match sort_by {
            NameSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(roles::Column::CreatedAt),
            NameSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(roles::Column::CreatedAt),
            NameSortBy::Name(Sort::Desc) => query.order_by_desc(roles::Column::Name),
            NameSortBy::Name(Sort::Asc) => query.order_by_asc(roles::Column::Name),
        };

        let models = query
            .offset(page.offset())
            .limit(page.page_size as u64)
            .all(&self.db)
            .await
            .context("list roles")?;
        Ok((models.into_iter().map(role_from_model).collect(), total))
    }

    async fn create_with_permissions(
        &self,
        role: &Role,
        permission_ids: &[Uuid],
        assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let role = role.clone();
        let permission_ids = permission_ids.to_vec();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    roles::ActiveModel {
                        id: Set(role.id),
                        name: Set(role.name.clone()),
                        created_at: Set(role.created_at),
                        updated_at: Set(role.updated_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_role_permissions(txn, role.id, &permission_ids, assigned_by).await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::RoleAlreadyExists, "create role"))
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        permission_ids: Option<&[Uuid]>,
        assigned_by: Uuid,
    ) -> Result<(), ApiError> {
        let name = name.map(str::to_owned);
        let permission_ids = permission_ids.map(|ids| ids.to_vec());
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    if let Some(name) = name {
                        roles::ActiveModel {
                            id: Set(id),
                            name: Set(name),
                            updated_at: Set(Utc::now()),
                            ..Default::default()
                        }
                        .update(txn)
                        .await?;
                    }
                    if let Some(permission_ids) = permission_ids {
                        role_permissions::Entity::delete_many()
                            .filter(role_permissions::Column::RoleId.eq(id))
                            .exec(txn)
                            .await?;
                        insert_role_permissions(txn, id, &permission_ids, assigned_by).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| conflict_or_internal(e, ApiError::RoleAlreadyExists, "update role"))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError> {
        let result = roles::Entity::delete_many()
            .filter(roles::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .context("delete roles")?;
        Ok(result.rows_affected)
    }
}

async fn insert_role_permissions(
    txn: &DatabaseTransaction,
    role_id: Uuid,
    permission_ids: &[Uuid],
    assigned_by: Uuid,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now();
    for permission_id in permission_ids {
        role_permissions::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(*permission_id),
            assigned_by: Set(assigned_by),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Permission repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPermissionRepository {
    pub db: DatabaseConnection,
}

impl PermissionRepository for DbPermissionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, ApiError> {
        let model = permissions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find permission by id")?;
        Ok(model.map(permission_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Permission>, ApiError> {
        let model = permissions::Entity::find()
            .filter(permissions::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find permission by name")?;
        Ok(model.map(permission_from_model))
    }

    async fn list(
        &self,
        search: Option<&str>,
        sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Permission>, u64), ApiError> {
        let page = page.clamped();
        let mut query = permissions::Entity::find();
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            query = query.filter(permissions::Column::Name.contains(term));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count permissions")?;

        query = match sort_by {
            NameSortBy::CreatedAt(Sort::Desc) => {
                query.order_by_desc(permissions::Column::CreatedAt)
            }
            NameSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(permissions::Column::CreatedAt),
            NameSortBy::Name(Sort::Desc) => query.order_by_desc(permissions::Column::Name),
            NameSortBy::Name(Sort::Asc) => query.order_by_asc(permissions::Column::Name),
        };

        let models = query
            .offset(page.offset())
            .limit(page.page_size as u64)
            .all(&self.db)
            .await
            .context("list permissions")?;
        Ok((
            models.into_iter().map(permission_from_model).collect(),
            total,
        ))
    }

    async fn create(&self, permission: &Permission) -> Result<(), ApiError> {
        let result = permissions::ActiveModel {
            id: Set(permission.id),
            name: Set(permission.name.clone()),
            created_at: Set(permission.created_at),
            updated_at: Set(permission.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(db_err)
                if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                Err(ApiError::PermissionAlreadyExists)
            }
            Err(db_err) => Err(ApiError::Internal(
                anyhow::Error::new(db_err).context("create permission"),
            )),
        }
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<(), ApiError> {
        permissions::ActiveModel {
            id: Set(id),
            name: Set(name.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update permission name")?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, ApiError> {
        let result = permissions::Entity::delete_many()
            .filter(permissions::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .context("delete permissions")?;
        Ok(result.rows_affected)
    }
}

fn permission_from_model(model: permissions::Model) -> Permission {
    Permission {
        id: model.id,
        name: model.name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Statistic repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStatisticRepository {
    pub db: DatabaseConnection,
}

impl StatisticRepository for DbStatisticRepository {
    async fn list(&self) -> Result<Vec<Statistic>, ApiError> {
        let models = statistics::Entity::find()
            .order_by_asc(statistics::Column::Name)
            .all(&self.db)
            .await
            .context("list statistics")?;
        Ok(models
            .into_iter()
            .map(|m| Statistic {
                id: m.id,
                name: m.name,
                amount: m.amount,
            })
            .collect())
    }

    async fn adjust(&self, name: &str, delta: i64) -> Result<(), ApiError> {
        // Single atomic UPDATE, never read-modify-write.
        statistics::Entity::update_many()
            .col_expr(
                statistics::Column::Amount,
                Expr::col(statistics::Column::Amount).add(delta),
            )
            .filter(statistics::Column::Name.eq(name))
            .exec(&self.db)
            .await
            .context("adjust statistic")?;
        Ok(())
    }
}
