use chrono::Utc;
use uuid::Uuid;

use peraccess_domain::pagination::{PageRequest, total_pages};

use crate::domain::repository::{RoleRepository, StatisticRepository};
use crate::domain::types::{NameSortBy, Role, RoleWithPermissions, STAT_AMOUNT_ROLE};
use crate::error::ApiError;

// ── CreateRole ───────────────────────────────────────────────────────────────

pub struct CreateRoleInput {
    pub name: String,
    pub permission_ids: Vec<Uuid>,
    pub created_by: Uuid,
}

pub struct CreateRoleUseCase<R, S>
where
    R: RoleRepository,
    S: StatisticRepository,
{
    pub roles: R,
    pub statistics: S,
}

impl<R, S> CreateRoleUseCase<R, S>
where
    R: RoleRepository,
    S: StatisticRepository,
{
    pub async fn execute(&self, input: CreateRoleInput) -> Result<Role, ApiError> {
        if self.roles.find_by_name(&input.name).await?.is_some() {
            return Err(ApiError::RoleAlreadyExists);
        }
        let now = Utc::now();
        let role = Role {
            id: Uuid::now_v7(),
            name: input.name,
            created_at: now,
            updated_at: now,
        };
        self.roles
            .create_with_permissions(&role, &input.permission_ids, input.created_by)
            .await?;
        self.statistics.adjust(STAT_AMOUNT_ROLE, 1).await?;
        Ok(role)
    }
}

// ── GetRole ──────────────────────────────────────────────────────────────────

pub struct GetRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> GetRoleUseCase<R> {
    pub async fn execute(&self, role_id: Uuid) -> Result<RoleWithPermissions, ApiError> {
        self.roles
            .find_with_permissions(role_id)
            .await?
            .ok_or(ApiError::RoleNotFound)
    }
}

// ── ListRoles ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RolePage {
    pub roles: Vec<Role>,
    pub total: u64,
    pub total_pages: u64,
}

pub struct ListRolesUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> ListRolesUseCase<R> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<RolePage, ApiError> {
        let page = page.clamped();
        let (roles, total) = self.roles.list(search, sort_by, page).await?;
        Ok(RolePage {
            roles,
            total,
            total_pages: total_pages(total, page.page_size),
        })
    }
}

// ── UpdateRole ───────────────────────────────────────────────────────────────

pub struct UpdateRoleInput {
    pub name: Option<String>,
    pub permission_ids: Option<Vec<Uuid>>,
    pub updated_by: Uuid,
}

pub struct UpdateRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> UpdateRoleUseCase<R> {
    pub async fn execute(&self, role_id: Uuid, input: UpdateRoleInput) -> Result<(), ApiError> {
        if input.name.is_none() && input.permission_ids.is_none() {
            return Err(ApiError::MissingData);
        }
        if self.roles.find_by_id(role_id).await?.is_none() {
            return Err(ApiError::RoleNotFound);
        }
        // A rename must not collide with another role.
        if let Some(ref name) = input.name {
            if let Some(existing) = self.roles.find_by_name(name).await? {
                if existing.id != role_id {
                    return Err(ApiError::RoleAlreadyExists);
                }
            }
        }
        self.roles
            .update(
                role_id,
                input.name.as_deref(),
                input.permission_ids.as_deref(),
                input.updated_by,
            )
            .await
    }
}

// ── DeleteRoles ──────────────────────────────────────────────────────────────

pub struct DeleteRolesUseCase<R, S>
where
    R: RoleRepository,
    S: StatisticRepository,
{
    pub roles: R,
    pub statistics: S,
}

impl<R, S> DeleteRolesUseCase<R, S>
where
    R: RoleRepository,
    S: StatisticRepository,
{
    pub async fn execute(&self, role_ids: &[Uuid]) -> Result<u64, ApiError> {
        if role_ids.is_empty() {
            return Err(ApiError::MissingData);
        }
        let deleted = self.roles.delete_many(role_ids).await?;
        if deleted > 0 {
            self.statistics
                .adjust(STAT_AMOUNT_ROLE, -(deleted as i64))
                .await?;
        }
        Ok(deleted)
    }
}
