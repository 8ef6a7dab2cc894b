use chrono::Utc;
use uuid::Uuid;

use peraccess_domain::pagination::{PageRequest, total_pages};

use crate::domain::repository::{PermissionRepository, StatisticRepository};
use crate::domain::types::{NameSortBy, Permission, STAT_AMOUNT_PERMISSION};
use crate::error::ApiError;

// ── CreatePermission ─────────────────────────────────────────────────────────

pub struct CreatePermissionInput {
    pub name: String,
}

pub struct CreatePermissionUseCase<P, S>
where
    P: PermissionRepository,
    S: StatisticRepository,
{
    pub permissions: P,
    pub statistics: S,
}

impl<P, S> CreatePermissionUseCase<P, S>
where
    P: PermissionRepository,
    S: StatisticRepository,
{
    pub async fn execute(&self, input: CreatePermissionInput) -> Result<Permission, ApiError> {
        if self.permissions.find_by_name(&input.name).await?.is_some() {
            return Err(ApiError::PermissionAlreadyExists);
        }
        let now = Utc::now();
        let permission = Permission {
            id: Uuid::now_v7(),
            name: input.name,
            created_at: now,
            updated_at: now,
        };
        self.permissions.create(&permission).await?;
        self.statistics.adjust(STAT_AMOUNT_PERMISSION, 1).await?;
        Ok(permission)
    }
}

// ── GetPermission ────────────────────────────────────────────────────────────

pub struct GetPermissionUseCase<P: PermissionRepository> {
    pub permissions: P,
}

impl<P: PermissionRepository> GetPermissionUseCase<P> {
    pub async fn execute(&self, permission_id: Uuid) -> Result<Permission, ApiError> {
        self.permissions
            .find_by_id(permission_id)
            .await?
            .ok_or(ApiError::PermissionNotFound)
    }
}

// ── ListPermissions ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PermissionPage {
    pub permissions: Vec<Permission>,
    pub total: u64,
    pub total_pages: u64,
}

pub struct ListPermissionsUseCase<P: PermissionRepository> {
    pub permissions: P,
}

impl<P: PermissionRepository> ListPermissionsUseCase<P> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        sort_by: NameSortBy,
        page: PageRequest,
    ) -> Result<PermissionPage, ApiError> {
        let page = page.clamped();
        let (permissions, total) = self.permissions.list(search, sort_by, page).await?;
        Ok(PermissionPage {
            permissions,
            total,
            total_pages: total_pages(total, page.page_size),
        })
    }
}

// ── UpdatePermission ─────────────────────────────────────────────────────────

pub struct UpdatePermissionUseCase<P: PermissionRepository> {
    pub permissions: P,
}

impl<P: PermissionRepository> UpdatePermissionUseCase<P> {
    pub async fn execute(&self, permission_id: Uuid, name: &str) -> Result<(), ApiError> {
        if self.permissions.find_by_id(permission_id).await?.is_none() {
            return Err(ApiError::PermissionNotFound);
        }
        if let Some(existing) = self.permissions.find_by_name(name).await? {
            if existing.id != permission_id {
                return Err(ApiError::PermissionAlreadyExists);
            }
        }
        self.permissions.update_name(permission_id, name).await
    }
}

// ── DeletePermissions ────────────────────────────────────────────────────────

pub struct DeletePermissionsUseCase<P, S>
where
    P: PermissionRepository,
    S: StatisticRepository,
{
    pub permissions: P,
    pub statistics: S,
}

impl<P, S> DeletePermissionsUseCase<P, S>
where
    P: PermissionRepository,
    S: StatisticRepository,
{
    pub async fn execute(&self, permission_ids: &[Uuid]) -> Result<u64, ApiError> {
        if permission_ids.is_empty() {
            return Err(ApiError::MissingData);
        }
        let deleted = self.permissions.delete_many(permission_ids).await?;
        if deleted > 0 {
            self.statistics
                .adjust(STAT_AMOUNT_PERMISSION, -(deleted as i64))
                .await?;
        }
        Ok(deleted)
    }
}
