use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use peraccess_domain::permission::{
    CREATE_PERMISSION, DELETE_PERMISSION, FIND_PERMISSION, UPDATE_PERMISSION,
};

use crate::domain::types::{NameSortBy, Permission};
use crate::error::ApiError;
use crate::extract::AuthSession;
use crate::handlers::ListQuery;
use crate::handlers::user::DeletedResponse;
use crate::state::AppState;
use crate::usecase::permission::{
    CreatePermissionInput, CreatePermissionUseCase, DeletePermissionsUseCase,
    GetPermissionUseCase, ListPermissionsUseCase, UpdatePermissionUseCase,
};
use crate::validation;

#[derive(Serialize)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "peraccess_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "peraccess_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id.to_string(),
            name: permission.name,
            created_at: permission.created_at,
            updated_at: permission.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct PermissionPageResponse {
    pub data: Vec<PermissionResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

// ── POST /api/permission/create ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
}

pub async fn create_permission(
    session: AuthSession,
    State(state): State<AppState>,
    Json(body): Json<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<PermissionResponse>), ApiError> {
    session.authorize(&[CREATE_PERMISSION])?;
    validation::entity_name("name", &body.name)?;

    let usecase = CreatePermissionUseCase {
        permissions: state.permission_repo(),
        statistics: state.statistic_repo(),
    };
    let permission = usecase
        .execute(CreatePermissionInput {
            name: body.name.trim().to_owned(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(permission.into())))
}

// ── GET /api/permission/pagination ───────────────────────────────────────────

pub async fn get_permissions(
    session: AuthSession,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PermissionPageResponse>, ApiError> {
    session.authorize(&[FIND_PERMISSION])?;

    let sort_by = query
        .sort_field
        .as_deref()
        .and_then(|field| NameSortBy::from_query(field, query.sort()))
        .unwrap_or_default();
    let page = query.page_request();

    let usecase = ListPermissionsUseCase {
        permissions: state.permission_repo(),
    };
    let out = usecase
        .execute(query.title.as_deref(), sort_by, page)
        .await?;

    Ok(Json(PermissionPageResponse {
        data: out.permissions.into_iter().map(Into::into).collect(),
        total: out.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: out.total_pages,
    }))
}

// ── GET /api/permission/id/{permission_id} ───────────────────────────────────

pub async fn get_permission_by_id(
    session: AuthSession,
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
) -> Result<Json<PermissionResponse>, ApiError> {
    session.authorize(&[FIND_PERMISSION])?;

    let usecase = GetPermissionUseCase {
        permissions: state.permission_repo(),
    };
    let permission = usecase.execute(permission_id).await?;
    Ok(Json(permission.into()))
}

// ── PUT /api/permission/update/{permission_id} ───────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePermissionRequest {
    pub name: String,
}

pub async fn update_permission(
    session: AuthSession,
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
    Json(body): Json<UpdatePermissionRequest>,
) -> Result<StatusCode, ApiError> {
    session.authorize(&[UPDATE_PERMISSION])?;
    validation::entity_name("name", &body.name)?;

    let usecase = UpdatePermissionUseCase {
        permissions: state.permission_repo(),
    };
    usecase.execute(permission_id, body.name.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /api/permission/delete ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DeletePermissionsRequest {
    pub permission_ids: Vec<Uuid>,
}

pub async fn delete_permissions(
    session: AuthSession,
    State(state): State<AppState>,
    Json(body): Json<DeletePermissionsRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    session.authorize(&[DELETE_PERMISSION])?;

    let usecase = DeletePermissionsUseCase {
        permissions: state.permission_repo(),
        statistics: state.statistic_repo(),
    };
    let deleted = usecase.execute(&body.permission_ids).await?;
    Ok(Json(DeletedResponse { deleted }))
}
