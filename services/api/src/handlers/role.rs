use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use peraccess_domain::permission::{CREATE_ROLE, DELETE_ROLE, FIND_ROLE, UPDATE_ROLE};

use crate::domain::types::{NameSortBy, Role, RoleWithPermissions};
use crate::error::ApiError;
use crate::extract::AuthSession;
use crate::handlers::ListQuery;
use crate::handlers::permission::PermissionResponse;
use crate::handlers::user::DeletedResponse;
use crate::state::AppState;
use crate::usecase::role::{
    CreateRoleInput, CreateRoleUseCase, DeleteRolesUseCase, GetRoleUseCase, ListRolesUseCase,
    UpdateRoleInput, UpdateRoleUseCase,
};
use crate::validation;

#[derive(Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "peraccess_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "peraccess_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id.to_string(),
            name: role.name,
            created_at: role.created_at,
            updated_at: role.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct RoleDetailResponse {
    #[serde(flatten)]
    pub role: RoleResponse,
    pub permissions: Vec<PermissionResponse>,
}

impl From<RoleWithPermissions> for RoleDetailResponse {
    fn from(detail: RoleWithPermissions) -> Self {
        Self {
            role: detail.role.into(),
            permissions: detail.permissions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct RolePageResponse {
    pub data: Vec<RoleResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

// ── POST /api/role/create ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

pub async fn create_role(
    session: AuthSession,
    State(state): State<AppState>,
    Json(body): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    session.authorize(&[CREATE_ROLE])?;
    validation::entity_name("name", &body.name)?;

    let usecase = CreateRoleUseCase {
        roles: state.role_repo(),
        statistics: state.statistic_repo(),
    };
    let role = usecase
        .execute(CreateRoleInput {
            name: body.name.trim().to_owned(),
            permission_ids: body.permission_ids,
            created_by: session.user_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(role.into())))
}

// ── GET /api/role/pagination ─────────────────────────────────────────────────

pub async fn get_roles(
    session: AuthSession,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RolePageResponse>, ApiError> {
    session.authorize(&[FIND_ROLE])?;

    let sort_by = query
        .sort_field
        .as_deref()
        .and_then(|field| NameSortBy::from_query(field, query.sort()))
        .unwrap_or_default();
    let page = query.page_request();

    let usecase = ListRolesUseCase {
        roles: state.role_repo(),
    };
    let out = usecase
        .execute(query.title.as_deref(), sort_by, page)
        .await?;

    Ok(Json(RolePageResponse {
        data: out.roles.into_iter().map(Into::into).collect(),
        total: out.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: out.total_pages,
    }))
}

// ── GET /api/role/id/{role_id} ───────────────────────────────────────────────

pub async fn get_role_by_id(
    session: AuthSession,
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleDetailResponse>, ApiError> {
    session.authorize(&[FIND_ROLE])?;

    let usecase = GetRoleUseCase {
        roles: state.role_repo(),
    };
    let detail = usecase.execute(role_id).await?;
    Ok(Json(detail.into()))
}

// ── PUT /api/role/update/{role_id} ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub permission_ids: Option<Vec<Uuid>>,
}

pub async fn update_role(
    session: AuthSession,
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<StatusCode, ApiError> {
    session.authorize(&[UPDATE_ROLE])?;
    if let Some(ref name) = body.name {
        validation::entity_name("name", name)?;
    }

    let usecase = UpdateRoleUseCase {
        roles: state.role_repo(),
    };
    usecase
        .execute(
            role_id,
            UpdateRoleInput {
                name: body.name.map(|s| s.trim().to_owned()),
                permission_ids: body.permission_ids,
                updated_by: session.user_id,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /api/role/delete ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DeleteRolesRequest {
    pub role_ids: Vec<Uuid>,
}

pub async fn delete_roles(
    session: AuthSession,
    State(state): State<AppState>,
    Json(body): Json<DeleteRolesRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    session.authorize(&[DELETE_ROLE])?;

    let usecase = DeleteRolesUseCase {
        roles: state.role_repo(),
        statistics: state.statistic_repo(),
    };
    let deleted = usecase.execute(&body.role_ids).await?;
    Ok(Json(DeletedResponse { deleted }))
}
