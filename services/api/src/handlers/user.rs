use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use peraccess_domain::permission::{CREATE_USER, DELETE_USER, FIND_USER, UPDATE_USER};

use crate::domain::types::{User, UserSortBy, UserWithRoles};
use crate::error::ApiError;
use crate::extract::AuthSession;
use crate::handlers::ListQuery;
use crate::handlers::role::RoleResponse;
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserInput, CreateUserUseCase, DeleteUsersUseCase, GetUserUseCase, ListUsersUseCase,
    UpdateUserInput, UpdateUserUseCase,
};
use crate::validation;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub status: bool,
    #[serde(serialize_with = "peraccess_core::serde::to_rfc3339_ms_opt")]
    pub email_verified_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "peraccess_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "peraccess_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
            status: user.status,
            email_verified_at: user.email_verified_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub roles: Vec<RoleResponse>,
}

impl From<UserWithRoles> for UserDetailResponse {
    fn from(detail: UserWithRoles) -> Self {
        Self {
            user: detail.user.into(),
            roles: detail.roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct UserPageResponse {
    pub data: Vec<UserResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

// ── POST /api/user/create ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub status: bool,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

pub async fn create_user(
    session: AuthSession,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    session.authorize(&[CREATE_USER])?;
    validation::create_user(&body.firstname, &body.lastname, &body.email, &body.password)?;

    let usecase = CreateUserUseCase {
        users: state.user_repo(),
        statistics: state.statistic_repo(),
        hasher: state.hasher,
    };
    let user = usecase
        .execute(CreateUserInput {
            firstname: body.firstname.trim().to_owned(),
            lastname: body.lastname.trim().to_owned(),
            email: body.email,
            password: body.password,
            status: body.status,
            role_ids: body.role_ids,
            created_by: session.user_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /api/user/pagination ─────────────────────────────────────────────────

pub async fn get_users(
    session: AuthSession,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<UserPageResponse>, ApiError> {
    session.authorize(&[FIND_USER])?;

    let sort_by = query
        .sort_field
        .as_deref()
        .and_then(|field| UserSortBy::from_query(field, query.sort()))
        .unwrap_or_default();
    let page = query.page_request();

    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let out = usecase
        .execute(query.title.as_deref(), sort_by, page)
        .await?;

    Ok(Json(UserPageResponse {
        data: out.users.into_iter().map(Into::into).collect(),
        total: out.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: out.total_pages,
    }))
}

// ── GET /api/user/id/{user_id} ───────────────────────────────────────────────

pub async fn get_user_by_id(
    session: AuthSession,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserDetailResponse>, ApiError> {
    session.authorize(&[FIND_USER])?;

    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let detail = usecase.execute(user_id).await?;
    Ok(Json(detail.into()))
}

// ── PUT /api/user/update/{user_id} ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub status: Option<bool>,
    pub password: Option<String>,
    pub role_ids: Option<Vec<Uuid>>,
}

pub async fn update_user(
    session: AuthSession,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    session.authorize(&[UPDATE_USER])?;
    validation::update_user(
        body.firstname.as_deref(),
        body.lastname.as_deref(),
        body.password.as_deref(),
    )?;

    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
        hasher: state.hasher,
    };
    usecase
        .execute(
            user_id,
            UpdateUserInput {
                firstname: body.firstname.map(|s| s.trim().to_owned()),
                lastname: body.lastname.map(|s| s.trim().to_owned()),
                status: body.status,
                password: body.password,
                role_ids: body.role_ids,
                updated_by: session.user_id,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /api/user/delete ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DeleteUsersRequest {
    pub user_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

pub async fn delete_users(
    session: AuthSession,
    State(state): State<AppState>,
    Json(body): Json<DeleteUsersRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    session.authorize(&[DELETE_USER])?;

    let usecase = DeleteUsersUseCase {
        users: state.user_repo(),
        statistics: state.statistic_repo(),
    };
    let deleted = usecase.execute(&body.user_ids).await?;
    Ok(Json(DeletedResponse { deleted }))
}
