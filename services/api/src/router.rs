use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use peraccess_core::health::{healthz, readyz};
use peraccess_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{signin, signout, signup, verify_email},
    permission::{
        create_permission, delete_permissions, get_permission_by_id, get_permissions,
        update_permission,
    },
    role::{create_role, delete_roles, get_role_by_id, get_roles, update_role},
    statistic::get_statistics,
    user::{create_user, delete_users, get_user_by_id, get_users, update_user},
};
use crate::state::AppState;

/// Statically declared route table — every endpoint is listed here, nothing
/// is auto-registered.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/api/signin", post(signin))
        .route("/api/signup", post(signup))
        .route("/api/signout", post(signout))
        .route("/api/verify/email", post(verify_email))
        // Users
        .route("/api/user/create", post(create_user))
        .route("/api/user/pagination", get(get_users))
        .route("/api/user/id/{user_id}", get(get_user_by_id))
        .route("/api/user/update/{user_id}", put(update_user))
        .route("/api/user/delete", delete(delete_users))
        // Roles
        .route("/api/role/create", post(create_role))
        .route("/api/role/pagination", get(get_roles))
        .route("/api/role/id/{role_id}", get(get_role_by_id))
        .route("/api/role/update/{role_id}", put(update_role))
        .route("/api/role/delete", delete(delete_roles))
        // Permissions
        .route("/api/permission/create", post(create_permission))
        .route("/api/permission/pagination", get(get_permissions))
        .route("/api/permission/id/{permission_id}", get(get_permission_by_id))
        .route("/api/permission/update/{permission_id}", put(update_permission))
        .route("/api/permission/delete", delete(delete_permissions))
        // Statistics
        .route("/api/statistic/list", get(get_statistics))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
