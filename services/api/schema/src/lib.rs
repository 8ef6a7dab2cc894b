//! Sea-orm entities for the PerAccess database.

pub mod one_time_tokens;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod statistics;
pub mod user_roles;
pub mod users;
