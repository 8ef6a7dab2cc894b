//! Idempotent initial data: root user, base roles, the permission catalog,
//! statistic counters, and the admin grants. Safe to run repeatedly.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter,
};
use tracing::info;
use uuid::Uuid;

use peraccess_api::domain::repository::PasswordHasher as _;
use peraccess_api::domain::types::{
    STAT_AMOUNT_PERMISSION, STAT_AMOUNT_ROLE, STAT_AMOUNT_USER,
};
use peraccess_api::password::Argon2Hasher;
use peraccess_api_schema::{permissions, role_permissions, roles, statistics, user_roles, users};
use peraccess_domain::permission::ALL_PERMISSIONS;

const ROOT_EMAIL: &str = "rooter_peraccess@example.com";
const ROLE_NAMES: [&str; 3] = ["user", "admin", "manager"];
const ADMIN_ROLE: &str = "admin";

#[tokio::main]
async fn main() {
    peraccess_core::tracing::init_tracing();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    let root_password = std::env::var("ROOT_PASSWORD").expect("ROOT_PASSWORD");
    let hash_time_cost = std::env::var("HASH_TIME_COST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2);

    let db = Database::connect(&database_url)
        .await
        .expect("failed to connect to database");
    let hasher = Argon2Hasher::new(hash_time_cost);

    let root_id = ensure_root_user(&db, &hasher, &root_password).await;
    ensure_roles(&db).await;
    ensure_permissions(&db).await;
    ensure_statistics(&db).await;
    grant_all_to_admin(&db, root_id).await;
    assign_admin_to_root(&db, root_id).await;

    info!("initial data created");
}

async fn ensure_root_user(db: &DatabaseConnection, hasher: &Argon2Hasher, password: &str) -> Uuid {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(ROOT_EMAIL))
        .one(db)
        .await
        .expect("find root user");
    if let Some(user) = existing {
        return user.id;
    }

    let now = Utc::now();
    let id = Uuid::now_v7();
    users::ActiveModel {
        id: Set(id),
        email: Set(ROOT_EMAIL.to_owned()),
        password_hash: Set(hasher.hash(password).expect("hash root password")),
        firstname: Set("Rooter".to_owned()),
        lastname: Set("Develop".to_owned()),
        status: Set(true),
        email_verified_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("create root user");
    info!("root user created");
    id
}

async fn ensure_roles(db: &DatabaseConnection) {
    for name in ROLE_NAMES {
        let exists = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(db)
            .await
            .expect("find role")
            .is_some();
        if exists {
            continue;
        }
        let now = Utc::now();
        roles::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("create role");
    }
}

async fn ensure_permissions(db: &DatabaseConnection) {
    for name in ALL_PERMISSIONS {
        let exists = permissions::Entity::find()
            .filter(permissions::Column::Name.eq(name))
            .one(db)
            .await
            .expect("find permission")
            .is_some();
        if exists {
            continue;
        }
        let now = Utc::now();
        permissions::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("create permission");
    }
}

async fn ensure_statistics(db: &DatabaseConnection) {
    for name in [STAT_AMOUNT_USER, STAT_AMOUNT_ROLE, STAT_AMOUNT_PERMISSION] {
        let exists = statistics::Entity::find()
            .filter(statistics::Column::Name.eq(name))
            .one(db)
            .await
            .expect("find statistic")
            .is_some();
        if exists {
            continue;
        }
        statistics::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_owned()),
            amount: Set(0),
        }
        .insert(db)
        .await
        .expect("create statistic");
    }
}

/// Grant every cataloged permission to the admin role, skipping grants that
/// already exist.
async fn grant_all_to_admin(db: &DatabaseConnection, assigned_by: Uuid) {
    let admin = roles::Entity::find()
        .filter(roles::Column::Name.eq(ADMIN_ROLE))
        .one(db)
        .await
        .expect("find admin role")
        .expect("admin role must exist after ensure_roles");

    let granted: Vec<Uuid> = role_permissions::Entity::find()
        .filter(role_permissions::Column::RoleId.eq(admin.id))
        .all(db)
        .await
        .expect("list admin grants")
        .into_iter()
        .map(|row| row.permission_id)
        .collect();

    let all = permissions::Entity::find()
        .all(db)
        .await
        .expect("list permissions");

    let now = Utc::now();
    for permission in all {
        if granted.contains(&permission.id) {
            continue;
        }
        role_permissions::ActiveModel {
            role_id: Set(admin.id),
            permission_id: Set(permission.id),
            assigned_by: Set(assigned_by),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .expect("grant permission to admin");
    }
}

async fn assign_admin_to_root(db: &DatabaseConnection, root_id: Uuid) {
    let admin = roles::Entity::find()
        .filter(roles::Column::Name.eq(ADMIN_ROLE))
        .one(db)
        .await
        .expect("find admin role")
        .expect("admin role must exist after ensure_roles");

    let assigned = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(root_id))
        .filter(user_roles::Column::RoleId.eq(admin.id))
        .one(db)
        .await
        .expect("find root role assignment")
        .is_some();
    if assigned {
        return;
    }

    user_roles::ActiveModel {
        user_id: Set(root_id),
        role_id: Set(admin.id),
        assigned_by: Set(root_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("assign admin role to root");
}
