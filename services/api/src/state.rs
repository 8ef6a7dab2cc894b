use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbPermissionRepository, DbRoleRepository, DbStatisticRepository, DbTokenRepository,
    DbUserRepository,
};
use crate::infra::mail::SmtpMailer;
use crate::password::Argon2Hasher;

/// Shared application state passed to every handler via axum `State`.
///
/// Repositories are constructed per call from the pooled connection; the
/// usecases only ever see the repository ports.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub cookie_domain: String,
    pub cookie_secure: bool,
    pub mailer: SmtpMailer,
    pub hasher: Argon2Hasher,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn role_repo(&self) -> DbRoleRepository {
        DbRoleRepository {
            db: self.db.clone(),
        }
    }

    pub fn permission_repo(&self) -> DbPermissionRepository {
        DbPermissionRepository {
            db: self.db.clone(),
        }
    }

    pub fn statistic_repo(&self) -> DbStatisticRepository {
        DbStatisticRepository {
            db: self.db.clone(),
        }
    }
}
