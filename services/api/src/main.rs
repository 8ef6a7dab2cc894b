use sea_orm::Database;
use tracing::info;

use peraccess_api::config::ApiConfig;
use peraccess_api::infra::mail::SmtpMailer;
use peraccess_api::password::Argon2Hasher;
use peraccess_api::router::build_router;
use peraccess_api::state::AppState;

#[tokio::main]
async fn main() {
    peraccess_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer =
        SmtpMailer::new(&config.smtp_url, &config.smtp_from).expect("invalid SMTP configuration");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        cookie_domain: config.cookie_domain,
        cookie_secure: config.cookie_secure,
        mailer,
        hasher: Argon2Hasher::new(config.hash_time_cost),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
