use bankapi::{
    account::repository::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository},
    create_router, db,
    user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
    AppConfig, AppState, CredentialHasher, TokenConfig,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn AccountRepository + Send + Sync>,
);

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bankapi=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    info!(?config, "Starting bank account server");

    let hasher = CredentialHasher::new(config.password_hash_params.clone());
    let token_config = TokenConfig::new(config.jwt_secret.clone(), config.access_token_expiration);

    let (user_repository, account_repository): Repositories = match &config.database_url {
        Some(database_url) => {
            let pool = db::connect(database_url.expose_secret()).await?;
            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresAccountRepository::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory storage");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryAccountRepository::new()),
            )
        }
    };

    let app_state = AppState::new(user_repository, account_repository, token_config, hasher);
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
