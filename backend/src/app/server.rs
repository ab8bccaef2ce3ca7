use std::error::Error;
use std::net::SocketAddr;
use std::str::FromStr;

use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app;
use crate::auth;
use crate::cfg;
use crate::core;

/// Application-level error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigLoadingFailed(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    DatabaseOperationFailed(#[from] core::DbError),

    #[error("Migration error: {0}")]
    MigrationFailed(#[from] app::MigrationError),

    #[error("JWT secret error: {0}")]
    JwtSecretFailed(#[from] auth::JwtError),

    #[error("CLI error: {0}")]
    CliOperationFailed(#[from] app::CliError),

    #[error("Network address parsing error: {0}")]
    AddressParsingFailed(#[from] std::net::AddrParseError),

    #[error("Server error: {0}")]
    ServerStartingFailed(#[from] std::io::Error),
}

pub async fn create_db_context(db_settings: &cfg::DatabaseSettings) -> Result<core::DbContext, core::DbError> {
    let options = SqliteConnectOptions::from_str(&db_settings.url)
        .map_err(core::DbError::ConnectionFailed)?
        .create_if_missing(true)
        .foreign_keys(true)
        // Increase SQLite busy timeout to handle concurrent connections better
        .busy_timeout(std::time::Duration::from_secs(30));
    let pool = SqlitePoolOptions::new()
        .max_connections(db_settings.max_connections)
        .connect_with(options)
        .await
        .map_err(core::DbError::ConnectionFailed)?;
    Ok(pool)
}

pub async fn run() {
    if let Err(e) = run_app().await {
        eprintln!("❌ {e}\n");

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("Caused by: {err}");
            source = err.source();
        }

        std::process::exit(1);
    }
}

async fn run_app() -> Result<(), AppError> {
    let cli = app::Cli::parse();
    let settings = cfg::AppSettings::new()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&settings.server.log_directives))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = create_db_context(&settings.database).await?;
    let is_migration = cli.command.as_ref().is_some_and(app::Command::is_migration);
    if settings.database.run_migrations_on_startup && !is_migration {
        app::run_migrations(&db).await?;
    }

    let jwt_secret = auth::resolve_jwt_secret(&settings.jwt)?;
    let jwt = auth::JwtContext::new(&settings.jwt, &jwt_secret);
    let context = core::Context::new(db, jwt, settings);

    match cli.command {
        None | Some(app::Command::Serve) => serve(context).await,
        Some(command) => Ok(app::run_cli(&context, command).await?),
    }
}

async fn serve(context: core::ArcContext) -> Result<(), AppError> {
    let server_address = context.settings.get_server_address();
    let address = server_address.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;

    tracing::info!("🚀 starting server");
    tracing::info!("   app_env: {}", cfg::AppSettings::get_app_run_env());
    tracing::info!("   cfg_dir: {}", cfg::AppSettings::get_config_full_path());
    tracing::info!("   logging: {}", context.settings.server.log_directives);
    tracing::info!("   votes:   {:?} duplicates", context.settings.board.duplicate_vote_policy);
    tracing::info!("   address: http://{}", server_address);

    let router = app::create_router(context);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Tokio signal handler that will wait for a user to press CTRL+C.
/// We use this in our `Server` method `with_graceful_shutdown`.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, shutting down gracefully"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
