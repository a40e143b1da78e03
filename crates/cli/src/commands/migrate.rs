//! Database migration command.
//!
//! Applies `crates/web/migrations/` and creates the session store table.
//!
//! # Environment Variables
//!
//! - `IDEABOX_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors from running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<SecretString, MigrationError> {
    std::env::var("IDEABOX_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("IDEABOX_DATABASE_URL"))
}

/// Run all board migrations.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let _ = dotenvy::dotenv();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running board migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Creating session store...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
