//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Funnel(#[from] funnel_core::FunnelError),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Unknown funnel session")]
    SessionNotFound,
}

pub type Result<T> = std::result::Result<T, ServerError>;
