use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::DocumentStore;
use crate::config::{DatabaseConfig, StorageBackend};
use crate::filter::FilterError;

/// Errors from the document stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the process-wide store handle from configuration.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the configured backend. The returned handle is shared by all
    /// request handlers and closed once on shutdown.
    pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory document store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let pool = Self::connect(config).await?;
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::connection_string(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;
        info!("Created database pool for: {}", config.name);
        Ok(pool)
    }

    /// `DATABASE_URL` wins; otherwise compose one from host, port, database
    /// name and the `DB_USER` / `DB_PASSWORD` credentials.
    pub fn connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = &config.url {
            url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            return Ok(url.clone());
        }

        let user = config.user.as_deref().ok_or(DatabaseError::ConfigMissing("DB_USER"))?;
        let password = config.password.as_deref().ok_or(DatabaseError::ConfigMissing("DB_PASSWORD"))?;

        let mut url = url::Url::parse(&format!("postgres://{}:{}", config.host, config.port))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_username(user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_password(Some(password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_path(&format!("/{}", config.name));
        Ok(url.into())
    }
}
