use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub home_page_limit: i64,
    pub default_log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub access_token_secret: String,
    pub token_expiry_secs: i64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Build the configuration from the environment preset selected by
    /// `APP_ENV`, then apply individual variable overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().map_err(|_| ConfigError::Invalid { name: "PORT", value: v })?;
        }

        // Database
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "postgres" | "pg" => StorageBackend::Postgres,
                "memory" | "mem" => StorageBackend::Memory,
                _ => return Err(ConfigError::Invalid { name: "STORAGE_BACKEND", value: v }),
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = Some(v);
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = Some(v);
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API
        if let Ok(v) = env::var("HOME_PAGE_LIMIT") {
            self.api.home_page_limit = v.parse().unwrap_or(self.api.home_page_limit);
        }

        // Security
        if let Ok(v) = env::var("ACCESS_TOKEN_SECRET") {
            self.security.access_token_secret = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_EXPIRY_SECS") {
            self.security.token_expiry_secs = v.parse().unwrap_or(self.security.token_expiry_secs);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.access_token_secret.is_empty() {
            return Err(ConfigError::Missing("ACCESS_TOKEN_SECRET"));
        }
        if self.database.backend == StorageBackend::Postgres && self.database.url.is_none() {
            if self.database.user.is_none() {
                return Err(ConfigError::Missing("DB_USER"));
            }
            if self.database.password.is_none() {
                return Err(ConfigError::Missing("DB_PASSWORD"));
            }
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// In-memory configuration with a fixed secret, for tests and local runs.
    pub fn in_memory(secret: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.database.backend = StorageBackend::Memory;
        config.security.access_token_secret = secret.into();
        config
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 5000 },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                user: None,
                password: None,
                host: "localhost".to_string(),
                port: 5432,
                name: "summer_camp".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                home_page_limit: 6,
                default_log_filter: "info,summer_camp_api=debug,tower_http=debug".to_string(),
            },
            security: SecurityConfig {
                access_token_secret: String::new(),
                token_expiry_secs: 60 * 60,
                cors_origins: vec![],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 5000 },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                user: None,
                password: None,
                host: "localhost".to_string(),
                port: 5432,
                name: "summer_camp".to_string(),
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                home_page_limit: 6,
                default_log_filter: "info,tower_http=info".to_string(),
            },
            security: SecurityConfig {
                access_token_secret: String::new(),
                token_expiry_secs: 60 * 60,
                cors_origins: vec![],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 5000 },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                user: None,
                password: None,
                host: "localhost".to_string(),
                port: 5432,
                name: "summer_camp".to_string(),
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                home_page_limit: 6,
                default_log_filter: "warn,summer_camp_api=info".to_string(),
            },
            security: SecurityConfig {
                access_token_secret: String::new(),
                token_expiry_secs: 60 * 60,
                cors_origins: vec![],
            },
        }
    }
}
