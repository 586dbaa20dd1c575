use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub token: String,
}

// 不在日志中输出 token
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig").field("token", &"***").finish()
    }
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
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_per_page: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: crate::models::DEFAULT_PER_PAGE,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            api: ApiConfig {
                token: String::new(),
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: "postgres://localhost/invoices".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 10,
            },
            pagination: PaginationConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 → config/invoice-api.* (可选) → INVOICE_API__* 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/invoice-api")
    }

    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("api.token", defaults.api.token)?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", defaults.database.url)?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default(
                "database.acquire_timeout_secs",
                defaults.database.acquire_timeout_secs as i64,
            )?
            .set_default(
                "pagination.default_per_page",
                defaults.pagination.default_per_page,
            )?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("INVOICE_API")
                    .prefix_separator("__")
                    .separator("__"),
            );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.token.is_empty() {
            return Err(ConfigError::Message(
                "api.token must be set (INVOICE_API__API__TOKEN)".to_string(),
            ));
        }
        if self.pagination.default_per_page < 1 {
            return Err(ConfigError::Message(
                "pagination.default_per_page must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_a_token() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.pagination.default_per_page, 5);
    }

    #[test]
    fn token_is_not_logged() {
        let mut config = AppConfig::default();
        config.api.token = "sweetpotato".to_string();
        assert!(config.validate().is_ok());
        assert!(!format!("{:?}", config).contains("sweetpotato"));
    }

    #[test]
    fn backend_names_are_lowercase() {
        let backend: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StorageBackend::Memory);
    }
}
