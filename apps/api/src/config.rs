use anyhow::{bail, Context, Result};

use crate::recommendation::store::DEFAULT_SETTINGS_KEY;

/// Which backend supplies jobs and seeker profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    PortalApi {
        base_url: String,
        token: Option<String>,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backend is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: CatalogBackend,
    /// Absent → settings overrides live in process memory only.
    pub redis_url: Option<String>,
    pub settings_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let backend = get("JOB_CATALOG").unwrap_or_else(|| "postgres".to_string());
        let catalog = match backend.trim().to_lowercase().as_str() {
            "postgres" => CatalogBackend::Postgres {
                database_url: require("DATABASE_URL")?,
                max_connections: get("DB_MAX_CONNECTIONS")
                    .map(|v| v.parse::<u32>())
                    .transpose()
                    .context("DB_MAX_CONNECTIONS must be a positive integer")?
                    .unwrap_or(10),
            },
            "portal_api" => CatalogBackend::PortalApi {
                base_url: require("PORTAL_API_URL")?,
                token: get("PORTAL_API_TOKEN"),
            },
            other => bail!("JOB_CATALOG must be 'postgres' or 'portal_api', got '{other}'"),
        };

        Ok(Config {
            catalog,
            redis_url: get("REDIS_URL"),
            settings_key: get("RECOMMENDATION_SETTINGS_KEY")
                .unwrap_or_else(|| DEFAULT_SETTINGS_KEY.to_string()),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_postgres_is_default_backend() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/portal")]).unwrap();
        assert_eq!(
            config.catalog,
            CatalogBackend::Postgres {
                database_url: "postgres://localhost/portal".to_string(),
                max_connections: 10,
            }
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.settings_key, DEFAULT_SETTINGS_KEY);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_portal_api_backend() {
        let config = load(&[
            ("JOB_CATALOG", "portal_api"),
            ("PORTAL_API_URL", "https://portal.example.com/api"),
            ("PORTAL_API_TOKEN", "t0k"),
            ("REDIS_URL", "redis://cache:6379"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(
            config.catalog,
            CatalogBackend::PortalApi {
                base_url: "https://portal.example.com/api".to_string(),
                token: Some("t0k".to_string()),
            }
        );
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = load(&[("JOB_CATALOG", "mongo")]).unwrap_err();
        assert!(err.to_string().contains("mongo"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(load(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")]).is_err());
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let config = load(&[("DATABASE_URL", "postgres://x"), ("REDIS_URL", "  ")]).unwrap();
        assert!(config.redis_url.is_none());
    }
}
