//! Application configuration - database, retry policy and namespace
//!
//! Configuration is loaded from environment variables:
//! - `POSTGRES_HOST` (default: my-postgres-cluster)
//! - `POSTGRES_PORT` (default: 5432)
//! - `POSTGRES_DB` (default: mydatabase)
//! - `POSTGRES_USER` (default: myapp)
//! - `POSTGRES_PASSWORD` (default: unset)
//! - `KUBERNETES_NAMESPACE` (default: default)
//! - `DB_CONNECT_ATTEMPTS` (default: 15)
//! - `DB_CONNECT_TIMEOUT_SECS` (default: 10)

use std::time::Duration;

use crate::db::RetryPolicy;

const DEFAULT_HOST: &str = "my-postgres-cluster";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "mydatabase";
const DEFAULT_USER: &str = "myapp";
const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the Postgres instance
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    /// Upper bound on a single connect attempt
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_USER.to_string(),
            password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub retry: RetryPolicy,
    /// Namespace listed by the cluster-info page
    pub namespace: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            retry: RetryPolicy::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl AppConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup (for testing)
    ///
    /// Empty values are treated as unset. Numeric values that fail to
    /// parse fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let database = DatabaseConfig {
            host: get("POSTGRES_HOST").unwrap_or(defaults.database.host),
            port: parse_or("POSTGRES_PORT", get("POSTGRES_PORT"), defaults.database.port),
            database: get("POSTGRES_DB").unwrap_or(defaults.database.database),
            user: get("POSTGRES_USER").unwrap_or(defaults.database.user),
            password: get("POSTGRES_PASSWORD"),
            connect_timeout: Duration::from_secs(parse_or(
                "DB_CONNECT_TIMEOUT_SECS",
                get("DB_CONNECT_TIMEOUT_SECS"),
                defaults.database.connect_timeout.as_secs(),
            )),
        };

        let retry = RetryPolicy {
            max_attempts: parse_or(
                "DB_CONNECT_ATTEMPTS",
                get("DB_CONNECT_ATTEMPTS"),
                defaults.retry.max_attempts,
            )
            .max(1),
            ..defaults.retry
        };

        Self {
            database,
            retry,
            namespace: get("KUBERNETES_NAMESPACE").unwrap_or(defaults.namespace),
        }
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
        None => default,
    }
}
