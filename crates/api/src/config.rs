use crate::auth::jwt::JwtConfig;

/// Default password for the bootstrap `superadmin` account.
pub const DEFAULT_SUPERADMIN_PASSWORD: &str = "admin123";

/// A configuration value is missing or unparseable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var} has invalid value `{value}`: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which [`bizdesk_db::Store`] implementation backs the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    /// Non-persistent; every restart starts empty.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub store: StoreBackend,
    pub jwt: JwtConfig,
    /// Password given to the bootstrap `superadmin` account.
    pub superadmin_password: String,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORE_BACKEND`        | `postgres` (or `memory`)   |
    /// | `DATABASE_URL`         | required for `postgres`    |
    /// | `JWT_SECRET`           | **required**               |
    /// | `SUPERADMIN_PASSWORD`  | `admin123`                 |
    /// | `LOG_FORMAT`           | `pretty` (or `json`)       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", var("PORT"), 5000u16)?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"), 30u64)?;

        let store = match var("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("postgres") => StoreBackend::Postgres {
                database_url: var("DATABASE_URL").ok_or(ConfigError::Missing {
                    var: "DATABASE_URL",
                })?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected `postgres` or `memory`".into(),
                })
            }
        };

        let secret = var("JWT_SECRET").ok_or(ConfigError::Missing { var: "JWT_SECRET" })?;

        let superadmin_password =
            var("SUPERADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_SUPERADMIN_PASSWORD.into());

        let log_format = match var("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected `pretty` or `json`".into(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store,
            jwt: JwtConfig::new(secret),
            superadmin_password,
            log_format,
        })
    }

    pub fn uses_default_superadmin_password(&self) -> bool {
        self.superadmin_password == DEFAULT_SUPERADMIN_PASSWORD
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_with_memory_store() {
        let config = load(&[("JWT_SECRET", "s3cret"), ("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.uses_default_superadmin_password());
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = load(&[("JWT_SECRET", "s3cret")]).unwrap_err();
        assert_matches!(err, ConfigError::Missing { var: "DATABASE_URL" });

        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/bizdesk"),
        ])
        .unwrap();
        assert_matches!(config.store, StoreBackend::Postgres { .. });
    }

    #[test]
    fn jwt_secret_is_required() {
        let err = load(&[("STORE_BACKEND", "memory"), ("JWT_SECRET", "  ")]).unwrap_err();
        assert_matches!(err, ConfigError::Missing { var: "JWT_SECRET" });
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = load(&[
            ("JWT_SECRET", "s"),
            ("STORE_BACKEND", "memory"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "PORT", .. });

        let err = load(&[("JWT_SECRET", "s"), ("STORE_BACKEND", "redis")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "STORE_BACKEND", .. });
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("STORE_BACKEND", "memory"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("SUPERADMIN_PASSWORD", "rotated-pass"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.uses_default_superadmin_password());
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
