//! Process settings read from the environment (and `.env` when present).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// First path segment of every resource route, e.g. "v1".
    pub api_version: String,
    pub db_max_connections: u32,
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Settings {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3000";
    pub const DEFAULT_API_VERSION: &'static str = "v1";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any variable source. Unset or blank variables take their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let api_version = get("API_VERSION").unwrap_or_else(|| Self::DEFAULT_API_VERSION.into());
        if api_version.contains('/') {
            return Err(ConfigError::Invalid {
                name: "API_VERSION",
                value: api_version,
            });
        }
        Ok(Settings {
            database_url,
            bind_addr: parsed(get("BIND_ADDR"), "BIND_ADDR", || {
                SocketAddr::from(([0, 0, 0, 0], 3000))
            })?,
            api_version,
            db_max_connections: parsed(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", || {
                Self::DEFAULT_MAX_CONNECTIONS
            })?,
            request_timeout: Duration::from_secs(parsed(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", || {
                Self::DEFAULT_TIMEOUT_SECS
            })?),
            body_limit_bytes: parsed(get("BODY_LIMIT_BYTES"), "BODY_LIMIT_BYTES", || Self::DEFAULT_BODY_LIMIT)?,
        })
    }

    /// Mount path for a table, e.g. "/v1/tasks".
    pub fn base_path(&self, table: &str) -> String {
        format!("/{}/{}", self.api_version, table)
    }
}

fn parsed<V: FromStr>(raw: Option<String>, name: &'static str, default: impl FnOnce() -> V) -> Result<V, ConfigError> {
    match raw {
        None => Ok(default()),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/app")]).unwrap();
        assert_eq!(s.bind_addr.to_string(), Settings::DEFAULT_BIND_ADDR);
        assert_eq!(s.api_version, "v1");
        assert_eq!(s.db_max_connections, 5);
        assert_eq!(s.request_timeout, Duration::from_secs(30));
        assert_eq!(s.body_limit_bytes, 1 << 20);
        assert_eq!(s.base_path("tasks"), "/v1/tasks");
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(settings(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
        assert!(matches!(
            settings(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = settings(&[("DATABASE_URL", "postgres://x"), ("DB_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", .. }));
        let err = settings(&[("DATABASE_URL", "postgres://x"), ("BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
        let err = settings(&[("DATABASE_URL", "postgres://x"), ("API_VERSION", "v1/x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "API_VERSION", .. }));
    }
}
