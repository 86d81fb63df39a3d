use crate::error::AuctionError;
use axum_extra::extract::cookie::Key;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Service configuration.
///
/// Defaults are overridden by `AUCTIONS_*` environment variables; the bare
/// `DATABASE_URL` is honoured too so the usual sqlx setup keeps working.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Postgres connection string. Unset means the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// At least 64 bytes. Unset means a fresh key per process.
    pub session_secret: Option<String>,
    pub log_level: String,
    pub max_connections: u32,
    /// CORS origin; unset allows any.
    pub allowed_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: "0.0.0.0:3000".to_string(),
            session_secret: None,
            log_level: "info".to_string(),
            max_connections: 5,
            allowed_origin: None,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&["DATABASE_URL"]))
            .merge(Env::prefixed("AUCTIONS_"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Key for the private session cookie.
    pub fn cookie_key(&self) -> Result<Key, AuctionError> {
        match self.session_secret.as_deref() {
            Some(secret) => Key::try_from(secret.as_bytes()).map_err(|_| {
                AuctionError::Config("session_secret must be at least 64 bytes".to_string())
            }),
            None => Ok(Key::generate()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_fill_unset_fields() {
        Jail::expect_with(|_jail| {
            let config = Config::load()?;
            assert_eq!(config.bind_addr, "0.0.0.0:3000");
            assert_eq!(config.log_level, "info");
            assert_eq!(config.max_connections, 5);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/auctions");
            jail.set_env("AUCTIONS_BIND_ADDR", "127.0.0.1:8080");
            jail.set_env("AUCTIONS_MAX_CONNECTIONS", "12");

            let config = Config::load()?;
            assert_eq!(
                config.database_url.as_deref(),
                Some("postgres://localhost/auctions")
            );
            assert_eq!(config.bind_addr, "127.0.0.1:8080");
            assert_eq!(config.max_connections, 12);
            assert_eq!(config.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn short_session_secret_is_rejected() {
        let config = Config {
            session_secret: Some("too-short".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.cookie_key(), Err(AuctionError::Config(_))));

        let config = Config {
            session_secret: Some("k".repeat(64)),
            ..Config::default()
        };
        assert!(config.cookie_key().is_ok());
    }
}
