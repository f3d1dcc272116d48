//! Configuration loading and representation.
//!
//! Values come from the environment through a lookup function so tests can
//! inject them without touching process state.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 3600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

/// Administrator account created at startup when absent.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedConfig {
    pub admin: Option<AdminSeed>,
    pub demo_data: bool,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Allowed CORS origin; `None` allows any.
    pub frontend_url: Option<String>,
    pub seed: SeedConfig,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("frontend_url", &self.frontend_url)
            .field("seed", &self.seed)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = match (get("BIND_ADDR"), get("PORT")) {
            (Some(addr), _) => addr
                .parse()
                .map_err(|_| invalid("BIND_ADDR", format!("'{addr}' is not a socket address")))?,
            (None, Some(port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| invalid("PORT", format!("'{port}' is not a port number")))?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
            (None, None) => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| invalid("BIND_ADDR", "default is not a socket address"))?,
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let ttl_secs = match get("TOKEN_TTL_SECS") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| invalid("TOKEN_TTL_SECS", format!("'{raw}' is not an integer")))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };
        if ttl_secs <= 0 {
            return Err(invalid("TOKEN_TTL_SECS", "must be greater than zero"));
        }
        if ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(invalid(
                "TOKEN_TTL_SECS",
                format!("must be at most {MAX_TOKEN_TTL_SECS} seconds"),
            ));
        }
        let token_ttl = Duration::try_seconds(ttl_secs)
            .ok_or_else(|| invalid("TOKEN_TTL_SECS", "out of range"))?;

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                username: get("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        let demo_data = match get("SEED_DEMO_DATA").as_deref() {
            None => false,
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            Some(other) => {
                return Err(invalid("SEED_DEMO_DATA", format!("'{other}' is not a boolean")));
            }
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            database_url: get("DATABASE_URL"),
            frontend_url: get("FRONTEND_URL"),
            seed: SeedConfig { admin, demo_data },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3001");
        assert_eq!(cfg.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(cfg.token_ttl, Duration::hours(1));
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.seed, SeedConfig::default());
    }

    #[test]
    fn port_only_overrides_port() {
        let cfg = load(&[("PORT", "8080")]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");

        let cfg = load(&[("PORT", "8080"), ("BIND_ADDR", "127.0.0.1:9000")]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn ttl_must_be_positive_integer() {
        assert_eq!(
            load(&[("TOKEN_TTL_SECS", "120")]).unwrap().token_ttl,
            Duration::minutes(2)
        );
        assert!(load(&[("TOKEN_TTL_SECS", "0")]).is_err());
        assert!(load(&[("TOKEN_TTL_SECS", "soon")]).is_err());
    }

    #[test]
    fn ttl_is_bounded() {
        assert!(load(&[("TOKEN_TTL_SECS", "9223372036854775807")]).is_err());
        assert!(load(&[("TOKEN_TTL_SECS", "9000000000000")]).is_err());

        let max = MAX_TOKEN_TTL_SECS.to_string();
        assert_eq!(
            load(&[("TOKEN_TTL_SECS", max.as_str())]).unwrap().token_ttl,
            Duration::days(365)
        );
    }

    #[test]
    fn admin_seed_needs_email_and_password() {
        assert!(load(&[("ADMIN_EMAIL", "root@example.com")]).unwrap().seed.admin.is_none());

        let cfg = load(&[
            ("ADMIN_EMAIL", "root@example.com"),
            ("ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();
        let admin = cfg.seed.admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "root@example.com");
    }

    #[test]
    fn demo_flag_parsing() {
        assert!(load(&[("SEED_DEMO_DATA", "true")]).unwrap().seed.demo_data);
        assert!(!load(&[("SEED_DEMO_DATA", "0")]).unwrap().seed.demo_data);
        assert!(load(&[("SEED_DEMO_DATA", "maybe")]).is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let cfg = load(&[
            ("JWT_SECRET", "super-secret"),
            ("DATABASE_URL", "postgres://u:pw@localhost/db"),
        ])
        .unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("pw@localhost"));
    }
}
