//! Runtime settings, read from `KEYSHOP_*` environment variables (and `.env` if present).

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials of the admin account created at startup if no account uses its email.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Outgoing mail server. Port 465 uses implicit TLS; any other port upgrades with STARTTLS.
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: String,
    /// SQLite file, or `:memory:` for a store that lives as long as the process.
    pub database: String,
    pub actor_buffer: usize,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub notify_workers: usize,
    pub notify_max_retries: u32,
    pub notify_initial_delay: Duration,
    pub mail_from: String,
    pub currency: String,
    /// Mail goes to the console when unset.
    pub smtp: Option<SmtpSettings>,
    pub admin: Option<BootstrapAdmin>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".into(),
            database: "keyshop.db".into(),
            actor_buffer: 32,
            access_ttl_minutes: 60,
            refresh_ttl_days: 7,
            notify_workers: 2,
            notify_max_retries: 3,
            notify_initial_delay: Duration::from_secs(60),
            mail_from: "no-reply@keyshop.local".into(),
            currency: "MGA".into(),
            smtp: None,
            admin: None,
        }
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

impl Config {
    /// Defaults with an in-memory database.
    pub fn in_memory() -> Self {
        Self {
            database: ":memory:".into(),
            ..Self::default()
        }
    }

    /// Loads `.env` (if any), then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; unset variables keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let admin = match (lookup("KEYSHOP_ADMIN_EMAIL"), lookup("KEYSHOP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.trim().is_empty() => {
                Some(BootstrapAdmin { email, password })
            }
            _ => None,
        };
        let smtp = match lookup("KEYSHOP_SMTP_HOST") {
            Some(host) if !host.trim().is_empty() => Some(SmtpSettings {
                host: host.trim().to_string(),
                port: parsed(&lookup, "KEYSHOP_SMTP_PORT", 587)?,
                username: lookup("KEYSHOP_SMTP_USERNAME").filter(|name| !name.is_empty()),
                password: lookup("KEYSHOP_SMTP_PASSWORD"),
            }),
            _ => None,
        };

        Ok(Self {
            bind: lookup("KEYSHOP_BIND").unwrap_or(defaults.bind),
            database: lookup("KEYSHOP_DATABASE").unwrap_or(defaults.database),
            actor_buffer: parsed(&lookup, "KEYSHOP_ACTOR_BUFFER", defaults.actor_buffer)?,
            access_ttl_minutes: parsed(
                &lookup,
                "KEYSHOP_ACCESS_TTL_MINUTES",
                defaults.access_ttl_minutes,
            )?,
            refresh_ttl_days: parsed(&lookup, "KEYSHOP_REFRESH_TTL_DAYS", defaults.refresh_ttl_days)?,
            notify_workers: parsed(&lookup, "KEYSHOP_NOTIFY_WORKERS", defaults.notify_workers)?,
            notify_max_retries: parsed(
                &lookup,
                "KEYSHOP_NOTIFY_MAX_RETRIES",
                defaults.notify_max_retries,
            )?,
            notify_initial_delay: Duration::from_secs(parsed(
                &lookup,
                "KEYSHOP_NOTIFY_INITIAL_DELAY_SECS",
                defaults.notify_initial_delay.as_secs(),
            )?),
            mail_from: lookup("KEYSHOP_MAIL_FROM").unwrap_or(defaults.mail_from),
            currency: lookup("KEYSHOP_CURRENCY").unwrap_or(defaults.currency),
            smtp,
            admin,
        })
    }
}
