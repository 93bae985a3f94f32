//! Environment-style configuration. Every knob is enumerated here; a
//! `.env` file is honored when present.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// Contacts are addressed by bit position, so the list cannot usefully
/// exceed the bitfield width.
pub const CONTACT_BITFIELD_WIDTH: usize = u64::BITS as usize;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Rule source origins, checked in order every cycle
    pub rule_sources: Vec<String>,
    /// Certificate-expiry lead time in days
    pub max_age_days: i64,
    /// Ordered contact list; position is the bitfield index
    pub contacts: Vec<String>,
    /// Sender identity for email alerts
    pub from: String,
    /// Message template identifier
    pub template: String,
    pub table_name: String,
    pub max_redirects: u32,
    pub database_path: String,
    pub poll_interval: Duration,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup, so tests can
    /// feed values without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rule_sources = split_list(&required(&lookup, "RULE_SOURCES")?);
        let contacts = split_list(&required(&lookup, "CONTACTS")?);
        if contacts.len() >= CONTACT_BITFIELD_WIDTH {
            warn!(
                "there are more contacts ({}) than bits available in the contact bitfield ({})",
                contacts.len(),
                CONTACT_BITFIELD_WIDTH
            );
        }

        let smtp = match lookup("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parsed_or(&lookup, "SMTP_PORT", 587)?,
                username: required(&lookup, "SMTP_USERNAME")?,
                password: required(&lookup, "SMTP_PASSWORD")?,
            }),
            None => None,
        };

        Ok(Self {
            rule_sources,
            max_age_days: parsed_or(&lookup, "MAX_AGE", 7)?,
            contacts,
            from: required(&lookup, "FROM")?,
            template: required(&lookup, "TEMPLATE")?,
            table_name: lookup("TABLE_NAME").unwrap_or_else(|| "MonitorStatus".to_string()),
            max_redirects: parsed_or(&lookup, "MAX_REDIRECTS", 10)?,
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "vigil.db".to_string()),
            poll_interval: Duration::from_secs(parsed_or(&lookup, "POLL_INTERVAL", 60)?),
            smtp,
        })
    }

    pub fn max_cert_age(&self) -> chrono::Duration {
        chrono::Duration::days(self.max_age_days)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';').map(str::trim).filter(|item| !item.is_empty()).map(String::from).collect()
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name).ok_or(ConfigError::MissingVar(name))
}

fn parsed_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidVar { name, value }),
        None => Ok(default),
    }
}
