//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default minimum number of idle days before a deal is worth a nudge.
pub const DEFAULT_MIN_IDLE_DAYS: i64 = 7;

/// Default urgency a deal has to exceed.
pub const DEFAULT_MIN_URGENCY: u64 = 250;

/// Qualification thresholds and the operator's own identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NudgeConfig {
    /// Deals idle for fewer days than this are skipped.
    pub min_idle_days: i64,
    /// Urgency must be strictly greater than this.
    pub min_urgency: u64,
    /// The operator's own address. Anything else in a thread is the counterparty.
    pub self_email: String,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            min_idle_days: DEFAULT_MIN_IDLE_DAYS,
            min_urgency: DEFAULT_MIN_URGENCY,
            self_email: String::new(),
        }
    }
}

impl NudgeConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let min_idle_days = parse_env("NUDGE_MIN_IDLE_DAYS", DEFAULT_MIN_IDLE_DAYS)?;
        if min_idle_days < 0 {
            return Err(ConfigError::InvalidValue {
                key: "NUDGE_MIN_IDLE_DAYS".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        let min_urgency = parse_env("NUDGE_MIN_URGENCY", DEFAULT_MIN_URGENCY)?;

        let self_email = std::env::var("NUDGE_SELF_EMAIL")
            .or_else(|_| std::env::var("YOUR_EMAIL"))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Ok(Self {
            min_idle_days,
            min_urgency,
            self_email,
        })
    }

    pub fn with_thresholds(mut self, min_idle_days: i64, min_urgency: u64) -> Self {
        self.min_idle_days = min_idle_days;
        self.min_urgency = min_urgency;
        self
    }

    pub fn with_self_email(mut self, self_email: impl Into<String>) -> Self {
        self.self_email = self_email.into();
        self
    }
}

/// Where the CRM export, the email threads and the snapshot live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub crm_path: PathBuf,
    pub email_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            crm_path: PathBuf::from("data/crm_events.csv"),
            email_path: PathBuf::from("data/emails.json"),
            output_path: PathBuf::from("out/nudges.json"),
        }
    }
}

impl DataConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            crm_path: env_path("NUDGE_CRM_PATH").unwrap_or(defaults.crm_path),
            email_path: env_path("NUDGE_EMAIL_PATH").unwrap_or(defaults.email_path),
            output_path: env_path("NUDGE_OUTPUT_PATH").unwrap_or(defaults.output_path),
        }
    }
}

/// HTTP bind address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("NUDGE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env("NUDGE_PORT", 8000u16)?;
        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Read `key` from the environment, falling back to `default` when unset.
/// A value that is set but unparseable is an error rather than a silent default.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("{raw:?}: {e}"),
                })
        }
        _ => Ok(default),
    }
}
