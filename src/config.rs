use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "lead-intake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bodies shorter than this (in characters) are never leads.
pub const MIN_LEAD_BODY_CHARS: usize = 500;

/// Inclusive age bounds for subscribers and spouses.
pub const ADULT_MIN_AGE: u32 = 18;
pub const ADULT_MAX_AGE: u32 = 110;

/// Inclusive age bounds for children.
pub const CHILD_MIN_AGE: u32 = 0;
pub const CHILD_MAX_AGE: u32 = 27;

/// Environment variable enabling the text-understanding fallback.
pub const ENV_FALLBACK_URL: &str = "LEAD_INTAKE_FALLBACK_URL";
pub const ENV_FALLBACK_MODEL: &str = "LEAD_INTAKE_FALLBACK_MODEL";
pub const ENV_FALLBACK_TIMEOUT: &str = "LEAD_INTAKE_FALLBACK_TIMEOUT_SECS";

const DEFAULT_FALLBACK_MODEL: &str = "llama3.1";
const DEFAULT_FALLBACK_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "lead_intake=info,warn"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },
}

/// Settings for the external text-understanding fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl FallbackConfig {
    /// Read fallback settings from the process environment.
    ///
    /// Returns `Ok(None)` when `LEAD_INTAKE_FALLBACK_URL` is unset or blank:
    /// the fallback is opt-in.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup(ENV_FALLBACK_URL) {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => return Ok(None),
        };

        let model = lookup(ENV_FALLBACK_MODEL)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_MODEL.to_string());

        let timeout_secs = match lookup(ENV_FALLBACK_TIMEOUT) {
            None => DEFAULT_FALLBACK_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: ENV_FALLBACK_TIMEOUT.to_string(),
                        value: raw,
                    })
                }
            },
        };

        Ok(Some(Self {
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}
