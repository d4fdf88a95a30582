use std::str::FromStr;
use std::time::Duration;

use radmark_core::locator::DEFAULT_LOCATOR_BASE;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// How long restoration waits for the viewport to become ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Longest wait for a readiness change between two polls.
    pub poll_interval: Duration,
    /// Polls before restoration gives up.
    pub max_polls: u32,
    /// Fixed delay used when the viewport exposes no readiness signal.
    pub fallback_delay: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_polls: 50,
            fallback_delay: Duration::from_millis(500),
        }
    }
}

/// Pipeline configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Backend base URL, including the `/api` prefix.
    pub api_url: String,
    /// `<scheme>:<base>` prefix for locators built on restore.
    pub locator_base: String,
    /// Timeout applied to every backend request.
    pub request_timeout: Duration,
    pub readiness: ReadinessPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".into(),
            locator_base: DEFAULT_LOCATOR_BASE.into(),
            request_timeout: Duration::from_secs(30),
            readiness: ReadinessPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                              | Default                     |
    /// |--------------------------------------|-----------------------------|
    /// | `RADMARK_API_URL`                    | `http://localhost:8080/api` |
    /// | `RADMARK_LOCATOR_BASE`               | `wadors:/api/wado`          |
    /// | `RADMARK_REQUEST_TIMEOUT_SECS`       | `30`                        |
    /// | `RADMARK_RESTORE_POLL_INTERVAL_MS`   | `100`                       |
    /// | `RADMARK_RESTORE_MAX_POLLS`          | `50`                        |
    /// | `RADMARK_RESTORE_FALLBACK_DELAY_MS`  | `500`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = text(&lookup, "RADMARK_API_URL", defaults.api_url)?;
        let locator_base = text(&lookup, "RADMARK_LOCATOR_BASE", defaults.locator_base)?;

        let request_timeout_secs: u64 = number(&lookup, "RADMARK_REQUEST_TIMEOUT_SECS", 30)?;
        let poll_interval_ms: u64 = number(&lookup, "RADMARK_RESTORE_POLL_INTERVAL_MS", 100)?;
        let max_polls: u32 = number(&lookup, "RADMARK_RESTORE_MAX_POLLS", 50)?;
        let fallback_delay_ms: u64 = number(&lookup, "RADMARK_RESTORE_FALLBACK_DELAY_MS", 500)?;

        Ok(Self {
            api_url,
            locator_base,
            request_timeout: Duration::from_secs(request_timeout_secs),
            readiness: ReadinessPolicy {
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_polls,
                fallback_delay: Duration::from_millis(fallback_delay_ms),
            },
        })
    }
}

fn text<F>(lookup: &F, var: &'static str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(value) => Ok(value.trim().to_string()),
    }
}

fn number<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected: std::any::type_name::<T>(),
            value,
        }),
    }
}
