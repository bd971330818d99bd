use std::env;
use std::time::Duration;

use url::Url;

use practice_core::model::{Subject, Topic};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SUBJECT: &str = "Mathematics";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the practice backend lives and what to practice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeConfig {
    pub api_url: Url,
    pub subject: Subject,
    pub topic: Option<Topic>,
    pub timeout: Duration,
}

impl PracticeConfig {
    /// Load from `PRACTICE_API_URL`, `PRACTICE_SUBJECT`, `PRACTICE_TOPIC` and
    /// `PRACTICE_TIMEOUT_SECS`, falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PracticeConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a present value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::defaults()?;
        if let Some(raw) = lookup("PRACTICE_API_URL") {
            config.set_api_url(&raw)?;
        }
        if let Some(raw) = lookup("PRACTICE_SUBJECT") {
            config.set_subject(&raw)?;
        }
        if let Some(raw) = lookup("PRACTICE_TOPIC").filter(|raw| !raw.trim().is_empty()) {
            config.set_topic(&raw)?;
        }
        if let Some(raw) = lookup("PRACTICE_TIMEOUT_SECS") {
            config.set_timeout_secs(&raw)?;
        }
        Ok(config)
    }

    /// Built-in defaults, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only if the built-in constants are invalid.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: Url::parse(DEFAULT_API_URL).map_err(|e| ConfigError::InvalidUrl {
                raw: DEFAULT_API_URL.to_owned(),
                reason: e.to_string(),
            })?,
            subject: Subject::new(DEFAULT_SUBJECT)
                .map_err(|_| ConfigError::InvalidSubject(DEFAULT_SUBJECT.to_owned()))?,
            topic: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` unless `raw` is an absolute http(s) URL.
    pub fn set_api_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            raw: raw.to_owned(),
            reason,
        };
        let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        self.api_url = url;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSubject` for a blank name.
    pub fn set_subject(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.subject =
            Subject::new(raw).map_err(|_| ConfigError::InvalidSubject(raw.to_owned()))?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTopic` for a blank name.
    pub fn set_topic(&mut self, raw: &str) -> Result<(), ConfigError> {
        let topic = Topic::new(raw).map_err(|_| ConfigError::InvalidTopic(raw.to_owned()))?;
        self.topic = Some(topic);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTimeout` unless `raw` is a positive integer.
    pub fn set_timeout_secs(&mut self, raw: &str) -> Result<(), ConfigError> {
        let secs: u64 = raw
            .trim()
            .parse()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_owned()))?;
        self.timeout = Duration::from_secs(secs);
        Ok(())
    }
}
