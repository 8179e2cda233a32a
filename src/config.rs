//! Engine configuration profiles
//!
//! The engine ships two named profiles matching the two form flavours in use:
//! - `simple`: load failures surface immediately with a manual retry, list
//!   fields start with one blank row
//! - `dynamic`: load failures retry automatically (2 retries, 1 s apart),
//!   `array` fields start empty

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default number of automatic load retries for the retrying profile
pub const DEFAULT_MAX_LOAD_RETRIES: u32 = 2;

/// Default delay between automatic load attempts
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default form language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Error loading a profile from a configuration document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse engine profile: {0}")]
    ParseError(String),
}

/// Behavioural switches of the form engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineProfile {
    /// Retry failed field fetches automatically
    pub retry_on_load_failure: bool,

    /// Automatic retries after the first failed fetch
    pub max_load_retries: u32,

    /// Delay between automatic fetch attempts in milliseconds
    pub retry_delay_ms: u64,

    /// `array` fields start with one blank row instead of an empty list
    pub array_defaults_to_blank_row: bool,

    /// Require a required checkbox to be checked.
    /// Off by default: required checkboxes historically accept any value.
    pub enforce_required_checkbox: bool,

    /// Language used when a session does not pick one
    pub default_language: String,
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::simple()
    }
}

impl EngineProfile {
    /// Profile of the simple card form
    pub fn simple() -> Self {
        Self {
            retry_on_load_failure: false,
            max_load_retries: DEFAULT_MAX_LOAD_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            array_defaults_to_blank_row: true,
            enforce_required_checkbox: false,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Profile of the schema-driven dynamic form
    pub fn dynamic() -> Self {
        Self {
            retry_on_load_failure: true,
            array_defaults_to_blank_row: false,
            ..Self::simple()
        }
    }

    /// Create a builder starting from the simple profile
    pub fn builder() -> EngineProfileBuilder {
        EngineProfileBuilder::default()
    }

    /// Parse a profile from YAML (JSON is valid YAML as well)
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Automatic retries allowed after a failed fetch
    pub fn load_retries(&self) -> u32 {
        if self.retry_on_load_failure {
            self.max_load_retries
        } else {
            0
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Builder for EngineProfile
#[derive(Debug, Default)]
pub struct EngineProfileBuilder {
    profile: EngineProfile,
}

impl EngineProfileBuilder {
    /// Start from an existing profile
    pub fn from_profile(profile: EngineProfile) -> Self {
        Self { profile }
    }

    pub fn retry_on_load_failure(mut self, retry: bool) -> Self {
        self.profile.retry_on_load_failure = retry;
        self
    }

    pub fn max_load_retries(mut self, retries: u32) -> Self {
        self.profile.max_load_retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.profile.retry_delay_ms = delay.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn array_defaults_to_blank_row(mut self, blank_row: bool) -> Self {
        self.profile.array_defaults_to_blank_row = blank_row;
        self
    }

    pub fn enforce_required_checkbox(mut self, enforce: bool) -> Self {
        self.profile.enforce_required_checkbox = enforce;
        self
    }

    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.profile.default_language = language.into();
        self
    }

    /// Build the profile
    pub fn build(self) -> EngineProfile {
        self.profile
    }
}
