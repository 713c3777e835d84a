// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presence configuration
//!
//! Both structs deserialize from TOML so they can be embedded in a larger
//! agent configuration file.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Protocol-wide settings shared by pingers and observers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Node written to obtain a store-assigned "now"
    pub clock_path: String,
    /// Set/create rounds before a write gives up with `Contention`
    pub write_attempts: u32,
    /// Watch-setup restarts before a resolve gives up with `Contention`
    pub resolve_attempts: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            clock_path: "/clock".to_string(),
            write_attempts: 5,
            resolve_attempts: 5,
        }
    }
}

impl PresenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock_path(mut self, path: impl Into<String>) -> Self {
        self.clock_path = path.into();
        self
    }

    pub fn with_write_attempts(mut self, attempts: u32) -> Self {
        self.write_attempts = attempts;
        self
    }

    pub fn with_resolve_attempts(mut self, attempts: u32) -> Self {
        self.resolve_attempts = attempts;
        self
    }

    /// Parse and validate a TOML document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.clock_path.starts_with('/') || self.clock_path.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "clock_path must be an absolute node path, got {:?}",
                self.clock_path
            )));
        }
        if self.write_attempts == 0 {
            return Err(ConfigError::Invalid(
                "write_attempts must be at least 1".to_string(),
            ));
        }
        if self.resolve_attempts == 0 {
            return Err(ConfigError::Invalid(
                "resolve_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A heartbeat declared in configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingerConfig {
    /// Node the pinger owns
    pub path: String,
    /// How often the node is rewritten
    #[serde(with = "humantime_serde")]
    pub period: Duration,
}

impl PingerConfig {
    pub fn new(path: impl Into<String>, period: Duration) -> Self {
        Self {
            path: path.into(),
            period,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        if config.period.is_zero() {
            return Err(ConfigError::Invalid("period must be positive".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
