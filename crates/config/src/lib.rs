// Configuration Management
//
// This crate handles all configuration loading for the rewriter API.
// It provides:
// - Configuration structs
// - Environment loading logic (secrets are never compiled in)
// - Default configuration values
//
// This keeps configuration concerns separate from service logic.

use std::str::FromStr;
use thiserror::Error;

pub mod types;

// Re-export all configuration types
pub use types::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} not set")]
    MissingVar { name: String },

    #[error("{name} is invalid: {message}")]
    InvalidValue { name: String, message: String },
}

/// Source of configuration values, keyed by environment variable name.
///
/// `from_env` uses the process environment; tests pass a closure over a map.
pub trait ConfigSource {
    fn get(&self, name: &str) -> Option<String>;
}

impl<F> ConfigSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Reads the process environment
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Read a required, non-blank variable
pub(crate) fn required(source: &dyn ConfigSource, name: &str) -> Result<String, ConfigError> {
    source
        .get(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar {
            name: name.to_string(),
        })
}

/// Read an optional variable; blank values count as unset
pub(crate) fn optional(source: &dyn ConfigSource, name: &str) -> Option<String> {
    source.get(name).filter(|v| !v.trim().is_empty())
}

/// Parse a variable, falling back to `default` when unset
pub(crate) fn parse_or<T>(source: &dyn ConfigSource, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(source, name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                message: e.to_string(),
            }),
        None => Ok(default),
    }
}

/// Parse an optional variable
pub(crate) fn parse_optional<T>(source: &dyn ConfigSource, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(source, name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: e.to_string(),
                })
        })
        .transpose()
}

/// Main configuration loading interface
impl ApiConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource)
    }
}
