// src/config.rs
//! Configuration for a [`TypeSystem`](crate::TypeSystem).
//!
//! Every field has a sensible default, so a TOML file only needs to name the
//! settings it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits and sizing hints used by type resolution and path navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeSystemConfig {
    /// Initial capacity of each type constructor's cache.
    pub initial_cache_capacity: usize,
    /// Longest path that path navigation will follow.
    pub max_path_depth: usize,
    /// Deepest nesting accepted when parsing a type reference from text.
    pub max_type_ref_depth: usize,
}

/// The configuration used when nothing else is specified.
pub const DEFAULT_CONFIG: TypeSystemConfig = TypeSystemConfig {
    initial_cache_capacity: 16,
    max_path_depth: 64,
    max_type_ref_depth: 32,
};

impl Default for TypeSystemConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse type system config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to write type system config: {0}")]
    Write(#[from] toml::ser::Error),
}

impl TypeSystemConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_take_defaults() {
        let config = TypeSystemConfig::from_toml_str("max_path_depth = 8").unwrap();
        assert_eq!(config.max_path_depth, 8);
        assert_eq!(config.initial_cache_capacity, DEFAULT_CONFIG.initial_cache_capacity);
        assert_eq!(config.max_type_ref_depth, DEFAULT_CONFIG.max_type_ref_depth);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(TypeSystemConfig::from_toml_str("").unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn toml_round_trip() {
        let config = TypeSystemConfig {
            initial_cache_capacity: 4,
            ..DEFAULT_CONFIG
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(TypeSystemConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(TypeSystemConfig::from_toml_str("max_path_depth = \"deep\"").is_err());
    }
}
