//! Bootstrap configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tiller_enhance::EnhancementStrategy;

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration source failed to parse
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Runtime configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TillerConfig {
    /// How component types gain interception behavior
    pub strategy: EnhancementStrategy,
    /// Whether non-lazy beans are constructed at bootstrap
    pub eager_init: bool,
    /// Default quiet period for debounced listeners, in milliseconds
    pub debounce_delay_ms: u64,
}

impl Default for TillerConfig {
    fn default() -> Self {
        Self {
            strategy: EnhancementStrategy::Wrapping,
            eager_init: true,
            debounce_delay_ms: 200,
        }
    }
}

impl TillerConfig {
    /// Parse a configuration from TOML
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TillerConfig::default();
        assert_eq!(config.strategy, EnhancementStrategy::Wrapping);
        assert!(config.eager_init);
        assert_eq!(config.debounce_delay_ms, 200);
    }

    #[test]
    fn test_from_toml() {
        let config = TillerConfig::from_toml(
            r#"
            strategy = "global_registration"
            eager_init = false
            debounce_delay_ms = 400
            "#,
        )
        .unwrap();
        assert_eq!(config.strategy, EnhancementStrategy::GlobalRegistration);
        assert!(!config.eager_init);
        assert_eq!(config.debounce_delay_ms, 400);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = TillerConfig::from_toml("eager_init = false").unwrap();
        assert_eq!(config.strategy, EnhancementStrategy::Wrapping);
        assert_eq!(config.debounce_delay_ms, 200);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(matches!(
            TillerConfig::from_toml("strategy = \"bytecode\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
