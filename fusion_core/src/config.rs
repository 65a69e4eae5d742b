//! Configuration loading for pacing and the oracle client.

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

/// Environment variables checked, in order, when no API key is configured.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(
        "display_hold_ms ({display_hold_ms}) must be longer than min_fusion_ms ({min_fusion_ms})"
    )]
    InvalidTiming {
        min_fusion_ms: u64,
        display_hold_ms: u64,
    },
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlchemyConfig {
    pub fusion: FusionTiming,
    pub oracle: OracleConfig,
}

impl AlchemyConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.fusion.validate()?;
        Ok(config)
    }
}

/// Pacing of a fusion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionTiming {
    /// Minimum time spent in the fusing phase, however fast the oracle answers.
    pub min_fusion_ms: u64,

    /// How long a result stays on display before the session returns to idle.
    pub display_hold_ms: u64,
}

impl Default for FusionTiming {
    fn default() -> Self {
        Self {
            min_fusion_ms: 800,
            display_hold_ms: 2000,
        }
    }
}

impl FusionTiming {
    pub fn new(min_fusion: Duration, display_hold: Duration) -> Result<Self, ConfigError> {
        let timing = Self {
            min_fusion_ms: u64::try_from(min_fusion.as_millis()).unwrap_or(u64::MAX),
            display_hold_ms: u64::try_from(display_hold.as_millis()).unwrap_or(u64::MAX),
        };
        timing.validate()?;
        Ok(timing)
    }

    pub fn min_fusion(&self) -> Duration {
        Duration::from_millis(self.min_fusion_ms)
    }

    pub fn display_hold(&self) -> Duration {
        Duration::from_millis(self.display_hold_ms)
    }

    /// The hold must outlast the pacing floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_hold_ms <= self.min_fusion_ms {
            return Err(ConfigError::InvalidTiming {
                min_fusion_ms: self.min_fusion_ms,
                display_hold_ms: self.display_hold_ms,
            });
        }
        Ok(())
    }
}

/// Settings for the HTTP fusion oracle.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,

    /// Answer failed calls with the glitch sentinel instead of an error.
    pub fallback_on_error: bool,

    /// Overrides the environment variables in [`API_KEY_ENV_VARS`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
            fallback_on_error: true,
            api_key: None,
        }
    }
}

impl OracleConfig {
    /// The configured key, else the first non-empty environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|var| env::var(var).ok())
    }

    /// Same as [`Self::resolve_api_key`], reading variables through `lookup`.
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|var| lookup(*var))
                    .find(|key| !key.trim().is_empty())
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Manual Debug impl to keep the API key out of logs.
impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("fallback_on_error", &self.fallback_on_error)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlchemyConfig::from_toml_str("").unwrap();

        assert_eq!(config.fusion.min_fusion(), Duration::from_millis(800));
        assert_eq!(config.fusion.display_hold(), Duration::from_millis(2000));
        assert_eq!(config.oracle.model, "gemini-2.5-flash");
        assert!(config.oracle.fallback_on_error);
    }

    #[test]
    fn test_partial_override() {
        let config = AlchemyConfig::from_toml_str(
            r#"
            [fusion]
            min_fusion_ms = 300

            [oracle]
            model = "gemini-2.5-pro"
            fallback_on_error = false
            "#,
        )
        .unwrap();

        assert_eq!(config.fusion.min_fusion_ms, 300);
        assert_eq!(config.fusion.display_hold_ms, 2000);
        assert_eq!(config.oracle.model, "gemini-2.5-pro");
        assert!(!config.oracle.fallback_on_error);
        assert_eq!(config.oracle.timeout_secs, 30);
    }

    #[test]
    fn test_hold_must_outlast_floor() {
        let err = AlchemyConfig::from_toml_str(
            r#"
            [fusion]
            min_fusion_ms = 2000
            display_hold_ms = 2000
            "#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidTiming {
                min_fusion_ms: 2000,
                display_hold_ms: 2000
            }
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = AlchemyConfig::from_toml_str("[fusion\nmin_fusion_ms = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AlchemyConfig::load("/nonexistent/alchemy.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_timing_constructor() {
        let timing =
            FusionTiming::new(Duration::from_millis(100), Duration::from_millis(500)).unwrap();
        assert_eq!(timing.min_fusion_ms, 100);

        assert!(FusionTiming::new(Duration::from_secs(3), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_timing_saturates_huge_durations() {
        let timing = FusionTiming::new(Duration::from_millis(800), Duration::MAX).unwrap();
        assert_eq!(timing.display_hold_ms, u64::MAX);

        let err = FusionTiming::new(Duration::MAX, Duration::MAX).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTiming {
                min_fusion_ms: u64::MAX,
                display_hold_ms: u64::MAX
            }
        ));
    }

    #[test]
    fn test_configured_key_wins() {
        let config = OracleConfig {
            api_key: Some("from-config".to_string()),
            ..OracleConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_key_lookup_order() {
        let config = OracleConfig::default();
        let env = |var: &str| match var {
            "GEMINI_API_KEY" => Some("  ".to_string()),
            "API_KEY" => Some("from-api-key".to_string()),
            _ => None,
        };

        assert_eq!(
            config.resolve_api_key_with(env).as_deref(),
            Some("from-api-key")
        );
        assert_eq!(config.resolve_api_key_with(|_| None), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = OracleConfig {
            api_key: Some("secret-key".to_string()),
            ..OracleConfig::default()
        };
        let debug = format!("{config:?}");

        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
