//! Run configuration.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UnnestError};

const DEFAULT_SETTLE_DELAY_MS: u64 = 3000;
const DEFAULT_DELETE_RETRIES: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// How to handle a move whose destination name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Abort the whole run with a conflict error.
    #[default]
    Fail,
    /// Leave the entry where it is and keep going.
    Skip,
    /// Move the entry under the first free "name (N).ext" variant.
    Rename,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

/// Configuration for a flatten-and-prune run.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct UnnestConfig {
    /// Pause between the flatten and prune phases, in milliseconds.
    #[builder(default = "DEFAULT_SETTLE_DELAY_MS")]
    pub settle_delay_ms: u64,

    /// What to do when a moved entry collides with an existing one.
    #[builder(default)]
    pub conflict_policy: ConflictPolicy,

    /// Extra attempts made when deleting an empty directory fails.
    #[builder(default = "DEFAULT_DELETE_RETRIES")]
    pub delete_retries: u32,

    /// Backoff before the first retry, doubled for each following one.
    #[builder(default = "DEFAULT_RETRY_BACKOFF_MS")]
    pub retry_backoff_ms: u64,
}

impl UnnestConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        check_retry_settings(
            self.delete_retries.unwrap_or(DEFAULT_DELETE_RETRIES),
            self.retry_backoff_ms.unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
        )
    }
}

fn check_retry_settings(retries: u32, backoff_ms: u64) -> std::result::Result<(), String> {
    if retries > 0 && backoff_ms == 0 {
        return Err("retry_backoff_ms must be positive when delete_retries is set".to_string());
    }
    Ok(())
}

impl UnnestConfig {
    /// Create a new config builder.
    pub fn builder() -> UnnestConfigBuilder {
        UnnestConfigBuilder::default()
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| UnnestError::invalid_config(e.to_string()))?;
        check_retry_settings(config.delete_retries, config.retry_backoff_ms)
            .map_err(UnnestError::invalid_config)?;
        Ok(config)
    }

    /// Pause between phases.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Backoff before the given retry attempt (1-based).
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

impl Default for UnnestConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            conflict_policy: ConflictPolicy::Fail,
            delete_retries: DEFAULT_DELETE_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = UnnestConfig::builder()
            .settle_delay_ms(0u64)
            .conflict_policy(ConflictPolicy::Skip)
            .build()
            .unwrap();

        assert_eq!(config.settle_delay_ms, 0);
        assert_eq!(config.conflict_policy, ConflictPolicy::Skip);
        assert_eq!(config.delete_retries, DEFAULT_DELETE_RETRIES);
    }

    #[test]
    fn test_builder_rejects_zero_backoff() {
        let result = UnnestConfig::builder()
            .delete_retries(2u32)
            .retry_backoff_ms(0u64)
            .build();
        assert!(result.is_err());

        // No retries means the backoff is never used
        let config = UnnestConfig::builder()
            .delete_retries(0u32)
            .retry_backoff_ms(0u64)
            .build()
            .unwrap();
        assert_eq!(config.delete_retries, 0);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = UnnestConfig::from_toml_str("conflict_policy = \"rename\"\n").unwrap();
        assert_eq!(config.conflict_policy, ConflictPolicy::Rename);
        assert_eq!(config.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = UnnestConfig::from_toml_str("conflict_policy = \"merge\"\n").unwrap_err();
        assert!(matches!(err, UnnestError::InvalidConfig { .. }));

        let err =
            UnnestConfig::from_toml_str("delete_retries = 1\nretry_backoff_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("retry_backoff_ms"));
    }

    #[test]
    fn test_retry_backoff_doubles() {
        let config = UnnestConfig::builder()
            .retry_backoff_ms(100u64)
            .build()
            .unwrap();
        assert_eq!(config.retry_backoff(1), Duration::from_millis(100));
        assert_eq!(config.retry_backoff(2), Duration::from_millis(200));
        assert_eq!(config.retry_backoff(3), Duration::from_millis(400));
    }
}
