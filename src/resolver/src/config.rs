//! Resolver settings
//!
//! The engine reads these as plain values; loading and persisting them is the
//! caller's business.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Invalid resolver settings
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fuzzy_threshold must be between 0.0 and 1.0, got {0}")]
    FuzzyThreshold(f64),

    #[error("suggestion_threshold must be between 0.0 and 1.0, got {0}")]
    SuggestionThreshold(f64),

    #[error("suggestion_limit must be at least 1")]
    SuggestionLimit,
}

/// Matching and caching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Enable the fuzzy tier
    #[serde(default = "default_true")]
    pub fuzzy_enabled: bool,

    /// Minimum similarity for a fuzzy match
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Candidate cache lifetime
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Maximum "did you mean" suggestions on a miss
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Relaxed similarity floor used only for suggestions
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

// Default value functions
fn default_true() -> bool { true }
fn default_fuzzy_threshold() -> f64 { 0.8 }
fn default_cache_ttl_seconds() -> u64 { 300 }
fn default_suggestion_limit() -> usize { 3 }
fn default_suggestion_threshold() -> f64 { 0.4 }

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_enabled: default_true(),
            fuzzy_threshold: default_fuzzy_threshold(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            suggestion_limit: default_suggestion_limit(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

impl ResolverConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::FuzzyThreshold(self.fuzzy_threshold));
        }

        if !(0.0..=1.0).contains(&self.suggestion_threshold) {
            return Err(ConfigError::SuggestionThreshold(self.suggestion_threshold));
        }

        if self.suggestion_limit == 0 {
            return Err(ConfigError::SuggestionLimit);
        }

        Ok(())
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}
