//! Experiment configuration
//!
//! A [`ConjointConfig`] holds the factor table plus generation and storage
//! settings. It loads from TOML or JSON:
//!
//! ```toml
//! retry_limit = 500
//! set_size = 12
//!
//! [factors]
//! Race = ["Black", "Hispanic", "White"]
//! Sex = ["Female", "Male"]
//! ```

use crate::error::{ConjointError, Result};
use crate::generator::{GeneratorConfig, ProfileGenerator, DEFAULT_RETRY_LIMIT};
use crate::registry::FactorRegistry;
use crate::store::{DEFAULT_SET_SIZE, DEFAULT_STORAGE_KEY};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Experiment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConjointConfig {
    /// Factor name → level labels, in display order
    pub factors: IndexMap<String, Vec<String>>,
    /// Attempts per unique candidate
    pub retry_limit: usize,
    /// Profiles per respondent session
    pub set_size: usize,
    /// Embedded-data key for the serialized set
    pub storage_key: String,
    /// Prefix for per-label embedded-data keys
    pub label_prefix: String,
    /// Fixed RNG seed
    pub seed: Option<u64>,
}

impl Default for ConjointConfig {
    fn default() -> Self {
        Self {
            factors: IndexMap::new(),
            retry_limit: DEFAULT_RETRY_LIMIT,
            set_size: DEFAULT_SET_SIZE,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            label_prefix: "profile".to_string(),
            seed: None,
        }
    }
}

impl ConjointConfig {
    /// Load from a `.toml` or `.json` file
    ///
    /// # Errors
    /// Fails on unreadable files, unknown extensions, parse errors, or invalid settings.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConjointError::io_error(path, e))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConjointError::Config(format!(
                "unsupported config format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Parse TOML
    ///
    /// # Errors
    /// Fails on parse errors or invalid settings.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConjointError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON
    ///
    /// # Errors
    /// Fails on parse errors or invalid settings.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings and factor table
    ///
    /// # Errors
    /// Returns [`ConjointError::Config`] or [`ConjointError::InvalidFactor`].
    pub fn validate(&self) -> Result<()> {
        if self.retry_limit == 0 {
            return Err(ConjointError::Config("retry_limit must be at least 1".into()));
        }
        if self.storage_key.is_empty() {
            return Err(ConjointError::Config("storage_key must not be empty".into()));
        }
        self.registry().map(|_| ())
    }

    /// Build the factor registry
    ///
    /// # Errors
    /// Returns [`ConjointError::InvalidFactor`] for an empty name or level list.
    pub fn registry(&self) -> Result<FactorRegistry> {
        let mut registry = FactorRegistry::new();
        registry.set_factors(self.factors.clone())?;
        Ok(registry)
    }

    /// Generator settings
    #[must_use]
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            retry_limit: self.retry_limit,
            seed: self.seed,
        }
    }

    /// Build a generator over this configuration's factors
    ///
    /// # Errors
    /// Returns [`ConjointError::InvalidFactor`] for an empty name or level list.
    pub fn generator(&self) -> Result<ProfileGenerator> {
        Ok(ProfileGenerator::new(self.registry()?, self.generator_config()))
    }
}
