//! Error types for conjoint generation
//!
//! Provides error handling for:
//! - Factor registry configuration
//! - Profile reconstruction from persisted data
//! - Retry exhaustion during unique generation
//! - Store and configuration I/O

use std::path::PathBuf;

/// Main conjoint error type
#[derive(Debug, thiserror::Error)]
pub enum ConjointError {
    /// Factor definition rejected by the registry
    #[error("invalid factor '{factor}': {reason}")]
    InvalidFactor {
        /// Factor name as supplied
        factor: String,
        /// Why it was rejected
        reason: String,
    },

    /// Factor name not present in the registry
    #[error("unknown factor: {0}")]
    UnknownFactor(String),

    /// Level index outside the factor's level list
    #[error("level index {index} out of range for factor '{factor}' ({levels} levels)")]
    LevelOutOfRange {
        /// Factor the index was applied to
        factor: String,
        /// Requested 0-based index
        index: usize,
        /// Number of levels the factor has
        levels: usize,
    },

    /// Stored label disagrees with the registry label at that index
    #[error("label mismatch for factor '{factor}' at index {index}: expected '{expected}', got '{actual}'")]
    LabelMismatch {
        /// Factor whose label disagrees
        factor: String,
        /// 0-based level index
        index: usize,
        /// Label the registry has at `index`
        expected: String,
        /// Label found in the stored data
        actual: String,
    },

    /// Profile lacks a registered factor
    #[error("profile is missing factor: {0}")]
    MissingFactor(String),

    /// Profile carries a factor the registry does not know
    #[error("profile has unexpected factor: {0}")]
    UnexpectedFactor(String),

    /// Retry limit hit while searching for a unique candidate
    #[error("generation exhausted after {attempts} attempts ({accepted} of {requested} profiles accepted)")]
    GenerationExhausted {
        /// Draws made for the candidate that gave up
        attempts: usize,
        /// Profiles accepted before giving up
        accepted: usize,
        /// Profiles asked for
        requested: usize,
    },

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key-value store failure
    #[error("store error: {0}")]
    Store(String),

    /// Configuration could not be parsed or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error on a file-backed resource
    #[error("io error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },
}

impl ConjointError {
    /// Create invalid factor error
    pub fn invalid_factor(factor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFactor {
            factor: factor.into(),
            reason: reason.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if persisted data was unusable (recoverable by regenerating)
    #[inline]
    #[must_use]
    pub fn is_stale_data(&self) -> bool {
        matches!(
            self,
            Self::Serialization(_)
                | Self::UnknownFactor(_)
                | Self::LevelOutOfRange { .. }
                | Self::LabelMismatch { .. }
                | Self::MissingFactor(_)
                | Self::UnexpectedFactor(_)
        )
    }
}

/// Result type alias for conjoint operations
pub type Result<T> = std::result::Result<T, ConjointError>;
