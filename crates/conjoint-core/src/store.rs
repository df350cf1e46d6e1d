//! Embedded-data persistence
//!
//! The survey platform is only seen through [`EmbeddedData`], a string
//! key-value store. [`Session`] makes profile assignment stable across reloads:
//! it reuses a stored set when it still matches the registry and otherwise
//! generates, persists and returns a fresh one.

use crate::error::{ConjointError, Result};
use crate::generator::{ProfileGenerator, Uniqueness};
use crate::profile::ProfileSet;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Default profile set size for a session
pub const DEFAULT_SET_SIZE: usize = 12;

/// Default embedded-data key holding the serialized profile set
pub const DEFAULT_STORAGE_KEY: &str = "profiles";

/// String key-value store provided by the survey platform
pub trait EmbeddedData {
    /// Value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    ///
    /// # Errors
    /// Returns [`ConjointError::Store`] or [`ConjointError::Io`] if the write fails.
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-process store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create new empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl EmbeddedData for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON object file, rewritten on every `set`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if it does not exist
    ///
    /// # Errors
    /// Fails if the file exists but cannot be read or is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ConjointError::io_error(path, e)),
        };
        Ok(Self { path, values })
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text).map_err(|e| ConjointError::io_error(&self.path, e))
    }
}

impl EmbeddedData for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

/// Where a session's profile set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetSource {
    /// Reused from the store
    Stored,
    /// Freshly generated and persisted
    Generated,
}

/// Profile set assigned to one respondent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Assigned profiles
    pub profiles: ProfileSet,
    /// Origin of the profiles
    pub source: SetSource,
}

impl Session {
    /// Load the set stored under `key`, or generate and persist a new one
    ///
    /// Missing, malformed, or registry-incompatible data is logged and
    /// replaced, and so is a stored set with duplicate profiles or an empty
    /// one when `size` is non-zero. A fresh set is generated in unique mode and may be shorter
    /// than `size` if the factor space saturates.
    ///
    /// # Errors
    /// Only store write failures propagate.
    pub fn load_or_generate<S, R>(
        store: &mut S,
        key: &str,
        generator: &mut ProfileGenerator<R>,
        size: usize,
    ) -> Result<Self>
    where
        S: EmbeddedData + ?Sized,
        R: Rng,
    {
        match store.get(key) {
            Some(json) => match ProfileSet::from_json(generator.registry(), &json) {
                Ok(profiles) if profiles.has_duplicates() => {
                    tracing::warn!(key, "stored profile set has duplicate profiles, regenerating");
                }
                Ok(profiles) if profiles.is_empty() && size > 0 => {
                    tracing::warn!(key, "stored profile set is empty, regenerating");
                }
                Ok(profiles) => {
                    tracing::info!(key, count = profiles.len(), "reusing stored profile set");
                    return Ok(Self {
                        profiles,
                        source: SetSource::Stored,
                    });
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "stored profile set unusable, regenerating");
                }
            },
            None => tracing::debug!(key, "no stored profile set"),
        }

        let profiles = generator.select(size, Uniqueness::Unique).into_profiles();
        store.set(key, profiles.to_json()?)?;
        tracing::info!(key, count = profiles.len(), "generated and stored profile set");

        Ok(Self {
            profiles,
            source: SetSource::Generated,
        })
    }
}

/// Write every label as its own key, `"{prefix}{n}_{factor}"` with 1-based `n`
///
/// Returns the number of keys written.
///
/// # Errors
/// Propagates the first store write failure.
pub fn embed_labels<S>(store: &mut S, prefix: &str, profiles: &ProfileSet) -> Result<usize>
where
    S: EmbeddedData + ?Sized,
{
    let mut written = 0;
    for (n, profile) in profiles.iter().enumerate() {
        for (factor, selection) in profile.iter() {
            store.set(&format!("{prefix}{}_{factor}", n + 1), selection.label.clone())?;
            written += 1;
        }
    }
    Ok(written)
}
