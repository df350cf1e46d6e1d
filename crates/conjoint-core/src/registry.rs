//! Factor registry
//!
//! Provides [`FactorRegistry`], the ordered mapping from factor name to level
//! labels that every generator samples from.

use crate::error::{ConjointError, Result};
use indexmap::IndexMap;

/// Ordered registry of factors and their level labels
///
/// Insertion order is the canonical factor order for every profile built
/// from this registry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FactorRegistry {
    factors: IndexMap<String, Vec<String>>,
}

impl FactorRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            factors: IndexMap::new(),
        }
    }

    /// Build a registry from `(name, labels)` pairs
    ///
    /// # Errors
    /// Returns [`ConjointError::InvalidFactor`] for an empty name or level list.
    pub fn from_pairs<I, N, L, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, L)>,
        N: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (name, labels) in pairs {
            registry.factor(name, labels)?;
        }
        Ok(registry)
    }

    /// Replace the whole registry with `mapping`
    ///
    /// Validation happens before anything is replaced, so a rejected mapping
    /// leaves the registry as it was.
    ///
    /// # Errors
    /// Returns [`ConjointError::InvalidFactor`] for an empty name or level list.
    pub fn set_factors(&mut self, mapping: IndexMap<String, Vec<String>>) -> Result<()> {
        for (name, labels) in &mapping {
            validate(name, labels)?;
        }
        self.factors = mapping;
        Ok(())
    }

    /// Add a factor, or replace the labels of an existing one in place
    ///
    /// # Errors
    /// Returns [`ConjointError::InvalidFactor`] for an empty name or level list.
    pub fn factor<N, L, S>(&mut self, name: N, labels: L) -> Result<&mut Self>
    where
        N: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        validate(&name, &labels)?;
        self.factors.insert(name, labels);
        Ok(self)
    }

    /// Ordered level labels of `name`
    ///
    /// # Errors
    /// Returns [`ConjointError::UnknownFactor`] if `name` is not registered.
    pub fn levels(&self, name: &str) -> Result<&[String]> {
        self.factors
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ConjointError::UnknownFactor(name.to_string()))
    }

    /// Label at `index` for factor `name`
    ///
    /// # Errors
    /// Returns [`ConjointError::UnknownFactor`] or [`ConjointError::LevelOutOfRange`].
    pub fn label_at(&self, name: &str, index: usize) -> Result<&str> {
        let levels = self.levels(name)?;
        levels
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| ConjointError::LevelOutOfRange {
                factor: name.to_string(),
                index,
                levels: levels.len(),
            })
    }

    /// Check if factor exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factors.contains_key(name)
    }

    /// Position of factor `name` in registry order
    #[inline]
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.factors.get_index_of(name)
    }

    /// Factor names in registry order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factors.keys().map(String::as_str).collect()
    }

    /// Iterate `(name, labels)` in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.factors
            .iter()
            .map(|(name, labels)| (name.as_str(), labels.as_slice()))
    }

    /// Number of registered factors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Number of distinct profiles this registry can produce
    ///
    /// Saturates at `u128::MAX`. An empty registry has exactly one (empty)
    /// profile.
    #[must_use]
    pub fn combinations(&self) -> u128 {
        self.factors
            .values()
            .fold(1u128, |acc, labels| acc.saturating_mul(labels.len() as u128))
    }
}

fn validate(name: &str, labels: &[String]) -> Result<()> {
    if name.is_empty() {
        return Err(ConjointError::invalid_factor(name, "factor name is empty"));
    }
    if labels.is_empty() {
        return Err(ConjointError::invalid_factor(name, "factor has no levels"));
    }
    Ok(())
}
