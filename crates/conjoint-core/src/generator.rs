//! Profile generation
//!
//! [`ProfileGenerator`] samples one level index per factor, uniformly and
//! independently. In [`Uniqueness::Unique`] mode a batch is built by rejection
//! sampling: each candidate whose canonical string was already accepted is
//! redrawn, up to the retry limit.
//!
//! # Candidate search
//!
//! ```text
//! Sampling ──► Accepted                       (canonical string unseen)
//!     │
//!     └──────► Retrying ──► Sampling          (attempts < limit)
//!                  │
//!                  └──────► Exhausted         (attempts == limit)
//! ```
//!
//! Exhaustion is a heuristic saturation signal, not proof that every
//! combination is taken: with a small limit and a large factor space a
//! candidate can exhaust while unseen combinations remain.

use crate::error::{ConjointError, Result};
use crate::profile::{LevelSelection, Profile, ProfileSet};
use crate::registry::FactorRegistry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default number of attempts per unique candidate
pub const DEFAULT_RETRY_LIMIT: usize = 500;

/// Generator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Attempts allowed per unique candidate (at least one is always made)
    pub retry_limit: usize,
    /// Fixed RNG seed; `None` seeds from the operating system
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With retry limit
    #[inline]
    #[must_use]
    pub fn with_retry_limit(mut self, retry_limit: usize) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// With fixed seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            seed: None,
        }
    }
}

/// Whether a batch may contain repeated profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Uniqueness {
    /// Independent draws, duplicates allowed
    #[default]
    Any,
    /// No two profiles share a canonical string
    Unique,
}

/// Outcome of searching for one unique candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// An unseen profile was found
    Accepted {
        /// The accepted profile
        profile: Profile,
        /// Draws it took, including the accepted one
        attempts: usize,
    },
    /// Every draw up to the retry limit was a duplicate
    Exhausted {
        /// Draws made
        attempts: usize,
    },
}

/// Result of a batch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Accepted profiles, in generation order
    pub profiles: ProfileSet,
    /// Number of profiles asked for
    pub requested: usize,
    /// Whether a candidate exhausted its retries and the batch stopped early
    pub exhausted: bool,
}

impl Batch {
    /// Check if every requested profile was produced
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.profiles.len() == self.requested
    }

    /// Take the profiles
    #[inline]
    #[must_use]
    pub fn into_profiles(self) -> ProfileSet {
        self.profiles
    }
}

/// Random profile generator over a fixed registry
#[derive(Debug, Clone)]
pub struct ProfileGenerator<R = StdRng> {
    registry: FactorRegistry,
    retry_limit: usize,
    rng: R,
}

impl ProfileGenerator<StdRng> {
    /// Create generator from registry and config
    ///
    /// Seeds from `config.seed` when set, otherwise from the operating system.
    #[must_use]
    pub fn new(registry: FactorRegistry, config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(registry, config.retry_limit, rng)
    }

    /// Create reproducible generator with default retry limit
    #[inline]
    #[must_use]
    pub fn seeded(registry: FactorRegistry, seed: u64) -> Self {
        Self::new(registry, GeneratorConfig::new().with_seed(seed))
    }
}

impl<R: Rng> ProfileGenerator<R> {
    /// Create generator drawing from `rng`
    #[must_use]
    pub fn with_rng(registry: FactorRegistry, retry_limit: usize, rng: R) -> Self {
        Self {
            registry,
            retry_limit: retry_limit.max(1),
            rng,
        }
    }

    /// Registry this generator samples from
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &FactorRegistry {
        &self.registry
    }

    /// Effective attempts per unique candidate
    #[inline]
    #[must_use]
    pub fn retry_limit(&self) -> usize {
        self.retry_limit
    }

    /// Draw one profile: a uniform level for every factor, in registry order
    pub fn random_profile(&mut self) -> Profile {
        let selections = self
            .registry
            .iter()
            .map(|(name, labels)| {
                let index = self.rng.random_range(0..labels.len());
                (name.to_string(), LevelSelection::new(index, labels[index].clone()))
            })
            .collect();
        Profile::from_ordered(selections)
    }

    /// Search for a profile whose canonical string is not in `seen`
    pub fn unique_candidate(&mut self, seen: &HashSet<String>) -> Candidate {
        let mut attempts = 0;
        while attempts < self.retry_limit {
            attempts += 1;
            let profile = self.random_profile();
            if !seen.contains(&profile.canonical()) {
                return Candidate::Accepted { profile, attempts };
            }
            tracing::trace!(attempts, "duplicate candidate, retrying");
        }
        Candidate::Exhausted { attempts }
    }

    /// Generate up to `count` profiles
    ///
    /// In [`Uniqueness::Unique`] mode the first exhausted candidate ends the
    /// batch: the profiles accepted so far are returned with
    /// [`Batch::exhausted`] set and a warning is logged.
    pub fn select(&mut self, count: usize, uniqueness: Uniqueness) -> Batch {
        let mut profiles = ProfileSet::new();

        match uniqueness {
            Uniqueness::Any => {
                for _ in 0..count {
                    profiles.push(self.random_profile());
                }
            }
            Uniqueness::Unique => {
                let mut seen = HashSet::with_capacity(count);
                while profiles.len() < count {
                    match self.unique_candidate(&seen) {
                        Candidate::Accepted { profile, .. } => {
                            seen.insert(profile.canonical());
                            profiles.push(profile);
                        }
                        Candidate::Exhausted { attempts } => {
                            tracing::warn!(
                                attempts,
                                accepted = profiles.len(),
                                requested = count,
                                combinations = %self.registry.combinations(),
                                "unique profile search exhausted, returning short batch"
                            );
                            return Batch {
                                profiles,
                                requested: count,
                                exhausted: true,
                            };
                        }
                    }
                }
            }
        }

        tracing::debug!(count, ?uniqueness, "generated profile batch");
        Batch {
            profiles,
            requested: count,
            exhausted: false,
        }
    }

    /// Generate exactly `count` unique profiles or fail
    ///
    /// # Errors
    /// Returns [`ConjointError::GenerationExhausted`] if the batch comes up short.
    pub fn select_exact(&mut self, count: usize) -> Result<ProfileSet> {
        let batch = self.select(count, Uniqueness::Unique);
        if batch.is_complete() {
            Ok(batch.into_profiles())
        } else {
            Err(ConjointError::GenerationExhausted {
                attempts: self.retry_limit,
                accepted: batch.profiles.len(),
                requested: count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin() -> FactorRegistry {
        FactorRegistry::from_pairs([("Coin", vec!["Heads", "Tails"])]).unwrap()
    }

    fn single() -> FactorRegistry {
        FactorRegistry::from_pairs([("Only", vec!["One"]), ("Fixed", vec!["Value"])]).unwrap()
    }

    #[test]
    fn random_profile_covers_every_factor() {
        let registry = FactorRegistry::from_pairs([
            ("Race", vec!["Black", "Hispanic", "White"]),
            ("Cheese", vec!["Cheddar", "Gouda", "American"]),
        ])
        .unwrap();
        let mut generator = ProfileGenerator::seeded(registry, 7);

        let profile = generator.random_profile();
        assert_eq!(profile.factors(), vec!["Race", "Cheese"]);
    }

    #[test]
    fn coin_two_unique() {
        let mut generator = ProfileGenerator::seeded(coin(), 1);
        let batch = generator.select(2, Uniqueness::Unique);

        assert!(batch.is_complete());
        assert!(!batch.exhausted);
        let mut indices: Vec<usize> = batch
            .profiles
            .iter()
            .map(|p| p.get("Coin").unwrap().index)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn saturated_space_returns_short_batch() {
        let mut generator = ProfileGenerator::seeded(single(), 3);
        let batch = generator.select(2, Uniqueness::Unique);

        assert_eq!(batch.profiles.len(), 1);
        assert_eq!(batch.requested, 2);
        assert!(batch.exhausted);
    }

    #[test]
    fn non_unique_mode_allows_repeats() {
        let mut generator = ProfileGenerator::seeded(single(), 3);
        let batch = generator.select(5, Uniqueness::Any);

        assert_eq!(batch.profiles.len(), 5);
        assert!(batch.profiles.has_duplicates());
    }

    #[test]
    fn candidate_exhausts_at_limit() {
        let registry = single();
        let mut generator = ProfileGenerator::new(registry, GeneratorConfig::new().with_retry_limit(3).with_seed(0));
        let taken = generator.random_profile();
        let seen: HashSet<String> = [taken.canonical()].into_iter().collect();

        assert_eq!(generator.unique_candidate(&seen), Candidate::Exhausted { attempts: 3 });
    }

    #[test]
    fn zero_retry_limit_still_draws_once() {
        let mut generator = ProfileGenerator::new(coin(), GeneratorConfig::new().with_retry_limit(0).with_seed(0));
        assert_eq!(generator.retry_limit(), 1);
        assert!(matches!(
            generator.unique_candidate(&HashSet::new()),
            Candidate::Accepted { attempts: 1, .. }
        ));
    }

    #[test]
    fn select_exact_fails_when_saturated() {
        let mut generator = ProfileGenerator::seeded(single(), 9);
        let err = generator.select_exact(2).unwrap_err();
        assert!(matches!(
            err,
            ConjointError::GenerationExhausted { accepted: 1, requested: 2, .. }
        ));
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = ProfileGenerator::seeded(coin(), 42);
        let mut b = ProfileGenerator::seeded(coin(), 42);
        assert_eq!(a.select(8, Uniqueness::Any), b.select(8, Uniqueness::Any));
    }

    #[test]
    fn zero_count_is_empty_complete_batch() {
        let mut generator = ProfileGenerator::seeded(coin(), 5);
        let batch = generator.select(0, Uniqueness::Unique);
        assert!(batch.profiles.is_empty());
        assert!(batch.is_complete());
    }
}
