//! Conjoint Core
//!
//! Randomized conjoint profiles for survey experiments.
//!
//! # Core Concepts
//!
//! - [`FactorRegistry`]: ordered factor name → level labels
//! - [`Profile`]: one level per factor, compared by [`Profile::canonical`]
//! - [`ProfileGenerator`]: uniform sampling with bounded-retry uniqueness
//! - [`Session`]: stable profile assignment through an [`EmbeddedData`] store
//! - [`render_table`] / [`replace_targets`]: display glue
//!
//! # Example
//!
//! ```rust
//! use conjoint_core::{FactorRegistry, ProfileGenerator, Uniqueness};
//!
//! let registry = FactorRegistry::from_pairs([
//!     ("Race", vec!["Black", "Hispanic", "White"]),
//!     ("Sex", vec!["Female", "Male"]),
//! ])?;
//!
//! let mut generator = ProfileGenerator::seeded(registry, 42);
//! let batch = generator.select(6, Uniqueness::Unique);
//!
//! assert!(batch.is_complete());
//! assert!(!batch.profiles.has_duplicates());
//! # Ok::<(), conjoint_core::ConjointError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod generator;
pub mod profile;
pub mod registry;
pub mod render;
pub mod store;

// Re-exports
pub use config::ConjointConfig;
pub use error::{ConjointError, Result};
pub use generator::{
    Batch, Candidate, GeneratorConfig, ProfileGenerator, Uniqueness, DEFAULT_RETRY_LIMIT,
};
pub use profile::{LevelSelection, Profile, ProfileSet};
pub use registry::FactorRegistry;
pub use render::{render_table, replace_targets, DisplayTarget, Rendered};
pub use store::{
    embed_labels, EmbeddedData, JsonFileStore, MemoryStore, Session, SetSource,
    DEFAULT_SET_SIZE, DEFAULT_STORAGE_KEY,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for generating and storing profiles
    pub use crate::{
        ConjointConfig, ConjointError, EmbeddedData, FactorRegistry, Profile, ProfileGenerator,
        ProfileSet, Session, Uniqueness,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
