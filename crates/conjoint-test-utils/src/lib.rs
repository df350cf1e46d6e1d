//! Testing utilities for the conjoint workspace
//!
//! Shared registries, generators, and fixtures.

#![allow(missing_docs)]

use conjoint_core::{FactorRegistry, LevelSelection, Profile, ProfileGenerator};
use indexmap::IndexMap;

pub const COIN_TOML: &str = r#"
[factors]
Coin = ["Heads", "Tails"]
"#;

pub const VIGNETTE_TOML: &str = r#"
set_size = 12
seed = 2024

[factors]
Race = ["Black", "Hispanic", "White"]
Sex = ["Female", "Male"]
Age = ["25", "45", "65"]
Offense = ["Theft", "Assault", "Fraud", "Trespass"]
"#;

pub fn coin_registry() -> FactorRegistry {
    FactorRegistry::from_pairs([("Coin", vec!["Heads", "Tails"])]).unwrap()
}

/// Race × Sex × Age × Offense, 72 combinations
pub fn vignette_registry() -> FactorRegistry {
    FactorRegistry::from_pairs([
        ("Race", vec!["Black", "Hispanic", "White"]),
        ("Sex", vec!["Female", "Male"]),
        ("Age", vec!["25", "45", "65"]),
        ("Offense", vec!["Theft", "Assault", "Fraud", "Trespass"]),
    ])
    .unwrap()
}

/// Every factor has a single level, so only one profile exists
pub fn saturated_registry() -> FactorRegistry {
    FactorRegistry::from_pairs([("Only", vec!["One"]), ("Fixed", vec!["Value"])]).unwrap()
}

pub fn seeded_generator(registry: FactorRegistry) -> ProfileGenerator {
    ProfileGenerator::seeded(registry, 0x5eed)
}

/// Build a profile by level indices, in registry order
pub fn profile_at(registry: &FactorRegistry, indices: &[usize]) -> Profile {
    let record: IndexMap<String, LevelSelection> = registry
        .iter()
        .zip(indices)
        .map(|((name, labels), &index)| {
            (name.to_string(), LevelSelection::new(index, labels[index].clone()))
        })
        .collect();
    Profile::reconstruct(registry, record).unwrap()
}
