//! Profiles and profile sets
//!
//! A [`Profile`] is one level per factor, kept as an ordered list of
//! `(factor, selection)` pairs. Its [`canonical`](Profile::canonical) string is
//! the uniqueness key; a [`ProfileSet`] is one generation call's output and
//! the unit that gets persisted as JSON.

use crate::error::{ConjointError, Result};
use crate::registry::FactorRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One chosen level of a factor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelSelection {
    /// Position in the factor's level list
    pub index: usize,
    /// Label at that position
    pub label: String,
}

impl LevelSelection {
    /// Create new selection
    #[inline]
    #[must_use]
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }
}

/// One randomly assembled combination of levels
///
/// Serializes as a JSON object keyed by factor name, in profile order.
/// There is no `Deserialize`: decoding goes through
/// [`reconstruct`](Profile::reconstruct) so every profile is checked against a
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "IndexMap<String, LevelSelection>")]
pub struct Profile {
    selections: Vec<(String, LevelSelection)>,
}

impl Profile {
    /// Build a profile from already ordered selections
    pub(crate) fn from_ordered(selections: Vec<(String, LevelSelection)>) -> Self {
        Self { selections }
    }

    /// Rebuild a profile from plain data, checked against `registry`
    ///
    /// The result is put in registry order regardless of the order of
    /// `record`, so canonical strings agree with freshly generated profiles.
    ///
    /// # Errors
    /// Fails if a factor is missing or unknown, an index is out of range, or a
    /// label disagrees with the registry.
    pub fn reconstruct(
        registry: &FactorRegistry,
        mut record: IndexMap<String, LevelSelection>,
    ) -> Result<Self> {
        if let Some(extra) = record.keys().find(|name| !registry.contains(name)) {
            return Err(ConjointError::UnexpectedFactor(extra.clone()));
        }

        let mut selections = Vec::with_capacity(registry.len());
        for (name, _) in registry.iter() {
            let selection = record
                .swap_remove(name)
                .ok_or_else(|| ConjointError::MissingFactor(name.to_string()))?;
            let expected = registry.label_at(name, selection.index)?;
            if expected != selection.label {
                return Err(ConjointError::LabelMismatch {
                    factor: name.to_string(),
                    index: selection.index,
                    expected: expected.to_string(),
                    actual: selection.label,
                });
            }
            selections.push((name.to_string(), selection));
        }
        Ok(Self { selections })
    }

    /// Selection for `factor`
    #[must_use]
    pub fn get(&self, factor: &str) -> Option<&LevelSelection> {
        self.selections
            .iter()
            .find(|(name, _)| name == factor)
            .map(|(_, selection)| selection)
    }

    /// Iterate `(factor, selection)` in profile order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LevelSelection)> {
        self.selections
            .iter()
            .map(|(name, selection)| (name.as_str(), selection))
    }

    /// Factor names in profile order
    #[must_use]
    pub fn factors(&self) -> Vec<&str> {
        self.selections.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Factor name → label, in profile order
    #[must_use]
    pub fn labels(&self) -> IndexMap<&str, &str> {
        self.selections
            .iter()
            .map(|(name, selection)| (name.as_str(), selection.label.as_str()))
            .collect()
    }

    /// Uniqueness key: factor names followed by the selected indices
    ///
    /// Indices are comma separated so `(1, 12)` and `(11, 2)` stay distinct.
    #[must_use]
    pub fn canonical(&self) -> String {
        let names: String = self.selections.iter().map(|(name, _)| name.as_str()).collect();
        let indices: Vec<String> = self
            .selections
            .iter()
            .map(|(_, selection)| selection.index.to_string())
            .collect();
        format!("{names}{}", indices.join(","))
    }

    /// Number of factors in the profile
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Check if profile has no factors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl From<Profile> for IndexMap<String, LevelSelection> {
    fn from(profile: Profile) -> Self {
        profile.selections.into_iter().collect()
    }
}

/// Ordered profiles from one generation call
///
/// Decoded only through [`ProfileSet::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProfileSet {
    profiles: Vec<Profile>,
}

impl ProfileSet {
    /// Create new empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a profile
    #[inline]
    pub fn push(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    /// Profile at 0-based `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    /// Iterate profiles in order
    pub fn iter(&self) -> std::slice::Iter<'_, Profile> {
        self.profiles.iter()
    }

    /// Profiles as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Profile] {
        &self.profiles
    }

    /// Number of profiles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Canonical strings in order
    #[must_use]
    pub fn canonicals(&self) -> Vec<String> {
        self.profiles.iter().map(Profile::canonical).collect()
    }

    /// Check if any two profiles share a canonical string
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.profiles.len());
        self.profiles.iter().any(|p| !seen.insert(p.canonical()))
    }

    /// Encode as a JSON array of `{factor: {index, label}}` objects
    ///
    /// # Errors
    /// Returns [`ConjointError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode JSON and rebuild every profile against `registry`
    ///
    /// # Errors
    /// Fails on malformed JSON or any profile that does not match `registry`.
    pub fn from_json(registry: &FactorRegistry, json: &str) -> Result<Self> {
        let records: Vec<IndexMap<String, LevelSelection>> = serde_json::from_str(json)?;
        let profiles = records
            .into_iter()
            .map(|record| Profile::reconstruct(registry, record))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { profiles })
    }
}

impl From<Vec<Profile>> for ProfileSet {
    fn from(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }
}

impl IntoIterator for ProfileSet {
    type Item = Profile;
    type IntoIter = std::vec::IntoIter<Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProfileSet {
    type Item = &'a Profile;
    type IntoIter = std::slice::Iter<'a, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> FactorRegistry {
        FactorRegistry::from_pairs([
            ("Race", vec!["Black", "Hispanic", "White"]),
            ("Sex", vec!["Female", "Male"]),
        ])
        .unwrap()
    }

    fn profile(race: usize, sex: usize) -> Profile {
        let registry = registry();
        Profile::from_ordered(vec![
            (
                "Race".to_string(),
                LevelSelection::new(race, registry.label_at("Race", race).unwrap()),
            ),
            (
                "Sex".to_string(),
                LevelSelection::new(sex, registry.label_at("Sex", sex).unwrap()),
            ),
        ])
    }

    #[test]
    fn canonical_names_then_indices() {
        assert_eq!(profile(2, 1).canonical(), "RaceSex2,1");
    }

    #[test]
    fn canonical_multi_digit_indices_distinct() {
        let a = Profile::from_ordered(vec![
            ("A".into(), LevelSelection::new(1, "x")),
            ("B".into(), LevelSelection::new(12, "y")),
        ]);
        let b = Profile::from_ordered(vec![
            ("A".into(), LevelSelection::new(11, "x")),
            ("B".into(), LevelSelection::new(2, "y")),
        ]);
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn labels_in_profile_order() {
        let p = profile(0, 1);
        let labels = p.labels();
        let pairs: Vec<_> = labels.into_iter().collect();
        assert_eq!(pairs, vec![("Race", "Black"), ("Sex", "Male")]);
    }

    #[test]
    fn json_shape() {
        let set = ProfileSet::from(vec![profile(1, 0)]);
        let json = set.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"Race":{"index":1,"label":"Hispanic"},"Sex":{"index":0,"label":"Female"}}]"#
        );
    }

    #[test]
    fn reconstruct_reorders_to_registry() {
        let json = r#"[{"Sex":{"index":1,"label":"Male"},"Race":{"index":0,"label":"Black"}}]"#;
        let set = ProfileSet::from_json(&registry(), json).unwrap();
        assert_eq!(set.get(0).unwrap().factors(), vec!["Race", "Sex"]);
        assert_eq!(set.get(0).unwrap().canonical(), profile(0, 1).canonical());
    }

    #[test]
    fn reconstruct_missing_factor() {
        let json = r#"[{"Race":{"index":0,"label":"Black"}}]"#;
        let err = ProfileSet::from_json(&registry(), json).unwrap_err();
        assert!(matches!(err, ConjointError::MissingFactor(name) if name == "Sex"));
    }

    #[test]
    fn reconstruct_unexpected_factor() {
        let json = r#"[{"Race":{"index":0,"label":"Black"},"Sex":{"index":0,"label":"Female"},"Age":{"index":0,"label":"30"}}]"#;
        let err = ProfileSet::from_json(&registry(), json).unwrap_err();
        assert!(matches!(err, ConjointError::UnexpectedFactor(name) if name == "Age"));
    }

    #[test]
    fn reconstruct_label_mismatch() {
        let json = r#"[{"Race":{"index":0,"label":"White"},"Sex":{"index":0,"label":"Female"}}]"#;
        let err = ProfileSet::from_json(&registry(), json).unwrap_err();
        assert!(matches!(err, ConjointError::LabelMismatch { index: 0, .. }));
    }

    #[test]
    fn reconstruct_index_out_of_range() {
        let json = r#"[{"Race":{"index":7,"label":"White"},"Sex":{"index":0,"label":"Female"}}]"#;
        let err = ProfileSet::from_json(&registry(), json).unwrap_err();
        assert!(matches!(err, ConjointError::LevelOutOfRange { index: 7, .. }));
    }

    #[test]
    fn from_json_rejects_unregistered_record() {
        let json = r#"[{"Bogus":{"index":99,"label":"X"}}]"#;
        let err = ProfileSet::from_json(&registry(), json).unwrap_err();
        assert!(matches!(err, ConjointError::UnexpectedFactor(name) if name == "Bogus"));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = ProfileSet::from_json(&registry(), "{not json").unwrap_err();
        assert!(matches!(err, ConjointError::Serialization(_)));
    }

    #[test]
    fn duplicates_detected() {
        let set = ProfileSet::from(vec![profile(0, 0), profile(1, 0), profile(0, 0)]);
        assert!(set.has_duplicates());
        let set = ProfileSet::from(vec![profile(0, 0), profile(0, 1)]);
        assert!(!set.has_duplicates());
    }
}
