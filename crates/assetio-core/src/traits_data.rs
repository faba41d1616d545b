// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-bag container for a set of traits.
//!
//! A [`TraitsData`] holds any number of trait ids, each owning a map of
//! property key to [`PropertyValue`]. Membership and keys are sets, so
//! insertion order never affects equality, and re-adding a trait or
//! property is a no-op or an overwrite.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{PropertyValue, TraitSet};

/// A set of traits and their properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitsData {
    traits: BTreeMap<String, BTreeMap<String, PropertyValue>>,
}

impl TraitsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `TraitsData` imbued with the given traits and no properties.
    pub fn with_traits<I, S>(trait_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut data = Self::new();
        data.add_traits(trait_ids);
        data
    }

    /// The ids of all traits held.
    pub fn trait_set(&self) -> TraitSet {
        self.traits.keys().cloned().collect()
    }

    pub fn has_trait(&self, trait_id: &str) -> bool {
        self.traits.contains_key(trait_id)
    }

    /// Adds a trait with no properties. Existing properties are kept.
    pub fn add_trait(&mut self, trait_id: impl Into<String>) {
        self.traits.entry(trait_id.into()).or_default();
    }

    pub fn add_traits<I, S>(&mut self, trait_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in trait_ids {
            self.add_trait(id);
        }
    }

    /// Sets a property, adding the trait if needed.
    pub fn set_trait_property(
        &mut self,
        trait_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) {
        self.traits
            .entry(trait_id.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn get_trait_property(&self, trait_id: &str, key: &str) -> Option<&PropertyValue> {
        self.traits.get(trait_id).and_then(|props| props.get(key))
    }

    /// Property keys set for a trait, sorted. Empty if the trait is absent.
    pub fn trait_property_keys(&self, trait_id: &str) -> Vec<String> {
        self.traits
            .get(trait_id)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Copies every trait and property of `other` into `self`, overwriting
    /// values for keys present in both.
    pub fn update(&mut self, other: &TraitsData) {
        for (trait_id, props) in &other.traits {
            let entry = self.traits.entry(trait_id.clone()).or_default();
            for (key, value) in props {
                entry.insert(key.clone(), value.clone());
            }
        }
    }

    /// Returns a copy holding only the traits in `trait_set`.
    pub fn filtered(&self, trait_set: &TraitSet) -> TraitsData {
        TraitsData {
            traits: self
                .traits
                .iter()
                .filter(|(id, _)| trait_set.contains(*id))
                .map(|(id, props)| (id.clone(), props.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }
}
