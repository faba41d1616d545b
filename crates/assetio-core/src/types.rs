// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common value types shared by hosts, managers and plugin loaders.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A set of trait identifiers.
pub type TraitSet = BTreeSet<String>;

/// Free-form key/value metadata (manager info, settings).
pub type InfoDictionary = BTreeMap<String, PropertyValue>;

/// Settings passed to [`crate::ManagerInterface::initialize`].
pub type Settings = InfoDictionary;

/// String-to-string mapping used for terminology substitution.
pub type StrMap = BTreeMap<String, String>;

/// A value held by a trait property, a setting or an info entry: a
/// primitive, or a dictionary of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Dict(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Dict(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Str(s) => write!(f, "{s}"),
            PropertyValue::Dict(d) => {
                write!(f, "{{")?;
                for (i, (key, value)) in d.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<BTreeMap<String, PropertyValue>> for PropertyValue {
    fn from(value: BTreeMap<String, PropertyValue>) -> Self {
        PropertyValue::Dict(value)
    }
}

/// An opaque string naming an asset-managed entity.
///
/// Construct through `Manager::create_entity_reference` in host code so the
/// string is validated by the manager that will consume it; [`EntityReference::new`]
/// performs no validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityReference(String);

impl EntityReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named optional features a manager implementation may support.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    EntityReferenceIdentification,
    ManagementPolicyQueries,
    EntityTraitIntrospection,
    Stateful,
    CustomTerminology,
    Resolution,
    Publishing,
    RelationshipQueries,
    ExistenceQueries,
    DefaultEntityReferences,
}

impl Capability {
    /// Capabilities every manager must advertise to be initialized.
    pub const REQUIRED: [Capability; 3] = [
        Capability::EntityReferenceIdentification,
        Capability::ManagementPolicyQueries,
        Capability::EntityTraitIntrospection,
    ];
}

/// Access mode carried by a [`crate::Context`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Access {
    Read,
    Write,
    CreateRelated,
    #[default]
    Unknown,
}

/// Intended usage for [`crate::ManagerInterface::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ResolveAccess {
    Read,
    ManagerDriven,
}

/// Intended usage for `preflight` and `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum PublishingAccess {
    Write,
    CreateRelated,
}

/// Intended usage for relationship queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum RelationsAccess {
    Read,
    Write,
    CreateRelated,
}

/// Intended usage for management policy queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum PolicyAccess {
    Read,
    Write,
    CreateRelated,
    Required,
    ManagerDriven,
}

/// Intended usage for entity trait introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum EntityTraitsAccess {
    Read,
    Write,
}

/// Intended usage for default entity reference queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum DefaultEntityAccess {
    Read,
    Write,
    CreateRelated,
}

/// Builds a [`TraitSet`] from anything yielding string-like items.
pub fn trait_set<I, S>(ids: I) -> TraitSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter().map(Into::into).collect()
}
