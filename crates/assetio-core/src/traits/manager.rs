// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Manager Implementation protocol.
//!
//! Every plugin's product implements [`ManagerInterface`]. Methods are split
//! into three groups:
//!
//! - mandatory: `identifier`, `display_name`, `initialize`, `has_capability`
//!   and the methods behind the required capabilities;
//! - soft: `info`, `settings`, `flush_caches`, `update_terminology` and
//!   `close`, which have neutral defaults;
//! - capability-gated: everything else. The defaults return
//!   [`AssetIoError::NotImplemented`]; the host dispatcher checks
//!   [`ManagerInterface::has_capability`] before calling them.
//!
//! Batch methods report one outcome per input through the supplied
//! [`BatchSink`]. An `Err` return fails the call as a whole.

use crate::batch::BatchSink;
use crate::context::{Context, ManagerState};
use crate::error::AssetIoError;
use crate::traits::host::HostSession;
use crate::traits::pager::{EmptyPager, EntityReferencePagerInterface};
use crate::traits_data::TraitsData;
use crate::types::{
    Capability, DefaultEntityAccess, EntityReference, EntityTraitsAccess, InfoDictionary,
    PolicyAccess, PublishingAccess, RelationsAccess, ResolveAccess, Settings, StrMap, TraitSet,
};

/// A boxed pager as produced by paged relationship queries.
pub type BoxedPager = Box<dyn EntityReferencePagerInterface>;

fn not_implemented(identifier: String, method: &str) -> AssetIoError {
    AssetIoError::NotImplemented(format!("manager '{identifier}' does not implement {method}"))
}

#[allow(clippy::too_many_arguments)]
pub trait ManagerInterface: Send + Sync {
    /// Globally unique identifier, identical to the providing plugin's.
    fn identifier(&self) -> String;

    /// Human-readable name for UI display.
    fn display_name(&self) -> String;

    fn info(&self) -> InfoDictionary {
        InfoDictionary::new()
    }

    /// Current settings, as accepted by `initialize`.
    fn settings(&self, _host: &HostSession) -> Result<Settings, AssetIoError> {
        Ok(Settings::new())
    }

    /// Prepares the implementation for use. Called once per usable lifetime.
    fn initialize(&self, settings: Settings, host: &HostSession) -> Result<(), AssetIoError>;

    fn has_capability(&self, capability: Capability) -> bool;

    fn flush_caches(&self, _host: &HostSession) -> Result<(), AssetIoError> {
        Ok(())
    }

    /// Substitutes manager-specific terms into the host's terminology map.
    fn update_terminology(&self, terms: StrMap, _host: &HostSession) -> Result<StrMap, AssetIoError> {
        Ok(terms)
    }

    /// Called once when the host releases its last reference.
    fn close(&self) -> Result<(), AssetIoError> {
        Ok(())
    }

    // --- Required capabilities ---

    /// Policy for each trait set: which traits the manager handles.
    fn management_policy(
        &self,
        trait_sets: &[TraitSet],
        access: PolicyAccess,
        context: &Context,
        host: &HostSession,
    ) -> Result<Vec<TraitsData>, AssetIoError>;

    /// Whether `candidate` is syntactically a reference this manager owns.
    fn is_entity_reference_string(&self, candidate: &str, host: &HostSession) -> bool;

    fn entity_traits(
        &self,
        references: &[EntityReference],
        access: EntityTraitsAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, TraitSet>,
    ) -> Result<(), AssetIoError>;

    // --- Stateful ---

    fn create_state(&self, _host: &HostSession) -> Result<ManagerState, AssetIoError> {
        Err(not_implemented(self.identifier(), "create_state"))
    }

    fn create_child_state(
        &self,
        _parent: &ManagerState,
        _host: &HostSession,
    ) -> Result<ManagerState, AssetIoError> {
        Err(not_implemented(self.identifier(), "create_child_state"))
    }

    fn persistence_token_for_state(
        &self,
        _state: &ManagerState,
        _host: &HostSession,
    ) -> Result<String, AssetIoError> {
        Err(not_implemented(self.identifier(), "persistence_token_for_state"))
    }

    fn state_from_persistence_token(
        &self,
        _token: &str,
        _host: &HostSession,
    ) -> Result<ManagerState, AssetIoError> {
        Err(not_implemented(self.identifier(), "state_from_persistence_token"))
    }

    // --- ExistenceQueries ---

    fn entity_exists(
        &self,
        _references: &[EntityReference],
        _context: &Context,
        _host: &HostSession,
        _sink: &mut BatchSink<'_, bool>,
    ) -> Result<(), AssetIoError> {
        Err(not_implemented(self.identifier(), "entity_exists"))
    }

    // --- Resolution ---

    fn resolve(
        &self,
        _references: &[EntityReference],
        _trait_set: &TraitSet,
        _access: ResolveAccess,
        _context: &Context,
        _host: &HostSession,
        _sink: &mut BatchSink<'_, TraitsData>,
    ) -> Result<(), AssetIoError> {
        Err(not_implemented(self.identifier(), "resolve"))
    }

    // --- DefaultEntityReferences ---

    fn default_entity_reference(
        &self,
        _trait_sets: &[TraitSet],
        _access: DefaultEntityAccess,
        _context: &Context,
        _host: &HostSession,
        _sink: &mut BatchSink<'_, Option<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        Err(not_implemented(self.identifier(), "default_entity_reference"))
    }

    // --- RelationshipQueries ---

    /// One relationship, many source references.
    fn get_with_relationship(
        &self,
        _references: &[EntityReference],
        _relationship: &TraitsData,
        _result_trait_set: &TraitSet,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        _sink: &mut BatchSink<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        Err(not_implemented(self.identifier(), "get_with_relationship"))
    }

    /// One source reference, many relationships.
    fn get_with_relationships(
        &self,
        _reference: &EntityReference,
        _relationships: &[TraitsData],
        _result_trait_set: &TraitSet,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        _sink: &mut BatchSink<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        Err(not_implemented(self.identifier(), "get_with_relationships"))
    }

    /// Paged form of [`ManagerInterface::get_with_relationship`]. The default
    /// yields an [`EmptyPager`] per reference.
    fn get_with_relationship_paged(
        &self,
        references: &[EntityReference],
        _relationship: &TraitsData,
        _result_trait_set: &TraitSet,
        _page_size: usize,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, BoxedPager>,
    ) -> Result<(), AssetIoError> {
        for index in 0..references.len() {
            sink.success(index, Box::new(EmptyPager));
        }
        Ok(())
    }

    /// Paged form of [`ManagerInterface::get_with_relationships`]. The default
    /// yields an [`EmptyPager`] per relationship.
    fn get_with_relationships_paged(
        &self,
        _reference: &EntityReference,
        relationships: &[TraitsData],
        _result_trait_set: &TraitSet,
        _page_size: usize,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, BoxedPager>,
    ) -> Result<(), AssetIoError> {
        for index in 0..relationships.len() {
            sink.success(index, Box::new(EmptyPager));
        }
        Ok(())
    }

    // --- Publishing ---

    fn preflight(
        &self,
        _references: &[EntityReference],
        _traits_hints: &[TraitsData],
        _access: PublishingAccess,
        _context: &Context,
        _host: &HostSession,
        _sink: &mut BatchSink<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        Err(not_implemented(self.identifier(), "preflight"))
    }

    fn register(
        &self,
        _references: &[EntityReference],
        _entity_traits_datas: &[TraitsData],
        _access: PublishingAccess,
        _context: &Context,
        _host: &HostSession,
        _sink: &mut BatchSink<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        Err(not_implemented(self.identifier(), "register"))
    }
}
