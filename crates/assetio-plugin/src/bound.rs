// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wrappers tying objects produced by a native binary to its lifetime.
//!
//! Each wrapper owns the wrapped object and a [`LibraryHandle`]. The object
//! field is declared first so it is dropped while the binary that holds its
//! code is still loaded.

use std::cell::RefCell;
use std::sync::Arc;

use assetio_core::{
    AssetIoError, BatchElementError, BatchSink, BoxedPager, Capability, Context, DefaultEntityAccess,
    EntityReference, EntityReferencePagerInterface, EntityTraitsAccess, HostSession,
    InfoDictionary, ManagerInterface, ManagerState, PluginProvider, PolicyAccess,
    PublishingAccess, RelationsAccess, ResolveAccess, Settings, StrMap, TraitSet, TraitsData,
};

use crate::library::LibraryHandle;

/// A provider loaded from a native binary.
pub struct BoundProvider {
    inner: Arc<dyn PluginProvider>,
    library: LibraryHandle,
}

impl BoundProvider {
    pub fn new(inner: Arc<dyn PluginProvider>, library: LibraryHandle) -> Self {
        Self { inner, library }
    }

    pub fn library(&self) -> &LibraryHandle {
        &self.library
    }
}

impl PluginProvider for BoundProvider {
    fn identifier(&self) -> String {
        self.inner.identifier()
    }

    fn create_manager(&self) -> Result<Box<dyn ManagerInterface>, AssetIoError> {
        let inner = self.inner.create_manager()?;
        Ok(Box::new(BoundManager {
            inner,
            library: self.library.clone(),
        }))
    }
}

/// A manager implementation whose code lives in a native binary.
pub struct BoundManager {
    inner: Box<dyn ManagerInterface>,
    library: LibraryHandle,
}

impl BoundManager {
    fn anchored(&self, state: ManagerState) -> ManagerState {
        state.with_anchor(self.library.anchor())
    }

    /// Runs a paged query, wrapping every pager it yields in a [`BoundPager`].
    fn bind_pagers<F>(
        &self,
        len: usize,
        sink: &mut BatchSink<'_, BoxedPager>,
        query: F,
    ) -> Result<(), AssetIoError>
    where
        F: FnOnce(&mut BatchSink<'_, BoxedPager>) -> Result<(), AssetIoError>,
    {
        let stop_on_error = sink.stops_on_error();
        let outer = RefCell::new(sink);
        let mut on_success = |index: usize, pager: BoxedPager| {
            let bound: BoxedPager = Box::new(BoundPager {
                inner: pager,
                library: self.library.clone(),
            });
            outer.borrow_mut().success(index, bound);
        };
        let mut on_error = |index: usize, error: BatchElementError| outer.borrow_mut().error(index, error);
        let mut inner = BatchSink::new(len, &mut on_success, &mut on_error);
        if stop_on_error {
            inner = inner.stop_on_error();
        }
        query(&mut inner)
    }
}

impl ManagerInterface for BoundManager {
    fn identifier(&self) -> String {
        self.inner.identifier()
    }

    fn display_name(&self) -> String {
        self.inner.display_name()
    }

    fn info(&self) -> InfoDictionary {
        self.inner.info()
    }

    fn settings(&self, host: &HostSession) -> Result<Settings, AssetIoError> {
        self.inner.settings(host)
    }

    fn initialize(&self, settings: Settings, host: &HostSession) -> Result<(), AssetIoError> {
        self.inner.initialize(settings, host)
    }

    fn has_capability(&self, capability: Capability) -> bool {
        self.inner.has_capability(capability)
    }

    fn flush_caches(&self, host: &HostSession) -> Result<(), AssetIoError> {
        self.inner.flush_caches(host)
    }

    fn update_terminology(&self, terms: StrMap, host: &HostSession) -> Result<StrMap, AssetIoError> {
        self.inner.update_terminology(terms, host)
    }

    fn close(&self) -> Result<(), AssetIoError> {
        self.inner.close()
    }

    fn management_policy(
        &self,
        trait_sets: &[TraitSet],
        access: PolicyAccess,
        context: &Context,
        host: &HostSession,
    ) -> Result<Vec<TraitsData>, AssetIoError> {
        self.inner.management_policy(trait_sets, access, context, host)
    }

    fn is_entity_reference_string(&self, candidate: &str, host: &HostSession) -> bool {
        self.inner.is_entity_reference_string(candidate, host)
    }

    fn entity_traits(
        &self,
        references: &[EntityReference],
        access: EntityTraitsAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, TraitSet>,
    ) -> Result<(), AssetIoError> {
        self.inner.entity_traits(references, access, context, host, sink)
    }

    fn create_state(&self, host: &HostSession) -> Result<ManagerState, AssetIoError> {
        self.inner.create_state(host).map(|state| self.anchored(state))
    }

    fn create_child_state(
        &self,
        parent: &ManagerState,
        host: &HostSession,
    ) -> Result<ManagerState, AssetIoError> {
        self.inner
            .create_child_state(parent, host)
            .map(|state| self.anchored(state))
    }

    fn persistence_token_for_state(
        &self,
        state: &ManagerState,
        host: &HostSession,
    ) -> Result<String, AssetIoError> {
        self.inner.persistence_token_for_state(state, host)
    }

    fn state_from_persistence_token(
        &self,
        token: &str,
        host: &HostSession,
    ) -> Result<ManagerState, AssetIoError> {
        self.inner
            .state_from_persistence_token(token, host)
            .map(|state| self.anchored(state))
    }

    fn entity_exists(
        &self,
        references: &[EntityReference],
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, bool>,
    ) -> Result<(), AssetIoError> {
        self.inner.entity_exists(references, context, host, sink)
    }

    fn resolve(
        &self,
        references: &[EntityReference],
        trait_set: &TraitSet,
        access: ResolveAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, TraitsData>,
    ) -> Result<(), AssetIoError> {
        self.inner
            .resolve(references, trait_set, access, context, host, sink)
    }

    fn default_entity_reference(
        &self,
        trait_sets: &[TraitSet],
        access: DefaultEntityAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, Option<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        self.inner
            .default_entity_reference(trait_sets, access, context, host, sink)
    }

    fn get_with_relationship(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        self.inner.get_with_relationship(
            references,
            relationship,
            result_trait_set,
            access,
            context,
            host,
            sink,
        )
    }

    fn get_with_relationships(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        self.inner.get_with_relationships(
            reference,
            relationships,
            result_trait_set,
            access,
            context,
            host,
            sink,
        )
    }

    fn get_with_relationship_paged(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, BoxedPager>,
    ) -> Result<(), AssetIoError> {
        self.bind_pagers(references.len(), sink, |inner| {
            self.inner.get_with_relationship_paged(
                references,
                relationship,
                result_trait_set,
                page_size,
                access,
                context,
                host,
                inner,
            )
        })
    }

    fn get_with_relationships_paged(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, BoxedPager>,
    ) -> Result<(), AssetIoError> {
        self.bind_pagers(relationships.len(), sink, |inner| {
            self.inner.get_with_relationships_paged(
                reference,
                relationships,
                result_trait_set,
                page_size,
                access,
                context,
                host,
                inner,
            )
        })
    }

    fn preflight(
        &self,
        references: &[EntityReference],
        traits_hints: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        self.inner
            .preflight(references, traits_hints, access, context, host, sink)
    }

    fn register(
        &self,
        references: &[EntityReference],
        entity_traits_datas: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
        host: &HostSession,
        sink: &mut BatchSink<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        self.inner
            .register(references, entity_traits_datas, access, context, host, sink)
    }
}

/// A pager whose code lives in a native binary.
pub struct BoundPager {
    inner: BoxedPager,
    library: LibraryHandle,
}

impl BoundPager {
    pub fn library(&self) -> &LibraryHandle {
        &self.library
    }
}

impl EntityReferencePagerInterface for BoundPager {
    fn has_next(&mut self, host: &HostSession) -> Result<bool, AssetIoError> {
        self.inner.has_next(host)
    }

    fn get(&mut self, host: &HostSession) -> Result<Vec<EntityReference>, AssetIoError> {
        self.inner.get(host)
    }

    fn next(&mut self, host: &HostSession) -> Result<(), AssetIoError> {
        self.inner.next(host)
    }

    fn close(&mut self, host: &HostSession) -> Result<(), AssetIoError> {
        self.inner.close(host)
    }
}
