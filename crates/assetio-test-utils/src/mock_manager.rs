// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory manager implementation for deterministic testing.
//!
//! `MockManager` keeps a small entity library in memory and implements every
//! capability of the protocol. References look like `mock:///name`; anything
//! else is malformed. Counters for `close` and pager `close` are shared
//! between clones so tests can observe them after the host drops its
//! manager.
//!
//! Every batch loop polls `BatchSink::is_aborted` and stops early, and
//! `register` records each index it publishes (see
//! [`MockManager::published_indices`]).

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assetio_core::{
    AssetIoError, BatchElementError, BatchSink, BoxedPager, Capability, Context,
    DefaultEntityAccess, EntityReference, EntityReferencePagerInterface, EntityTraitsAccess,
    HostSession, InfoDictionary, ManagerInterface, ManagerState, PolicyAccess, PublishingAccess,
    RelationsAccess, ResolveAccess, Settings, StrMap, TraitSet, TraitsData,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Prefix every mock entity reference starts with.
pub const MOCK_REFERENCE_PREFIX: &str = "mock:///";

/// Default identifier of a [`MockManager`].
pub const MOCK_MANAGER_IDENTIFIER: &str = "org.assetio.test.mock";

/// Trait set by `management_policy` for every trait set the mock manages.
pub const MANAGED_TRAIT: &str = "assetio.ManagementPolicy.Managed";

/// Opaque state handed out by `create_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockState {
    pub id: u64,
    pub parent: Option<u64>,
}

#[derive(Debug, Clone)]
struct Relation {
    from: String,
    kind: String,
    to: EntityReference,
}

#[derive(Debug, Clone, Default)]
struct Library {
    entities: BTreeMap<String, TraitsData>,
    relations: Vec<Relation>,
}

/// In-memory [`ManagerInterface`] with every capability.
pub struct MockManager {
    identifier: String,
    display_name: String,
    capabilities: HashSet<Capability>,
    silent: BTreeSet<String>,
    fail_pager_close: bool,
    library: Mutex<Library>,
    settings: Mutex<Settings>,
    initialized: AtomicBool,
    next_state: Arc<AtomicU64>,
    closes: Arc<AtomicUsize>,
    pager_closes: Arc<AtomicUsize>,
    published: Arc<Mutex<Vec<usize>>>,
}

impl MockManager {
    pub fn new() -> Self {
        Self {
            identifier: MOCK_MANAGER_IDENTIFIER.to_string(),
            display_name: "Mock Manager".to_string(),
            capabilities: Capability::iter().collect(),
            silent: BTreeSet::new(),
            fail_pager_close: false,
            library: Mutex::new(Library::default()),
            settings: Mutex::new(Settings::new()),
            initialized: AtomicBool::new(false),
            next_state: Arc::new(AtomicU64::new(1)),
            closes: Arc::new(AtomicUsize::new(0)),
            pager_closes: Arc::new(AtomicUsize::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Restricts the advertised capabilities to `capabilities`.
    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    /// Advertises only the capabilities every manager must have.
    pub fn minimal(self) -> Self {
        self.with_capabilities(Capability::REQUIRED)
    }

    /// Adds an entity under `mock:///{name}`.
    pub fn with_entity(self, name: &str, data: TraitsData) -> Self {
        self.lock_library()
            .entities
            .insert(mock_reference(name).into_string(), data);
        self
    }

    /// Relates `from` to `to` through the relationship trait `kind`.
    pub fn with_relation(self, from: &str, kind: &str, to: &str) -> Self {
        self.lock_library().relations.push(Relation {
            from: mock_reference(from).into_string(),
            kind: kind.to_string(),
            to: mock_reference(to),
        });
        self
    }

    /// Batch calls never report an outcome for `mock:///{name}`.
    pub fn with_silent_entity(mut self, name: &str) -> Self {
        self.silent.insert(mock_reference(name).into_string());
        self
    }

    /// Pagers produced by this manager fail to close.
    pub fn with_failing_pager_close(mut self) -> Self {
        self.fail_pager_close = true;
        self
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        self.closes.clone()
    }

    pub fn pager_close_counter(&self) -> Arc<AtomicUsize> {
        self.pager_closes.clone()
    }

    /// Batch indices `register` has published, in processing order. Shared
    /// between clones.
    pub fn published_indices(&self) -> Arc<Mutex<Vec<usize>>> {
        self.published.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Traits stored for `mock:///{name}`.
    pub fn entity(&self, name: &str) -> Option<TraitsData> {
        self.lock_library()
            .entities
            .get(mock_reference(name).as_str())
            .cloned()
    }

    fn lock_library(&self) -> std::sync::MutexGuard<'_, Library> {
        self.library
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn is_silent(&self, reference: &EntityReference) -> bool {
        self.silent.contains(reference.as_str())
    }

    /// Checks a reference is ours, then looks it up.
    fn lookup(&self, reference: &EntityReference) -> Result<TraitsData, BatchElementError> {
        if !reference.as_str().starts_with(MOCK_REFERENCE_PREFIX) {
            return Err(BatchElementError::malformed_entity_reference(format!(
                "'{reference}' is not a mock reference"
            )));
        }
        self.lock_library()
            .entities
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| {
                BatchElementError::entity_resolution_error(format!("entity '{reference}' not found"))
            })
    }

    fn related(&self, from: &EntityReference, relationship: &TraitsData, result: &TraitSet) -> Vec<EntityReference> {
        let library = self.lock_library();
        library
            .relations
            .iter()
            .filter(|r| r.from == from.as_str() && relationship.has_trait(&r.kind))
            .filter(|r| {
                library
                    .entities
                    .get(r.to.as_str())
                    .is_some_and(|data| result.iter().all(|t| data.has_trait(t)))
            })
            .map(|r| r.to.clone())
            .collect()
    }

    fn paged_relations(
        &self,
        from: &EntityReference,
        relationship: &TraitsData,
        result: &TraitSet,
        page_size: usize,
    ) -> Result<BoxedPager, BatchElementError> {
        self.lookup(from)?;
        Ok(Box::new(MockPager {
            pages: self
                .related(from, relationship, result)
                .chunks(page_size.max(1))
                .map(<[EntityReference]>::to_vec)
                .collect(),
            current: 0,
            fail_close: self.fail_pager_close,
            closes: self.pager_closes.clone(),
        }))
    }

    fn next_state(&self, parent: Option<u64>) -> ManagerState {
        let id = self.next_state.fetch_add(1, Ordering::SeqCst);
        ManagerState::new(MockState { id, parent })
    }
}

impl Default for MockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockManager {
    /// A fresh, uninitialized manager over a snapshot of this one's library.
    /// Counters are shared.
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            capabilities: self.capabilities.clone(),
            silent: self.silent.clone(),
            fail_pager_close: self.fail_pager_close,
            library: Mutex::new(self.lock_library().clone()),
            settings: Mutex::new(Settings::new()),
            initialized: AtomicBool::new(false),
            next_state: self.next_state.clone(),
            closes: self.closes.clone(),
            pager_closes: self.pager_closes.clone(),
            published: self.published.clone(),
        }
    }
}

/// `mock:///{name}`.
pub fn mock_reference(name: &str) -> EntityReference {
    EntityReference::new(format!("{MOCK_REFERENCE_PREFIX}{name}"))
}

impl ManagerInterface for MockManager {
    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn display_name(&self) -> String {
        self.display_name.clone()
    }

    fn info(&self) -> InfoDictionary {
        let mut info = InfoDictionary::new();
        info.insert("entityReferencesMatchPrefix".into(), MOCK_REFERENCE_PREFIX.into());
        info
    }

    fn settings(&self, _host: &HostSession) -> Result<Settings, AssetIoError> {
        Ok(self
            .settings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn initialize(&self, settings: Settings, _host: &HostSession) -> Result<(), AssetIoError> {
        if settings.get("fail_initialize").and_then(|v| v.as_bool()) == Some(true) {
            return Err(AssetIoError::manager("initialization refused by settings"));
        }
        *self
            .settings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = settings;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn flush_caches(&self, _host: &HostSession) -> Result<(), AssetIoError> {
        Ok(())
    }

    fn update_terminology(&self, mut terms: StrMap, _host: &HostSession) -> Result<StrMap, AssetIoError> {
        for value in terms.values_mut() {
            *value = value.replace("asset", "mock entity");
        }
        Ok(terms)
    }

    fn close(&self) -> Result<(), AssetIoError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn management_policy(
        &self,
        trait_sets: &[TraitSet],
        access: PolicyAccess,
        _context: &Context,
        _host: &HostSession,
    ) -> Result<Vec<TraitsData>, AssetIoError> {
        Ok(trait_sets
            .iter()
            .map(|set| match access {
                PolicyAccess::Read | PolicyAccess::Write | PolicyAccess::CreateRelated
                    if !set.is_empty() =>
                {
                    TraitsData::with_traits([MANAGED_TRAIT])
                }
                _ => TraitsData::new(),
            })
            .collect())
    }

    fn is_entity_reference_string(&self, candidate: &str, _host: &HostSession) -> bool {
        candidate.starts_with(MOCK_REFERENCE_PREFIX)
    }

    fn entity_traits(
        &self,
        references: &[EntityReference],
        _access: EntityTraitsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, TraitSet>,
    ) -> Result<(), AssetIoError> {
        for (index, reference) in references.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            if self.is_silent(reference) {
                continue;
            }
            sink.report(index, self.lookup(reference).map(|data| data.trait_set()));
        }
        Ok(())
    }

    fn create_state(&self, _host: &HostSession) -> Result<ManagerState, AssetIoError> {
        Ok(self.next_state(None))
    }

    fn create_child_state(
        &self,
        parent: &ManagerState,
        _host: &HostSession,
    ) -> Result<ManagerState, AssetIoError> {
        let parent = parent
            .downcast_ref::<MockState>()
            .ok_or_else(|| AssetIoError::InputValidation("state was not created by the mock manager".into()))?;
        Ok(self.next_state(Some(parent.id)))
    }

    fn persistence_token_for_state(
        &self,
        state: &ManagerState,
        _host: &HostSession,
    ) -> Result<String, AssetIoError> {
        let state = state
            .downcast_ref::<MockState>()
            .ok_or_else(|| AssetIoError::InputValidation("state was not created by the mock manager".into()))?;
        serde_json::to_string(state).map_err(|e| AssetIoError::Manager {
            message: "cannot serialize state".into(),
            source: Some(Box::new(e)),
        })
    }

    fn state_from_persistence_token(
        &self,
        token: &str,
        _host: &HostSession,
    ) -> Result<ManagerState, AssetIoError> {
        let state: MockState = serde_json::from_str(token)
            .map_err(|e| AssetIoError::InputValidation(format!("invalid persistence token: {e}")))?;
        Ok(ManagerState::new(state))
    }

    fn entity_exists(
        &self,
        references: &[EntityReference],
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, bool>,
    ) -> Result<(), AssetIoError> {
        for (index, reference) in references.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            if self.is_silent(reference) {
                continue;
            }
            let outcome = match self.lookup(reference) {
                Ok(_) => Ok(true),
                Err(e) if e.code() == assetio_core::BatchErrorCode::EntityResolutionError => Ok(false),
                Err(e) => Err(e),
            };
            sink.report(index, outcome);
        }
        Ok(())
    }

    fn resolve(
        &self,
        references: &[EntityReference],
        trait_set: &TraitSet,
        _access: ResolveAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, TraitsData>,
    ) -> Result<(), AssetIoError> {
        for (index, reference) in references.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            if self.is_silent(reference) {
                continue;
            }
            sink.report(index, self.lookup(reference).map(|data| data.filtered(trait_set)));
        }
        Ok(())
    }

    fn default_entity_reference(
        &self,
        trait_sets: &[TraitSet],
        _access: DefaultEntityAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, Option<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        let outcomes: Vec<_> = {
            let library = self.lock_library();
            trait_sets
                .iter()
                .map(|set| {
                    if set.is_empty() {
                        return Err(BatchElementError::invalid_trait_set("trait set is empty"));
                    }
                    Ok(library
                        .entities
                        .iter()
                        .find(|(_, data)| set.iter().all(|t| data.has_trait(t)))
                        .map(|(reference, _)| EntityReference::new(reference.clone())))
                })
                .collect()
        };
        for (index, outcome) in outcomes.into_iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            sink.report(index, outcome);
        }
        Ok(())
    }

    fn get_with_relationship(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        for (index, reference) in references.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            let outcome = self
                .lookup(reference)
                .map(|_| self.related(reference, relationship, result_trait_set));
            sink.report(index, outcome);
        }
        Ok(())
    }

    fn get_with_relationships(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        for (index, relationship) in relationships.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            let outcome = self
                .lookup(reference)
                .map(|_| self.related(reference, relationship, result_trait_set));
            sink.report(index, outcome);
        }
        Ok(())
    }

    fn get_with_relationship_paged(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        page_size: usize,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, BoxedPager>,
    ) -> Result<(), AssetIoError> {
        for (index, reference) in references.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            sink.report(
                index,
                self.paged_relations(reference, relationship, result_trait_set, page_size),
            );
        }
        Ok(())
    }

    fn get_with_relationships_paged(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        page_size: usize,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, BoxedPager>,
    ) -> Result<(), AssetIoError> {
        for (index, relationship) in relationships.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            sink.report(
                index,
                self.paged_relations(reference, relationship, result_trait_set, page_size),
            );
        }
        Ok(())
    }

    fn preflight(
        &self,
        references: &[EntityReference],
        traits_hints: &[TraitsData],
        _access: PublishingAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        for (index, (reference, hint)) in references.iter().zip(traits_hints).enumerate() {
            if sink.is_aborted() {
                break;
            }
            if !reference.as_str().starts_with(MOCK_REFERENCE_PREFIX) {
                sink.error(
                    index,
                    BatchElementError::malformed_entity_reference(reference.as_str()),
                );
            } else if hint.is_empty() {
                sink.error(
                    index,
                    BatchElementError::invalid_preflight_hint("preflight hint has no traits"),
                );
            } else {
                sink.success(index, reference.clone());
            }
        }
        Ok(())
    }

    fn register(
        &self,
        references: &[EntityReference],
        entity_traits_datas: &[TraitsData],
        access: PublishingAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        for (index, (reference, data)) in references.iter().zip(entity_traits_datas).enumerate() {
            if sink.is_aborted() {
                break;
            }
            if !reference.as_str().starts_with(MOCK_REFERENCE_PREFIX) {
                sink.error(
                    index,
                    BatchElementError::malformed_entity_reference(reference.as_str()),
                );
                continue;
            }
            let target = match access {
                PublishingAccess::Write => reference.clone(),
                PublishingAccess::CreateRelated => EntityReference::new(format!(
                    "{reference}/{}",
                    uuid::Uuid::new_v4().simple()
                )),
            };
            self.lock_library()
                .entities
                .insert(target.as_str().to_string(), data.clone());
            self.published
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(index);
            sink.success(index, target);
        }
        Ok(())
    }
}

/// Pages over a fixed list of references.
pub struct MockPager {
    pages: Vec<Vec<EntityReference>>,
    current: usize,
    fail_close: bool,
    closes: Arc<AtomicUsize>,
}

impl EntityReferencePagerInterface for MockPager {
    fn has_next(&mut self, _host: &HostSession) -> Result<bool, AssetIoError> {
        Ok(self.current + 1 < self.pages.len())
    }

    fn get(&mut self, _host: &HostSession) -> Result<Vec<EntityReference>, AssetIoError> {
        Ok(self.pages.get(self.current).cloned().unwrap_or_default())
    }

    fn next(&mut self, _host: &HostSession) -> Result<(), AssetIoError> {
        if self.current < self.pages.len() {
            self.current += 1;
        }
        Ok(())
    }

    fn close(&mut self, _host: &HostSession) -> Result<(), AssetIoError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(AssetIoError::manager("mock pager refused to close"));
        }
        Ok(())
    }
}
