// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The host-facing manager: capability gating and batch dispatch over a
//! [`ManagerInterface`].
//!
//! Every batch operation comes in three shapes:
//!
//! - the raw form takes `on_success`/`on_error` callbacks and invokes exactly
//!   one of them per input index;
//! - `_one` takes a single input;
//! - `_all` takes a batch and returns outcomes in input order.
//!
//! The `_one`/`_all` forms are generic over an [`ErrorPolicy`] deciding
//! whether element errors are raised or returned in place. A raising policy
//! also stops the batch at its first error, so later elements are not
//! processed.
//!
//! No lock is held while implementation code runs, so managers may call
//! back into the host from any thread.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use assetio_core::{
    AssetIoError, BatchElementError, BatchSink, BoxedPager, Capability, Context, DefaultEntityAccess,
    EntityReference, EntityTraitsAccess, HostSession, InfoDictionary, ManagerInterface,
    PolicyAccess, PublishingAccess, RelationsAccess, ResolveAccess, Settings, StrMap, TraitSet,
    TraitsData,
};

use crate::pager::EntityReferencePager;
use crate::policy::{Delivery, ErrorPolicy, collect, run_sink};

/// Callback receiving a successful element outcome.
pub type OnSuccess<'a, T> = &'a mut dyn FnMut(usize, T);

/// Callback receiving a failed element outcome.
pub type OnError<'a> = &'a mut dyn FnMut(usize, BatchElementError);

/// Shared by a [`Manager`], its clones and every pager it produced.
pub(crate) struct ManagerCore {
    pub(crate) interface: Box<dyn ManagerInterface>,
    pub(crate) host: HostSession,
}

impl Drop for ManagerCore {
    fn drop(&mut self) {
        let identifier = guarded_identifier(self.interface.as_ref());
        tracing::debug!(manager = %identifier, "closing manager");
        match panic::catch_unwind(AssertUnwindSafe(|| self.interface.close())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(manager = %identifier, error = %e, "failed to close manager");
            }
            Err(_) => {
                tracing::error!(manager = %identifier, "manager panicked while closing");
            }
        }
    }
}

/// The implementation's identifier for teardown logging. A panic from
/// plugin code here must not escape a drop.
pub(crate) fn guarded_identifier(interface: &dyn ManagerInterface) -> String {
    panic::catch_unwind(AssertUnwindSafe(|| interface.identifier()))
        .unwrap_or_else(|_| "<unknown manager>".to_string())
}

/// A manager implementation wrapped for use by a host.
///
/// Cheap to clone; the implementation is closed when the last clone and the
/// last pager it produced are dropped.
#[derive(Clone)]
pub struct Manager {
    core: Arc<ManagerCore>,
}

fn first<T>(outcomes: Vec<Result<T, BatchElementError>>) -> Result<T, BatchElementError> {
    outcomes
        .into_iter()
        .next()
        .unwrap_or_else(|| Err(BatchElementError::unknown("no result was reported for this element")))
}

fn check_lengths(operation: &str, references: usize, other: &str, len: usize) -> Result<(), AssetIoError> {
    if references != len {
        return Err(AssetIoError::InputValidation(format!(
            "{operation}: {len} {other} given for {references} entity references"
        )));
    }
    Ok(())
}

fn check_page_size(page_size: usize) -> Result<(), AssetIoError> {
    if page_size == 0 {
        return Err(AssetIoError::InputValidation(
            "page size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

impl Manager {
    pub fn new(interface: Box<dyn ManagerInterface>, host: HostSession) -> Self {
        Self {
            core: Arc::new(ManagerCore { interface, host }),
        }
    }

    fn interface(&self) -> &dyn ManagerInterface {
        self.core.interface.as_ref()
    }

    fn host(&self) -> &HostSession {
        &self.core.host
    }

    pub fn host_session(&self) -> &HostSession {
        &self.core.host
    }

    /// Fails with [`AssetIoError::CapabilityUnsupported`] unless the manager
    /// advertises `capability`.
    fn require(&self, capability: Capability) -> Result<(), AssetIoError> {
        if self.interface().has_capability(capability) {
            return Ok(());
        }
        let manager = self.identifier();
        tracing::warn!(manager = %manager, %capability, "manager does not support capability");
        Err(AssetIoError::CapabilityUnsupported {
            manager,
            capability,
        })
    }

    // --- Identity and lifecycle ---

    pub fn identifier(&self) -> String {
        self.interface().identifier()
    }

    pub fn display_name(&self) -> String {
        self.interface().display_name()
    }

    pub fn info(&self) -> InfoDictionary {
        self.interface().info()
    }

    pub fn settings(&self) -> Result<Settings, AssetIoError> {
        self.interface().settings(self.host())
    }

    /// Initializes the implementation, then checks it advertises every
    /// required capability.
    pub fn initialize(&self, settings: Settings) -> Result<(), AssetIoError> {
        let manager = self.identifier();
        tracing::debug!(manager = %manager, "initializing manager");
        self.interface().initialize(settings, self.host())?;

        let missing: Vec<String> = Capability::REQUIRED
            .iter()
            .filter(|capability| !self.interface().has_capability(**capability))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            tracing::warn!(manager = %manager, missing = ?missing, "manager lacks required capabilities");
            return Err(AssetIoError::Config(format!(
                "manager '{manager}' does not support required capabilities: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    pub fn flush_caches(&self) -> Result<(), AssetIoError> {
        self.interface().flush_caches(self.host())
    }

    /// Returns `terms` unchanged unless the manager supports custom terminology.
    pub fn update_terminology(&self, terms: StrMap) -> Result<StrMap, AssetIoError> {
        if !self.interface().has_capability(Capability::CustomTerminology) {
            return Ok(terms);
        }
        self.interface().update_terminology(terms, self.host())
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.interface().has_capability(capability)
    }

    /// One policy per trait set, in input order.
    pub fn management_policy(
        &self,
        trait_sets: &[TraitSet],
        access: PolicyAccess,
        context: &Context,
    ) -> Result<Vec<TraitsData>, AssetIoError> {
        let policies = self
            .interface()
            .management_policy(trait_sets, access, context, self.host())?;
        if policies.len() != trait_sets.len() {
            return Err(AssetIoError::manager(format!(
                "manager '{}' returned {} policies for {} trait sets",
                self.identifier(),
                policies.len(),
                trait_sets.len()
            )));
        }
        Ok(policies)
    }

    // --- Contexts ---

    /// A new context, carrying fresh manager state if the manager is stateful.
    pub fn create_context(&self) -> Result<Context, AssetIoError> {
        let mut context = Context::default();
        if self.interface().has_capability(Capability::Stateful) {
            context.manager_state = Some(self.interface().create_state(self.host())?);
        }
        Ok(context)
    }

    /// A context derived from `parent`, sharing its access and locale.
    pub fn create_child_context(&self, parent: &Context) -> Result<Context, AssetIoError> {
        let mut child = parent.clone();
        if let Some(state) = &parent.manager_state
            && self.interface().has_capability(Capability::Stateful)
        {
            child.manager_state = Some(self.interface().create_child_state(state, self.host())?);
        }
        Ok(child)
    }

    /// A token restoring `context`'s manager state in another process. Empty
    /// when there is no state to persist.
    pub fn persistence_token_for_context(&self, context: &Context) -> Result<String, AssetIoError> {
        match &context.manager_state {
            Some(state) if self.interface().has_capability(Capability::Stateful) => self
                .interface()
                .persistence_token_for_state(state, self.host()),
            _ => Ok(String::new()),
        }
    }

    pub fn context_from_persistence_token(&self, token: &str) -> Result<Context, AssetIoError> {
        let mut context = Context::default();
        if !token.is_empty() {
            self.require(Capability::Stateful)?;
            context.manager_state = Some(
                self.interface()
                    .state_from_persistence_token(token, self.host())?,
            );
        }
        Ok(context)
    }

    // --- Entity references ---

    pub fn is_entity_reference_string(&self, candidate: &str) -> bool {
        self.interface()
            .is_entity_reference_string(candidate, self.host())
    }

    /// Validates `candidate` with the manager and wraps it.
    pub fn create_entity_reference(&self, candidate: &str) -> Result<EntityReference, AssetIoError> {
        self.create_entity_reference_if_valid(candidate)
            .ok_or_else(|| {
                AssetIoError::InputValidation(format!(
                    "'{candidate}' is not a valid entity reference for manager '{}'",
                    self.identifier()
                ))
            })
    }

    pub fn create_entity_reference_if_valid(&self, candidate: &str) -> Option<EntityReference> {
        self.is_entity_reference_string(candidate)
            .then(|| EntityReference::new(candidate))
    }

    // --- Existence ---

    pub fn entity_exists(
        &self,
        references: &[EntityReference],
        context: &Context,
        on_success: OnSuccess<'_, bool>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.entity_exists_to(references, context, Delivery::every(on_success, on_error))
    }

    fn entity_exists_to(
        &self,
        references: &[EntityReference],
        context: &Context,
        delivery: Delivery<'_, bool>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::ExistenceQueries)?;
        run_sink(references.len(), delivery, |sink| {
            self.interface()
                .entity_exists(references, context, self.host(), sink)
        })
    }

    pub fn entity_exists_one<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        context: &Context,
    ) -> Result<P::One<bool>, AssetIoError> {
        let references = std::slice::from_ref(reference);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.entity_exists_to(references, context, delivery)
        })?))
    }

    pub fn entity_exists_all<P: ErrorPolicy>(
        &self,
        references: &[EntityReference],
        context: &Context,
    ) -> Result<P::All<bool>, AssetIoError> {
        P::all(collect(references.len(), P::STOP_ON_ERROR, |delivery| {
            self.entity_exists_to(references, context, delivery)
        })?)
    }

    // --- Trait introspection ---

    pub fn entity_traits(
        &self,
        references: &[EntityReference],
        access: EntityTraitsAccess,
        context: &Context,
        on_success: OnSuccess<'_, TraitSet>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.entity_traits_to(references, access, context, Delivery::every(on_success, on_error))
    }

    fn entity_traits_to(
        &self,
        references: &[EntityReference],
        access: EntityTraitsAccess,
        context: &Context,
        delivery: Delivery<'_, TraitSet>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::EntityTraitIntrospection)?;
        run_sink(references.len(), delivery, |sink| {
            self.interface()
                .entity_traits(references, access, context, self.host(), sink)
        })
    }

    pub fn entity_traits_one<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        access: EntityTraitsAccess,
        context: &Context,
    ) -> Result<P::One<TraitSet>, AssetIoError> {
        let references = std::slice::from_ref(reference);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.entity_traits_to(references, access, context, delivery)
        })?))
    }

    pub fn entity_traits_all<P: ErrorPolicy>(
        &self,
        references: &[EntityReference],
        access: EntityTraitsAccess,
        context: &Context,
    ) -> Result<P::All<TraitSet>, AssetIoError> {
        P::all(collect(references.len(), P::STOP_ON_ERROR, |delivery| {
            self.entity_traits_to(references, access, context, delivery)
        })?)
    }

    // --- Resolution ---

    pub fn resolve(
        &self,
        references: &[EntityReference],
        trait_set: &TraitSet,
        access: ResolveAccess,
        context: &Context,
        on_success: OnSuccess<'_, TraitsData>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.resolve_to(
            references,
            trait_set,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn resolve_to(
        &self,
        references: &[EntityReference],
        trait_set: &TraitSet,
        access: ResolveAccess,
        context: &Context,
        delivery: Delivery<'_, TraitsData>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::Resolution)?;
        run_sink(references.len(), delivery, |sink| {
            self.interface()
                .resolve(references, trait_set, access, context, self.host(), sink)
        })
    }

    pub fn resolve_one<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        trait_set: &TraitSet,
        access: ResolveAccess,
        context: &Context,
    ) -> Result<P::One<TraitsData>, AssetIoError> {
        let references = std::slice::from_ref(reference);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.resolve_to(references, trait_set, access, context, delivery)
        })?))
    }

    pub fn resolve_all<P: ErrorPolicy>(
        &self,
        references: &[EntityReference],
        trait_set: &TraitSet,
        access: ResolveAccess,
        context: &Context,
    ) -> Result<P::All<TraitsData>, AssetIoError> {
        P::all(collect(references.len(), P::STOP_ON_ERROR, |delivery| {
            self.resolve_to(references, trait_set, access, context, delivery)
        })?)
    }

    // --- Default entity references ---

    /// The manager's default entity for each trait set; `None` when it has
    /// no sensible default.
    pub fn default_entity_reference(
        &self,
        trait_sets: &[TraitSet],
        access: DefaultEntityAccess,
        context: &Context,
        on_success: OnSuccess<'_, Option<EntityReference>>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.default_entity_reference_to(
            trait_sets,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn default_entity_reference_to(
        &self,
        trait_sets: &[TraitSet],
        access: DefaultEntityAccess,
        context: &Context,
        delivery: Delivery<'_, Option<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::DefaultEntityReferences)?;
        run_sink(trait_sets.len(), delivery, |sink| {
            self.interface()
                .default_entity_reference(trait_sets, access, context, self.host(), sink)
        })
    }

    pub fn default_entity_reference_one<P: ErrorPolicy>(
        &self,
        trait_set: &TraitSet,
        access: DefaultEntityAccess,
        context: &Context,
    ) -> Result<P::One<Option<EntityReference>>, AssetIoError> {
        let trait_sets = std::slice::from_ref(trait_set);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.default_entity_reference_to(trait_sets, access, context, delivery)
        })?))
    }

    pub fn default_entity_reference_all<P: ErrorPolicy>(
        &self,
        trait_sets: &[TraitSet],
        access: DefaultEntityAccess,
        context: &Context,
    ) -> Result<P::All<Option<EntityReference>>, AssetIoError> {
        P::all(collect(trait_sets.len(), P::STOP_ON_ERROR, |delivery| {
            self.default_entity_reference_to(trait_sets, access, context, delivery)
        })?)
    }

    // --- Relationships ---

    /// Entities related to each of `references` by `relationship`.
    pub fn get_with_relationship(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
        on_success: OnSuccess<'_, Vec<EntityReference>>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.get_with_relationship_to(
            references,
            relationship,
            result_trait_set,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn get_with_relationship_to(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
        delivery: Delivery<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::RelationshipQueries)?;
        run_sink(references.len(), delivery, |sink| {
            self.interface().get_with_relationship(
                references,
                relationship,
                result_trait_set,
                access,
                context,
                self.host(),
                sink,
            )
        })
    }

    pub fn get_with_relationship_one<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
    ) -> Result<P::One<Vec<EntityReference>>, AssetIoError> {
        let references = std::slice::from_ref(reference);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.get_with_relationship_to(
                references,
                relationship,
                result_trait_set,
                access,
                context,
                delivery,
            )
        })?))
    }

    pub fn get_with_relationship_all<P: ErrorPolicy>(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
    ) -> Result<P::All<Vec<EntityReference>>, AssetIoError> {
        P::all(collect(references.len(), P::STOP_ON_ERROR, |delivery| {
            self.get_with_relationship_to(
                references,
                relationship,
                result_trait_set,
                access,
                context,
                delivery,
            )
        })?)
    }

    /// Entities related to `reference` by each of `relationships`.
    pub fn get_with_relationships(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
        on_success: OnSuccess<'_, Vec<EntityReference>>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.get_with_relationships_to(
            reference,
            relationships,
            result_trait_set,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn get_with_relationships_to(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
        delivery: Delivery<'_, Vec<EntityReference>>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::RelationshipQueries)?;
        run_sink(relationships.len(), delivery, |sink| {
            self.interface().get_with_relationships(
                reference,
                relationships,
                result_trait_set,
                access,
                context,
                self.host(),
                sink,
            )
        })
    }

    pub fn get_with_relationships_all<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        access: RelationsAccess,
        context: &Context,
    ) -> Result<P::All<Vec<EntityReference>>, AssetIoError> {
        P::all(collect(relationships.len(), P::STOP_ON_ERROR, |delivery| {
            self.get_with_relationships_to(
                reference,
                relationships,
                result_trait_set,
                access,
                context,
                delivery,
            )
        })?)
    }

    /// Wraps every pager the implementation yields so it keeps this manager
    /// alive and closes itself on drop.
    fn wrap_pagers<F>(
        &self,
        len: usize,
        delivery: Delivery<'_, EntityReferencePager>,
        query: F,
    ) -> Result<(), AssetIoError>
    where
        F: FnOnce(&mut BatchSink<'_, BoxedPager>) -> Result<(), AssetIoError>,
    {
        let on_success = delivery.on_success;
        let mut on_pager = |index: usize, pager: BoxedPager| {
            on_success(index, EntityReferencePager::new(pager, self.core.clone()));
        };
        let wrapped = Delivery {
            on_success: &mut on_pager,
            on_error: delivery.on_error,
            stop_on_error: delivery.stop_on_error,
        };
        run_sink(len, wrapped, query)
    }

    pub fn get_with_relationship_paged(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
        on_success: OnSuccess<'_, EntityReferencePager>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.get_with_relationship_paged_to(
            references,
            relationship,
            result_trait_set,
            page_size,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn get_with_relationship_paged_to(
        &self,
        references: &[EntityReference],
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
        delivery: Delivery<'_, EntityReferencePager>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::RelationshipQueries)?;
        check_page_size(page_size)?;
        self.wrap_pagers(references.len(), delivery, |sink| {
            self.interface().get_with_relationship_paged(
                references,
                relationship,
                result_trait_set,
                page_size,
                access,
                context,
                self.host(),
                sink,
            )
        })
    }

    pub fn get_with_relationship_paged_one<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        relationship: &TraitsData,
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
    ) -> Result<P::One<EntityReferencePager>, AssetIoError> {
        let references = std::slice::from_ref(reference);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.get_with_relationship_paged_to(
                references,
                relationship,
                result_trait_set,
                page_size,
                access,
                context,
                delivery,
            )
        })?))
    }

    pub fn get_with_relationships_paged(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
        on_success: OnSuccess<'_, EntityReferencePager>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.get_with_relationships_paged_to(
            reference,
            relationships,
            result_trait_set,
            page_size,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn get_with_relationships_paged_to(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
        delivery: Delivery<'_, EntityReferencePager>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::RelationshipQueries)?;
        check_page_size(page_size)?;
        self.wrap_pagers(relationships.len(), delivery, |sink| {
            self.interface().get_with_relationships_paged(
                reference,
                relationships,
                result_trait_set,
                page_size,
                access,
                context,
                self.host(),
                sink,
            )
        })
    }

    pub fn get_with_relationships_paged_all<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        relationships: &[TraitsData],
        result_trait_set: &TraitSet,
        page_size: usize,
        access: RelationsAccess,
        context: &Context,
    ) -> Result<P::All<EntityReferencePager>, AssetIoError> {
        P::all(collect(relationships.len(), P::STOP_ON_ERROR, |delivery| {
            self.get_with_relationships_paged_to(
                reference,
                relationships,
                result_trait_set,
                page_size,
                access,
                context,
                delivery,
            )
        })?)
    }

    // --- Publishing ---

    /// Declares the intent to publish to each reference. Yields the
    /// reference to pass to `register`.
    pub fn preflight(
        &self,
        references: &[EntityReference],
        traits_hints: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
        on_success: OnSuccess<'_, EntityReference>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.preflight_to(
            references,
            traits_hints,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn preflight_to(
        &self,
        references: &[EntityReference],
        traits_hints: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
        delivery: Delivery<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::Publishing)?;
        check_lengths("preflight", references.len(), "traits hints", traits_hints.len())?;
        run_sink(references.len(), delivery, |sink| {
            self.interface()
                .preflight(references, traits_hints, access, context, self.host(), sink)
        })
    }

    pub fn preflight_one<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        traits_hint: &TraitsData,
        access: PublishingAccess,
        context: &Context,
    ) -> Result<P::One<EntityReference>, AssetIoError> {
        let references = std::slice::from_ref(reference);
        let hints = std::slice::from_ref(traits_hint);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.preflight_to(references, hints, access, context, delivery)
        })?))
    }

    pub fn preflight_all<P: ErrorPolicy>(
        &self,
        references: &[EntityReference],
        traits_hints: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
    ) -> Result<P::All<EntityReference>, AssetIoError> {
        P::all(collect(references.len(), P::STOP_ON_ERROR, |delivery| {
            self.preflight_to(references, traits_hints, access, context, delivery)
        })?)
    }

    /// Publishes `entity_traits_datas` to each reference. Yields the
    /// reference of the published entity.
    pub fn register(
        &self,
        references: &[EntityReference],
        entity_traits_datas: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
        on_success: OnSuccess<'_, EntityReference>,
        on_error: OnError<'_>,
    ) -> Result<(), AssetIoError> {
        self.register_to(
            references,
            entity_traits_datas,
            access,
            context,
            Delivery::every(on_success, on_error),
        )
    }

    fn register_to(
        &self,
        references: &[EntityReference],
        entity_traits_datas: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
        delivery: Delivery<'_, EntityReference>,
    ) -> Result<(), AssetIoError> {
        self.require(Capability::Publishing)?;
        check_lengths(
            "register",
            references.len(),
            "traits datas",
            entity_traits_datas.len(),
        )?;
        run_sink(references.len(), delivery, |sink| {
            self.interface().register(
                references,
                entity_traits_datas,
                access,
                context,
                self.host(),
                sink,
            )
        })
    }

    pub fn register_one<P: ErrorPolicy>(
        &self,
        reference: &EntityReference,
        entity_traits_data: &TraitsData,
        access: PublishingAccess,
        context: &Context,
    ) -> Result<P::One<EntityReference>, AssetIoError> {
        let references = std::slice::from_ref(reference);
        let datas = std::slice::from_ref(entity_traits_data);
        P::one(first(collect(1, P::STOP_ON_ERROR, |delivery| {
            self.register_to(references, datas, access, context, delivery)
        })?))
    }

    pub fn register_all<P: ErrorPolicy>(
        &self,
        references: &[EntityReference],
        entity_traits_datas: &[TraitsData],
        access: PublishingAccess,
        context: &Context,
    ) -> Result<P::All<EntityReference>, AssetIoError> {
        P::all(collect(references.len(), P::STOP_ON_ERROR, |delivery| {
            self.register_to(references, entity_traits_datas, access, context, delivery)
        })?)
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("identifier", &self.identifier())
            .field("host", &self.core.host)
            .finish()
    }
}
