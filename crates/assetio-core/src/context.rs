// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session correlation objects.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::traits_data::TraitsData;
use crate::types::Access;

/// Opaque, manager-defined state attached to a [`Context`].
///
/// The host never inspects the contents; the manager that created it
/// recovers its own type with [`ManagerState::downcast_ref`]. An optional
/// anchor keeps whatever produced the state (for example a native plugin
/// binary) alive for as long as any clone of the state exists.
#[derive(Clone)]
pub struct ManagerState {
    // Declared before `anchor` so the state drops first.
    inner: Arc<dyn Any + Send + Sync>,
    anchor: Option<Arc<dyn Any + Send + Sync>>,
}

impl ManagerState {
    pub fn new<T: Any + Send + Sync>(state: T) -> Self {
        Self {
            inner: Arc::new(state),
            anchor: None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Attaches a keep-alive anchor. Replaces any existing anchor.
    pub fn with_anchor(mut self, anchor: Arc<dyn Any + Send + Sync>) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// True when both handles refer to the same state object.
    pub fn ptr_eq(&self, other: &ManagerState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerState")
            .field("anchored", &self.anchor.is_some())
            .finish_non_exhaustive()
    }
}

/// Correlates the calls that make up one logical host operation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub access: Access,
    /// State created by the manager for this session, if it is stateful.
    pub manager_state: Option<ManagerState>,
    /// Describes the host-side situation the calls are made from.
    pub locale: TraitsData,
}

impl Context {
    pub fn new(access: Access) -> Self {
        Self {
            access,
            ..Self::default()
        }
    }

    pub fn is_read(&self) -> bool {
        self.access == Access::Read
    }

    pub fn is_write(&self) -> bool {
        matches!(self.access, Access::Write | Access::CreateRelated)
    }
}
