// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-side wrapper for paged relationship query results.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use assetio_core::{AssetIoError, BoxedPager, EntityReference};

use crate::manager::{ManagerCore, guarded_identifier};

/// A cursor over pages of related entity references.
///
/// The pager keeps the manager that produced it alive. It is closed when
/// dropped; errors and panics raised while auto-closing are logged and
/// swallowed. Call [`EntityReferencePager::close`] to observe them instead.
pub struct EntityReferencePager {
    // Declared before `manager` so the implementation's pager goes first.
    inner: Option<BoxedPager>,
    manager: Arc<ManagerCore>,
}

impl EntityReferencePager {
    pub(crate) fn new(inner: BoxedPager, manager: Arc<ManagerCore>) -> Self {
        Self {
            inner: Some(inner),
            manager,
        }
    }

    fn open(&mut self) -> Result<&mut BoxedPager, AssetIoError> {
        self.inner
            .as_mut()
            .ok_or_else(|| AssetIoError::InputValidation("pager has been closed".to_string()))
    }

    /// Whether a page follows the current one.
    pub fn has_next(&mut self) -> Result<bool, AssetIoError> {
        let host = self.manager.host.clone();
        self.open()?.has_next(&host)
    }

    /// References in the current page. Empty past the last page.
    pub fn get(&mut self) -> Result<Vec<EntityReference>, AssetIoError> {
        let host = self.manager.host.clone();
        self.open()?.get(&host)
    }

    pub fn next(&mut self) -> Result<(), AssetIoError> {
        let host = self.manager.host.clone();
        self.open()?.next(&host)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Closes the pager now. Further calls other than `close` fail.
    pub fn close(&mut self) -> Result<(), AssetIoError> {
        match self.inner.take() {
            Some(mut pager) => pager.close(&self.manager.host),
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl Drop for EntityReferencePager {
    fn drop(&mut self) {
        let Some(mut pager) = self.inner.take() else {
            return;
        };
        let host = &self.manager.host;
        let manager = guarded_identifier(self.manager.interface.as_ref());
        match panic::catch_unwind(AssertUnwindSafe(|| pager.close(host))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(manager = %manager, error = %e, "failed to close entity reference pager");
            }
            Err(payload) => {
                tracing::error!(
                    manager = %manager,
                    panic = %panic_message(payload.as_ref()),
                    "entity reference pager panicked while closing"
                );
            }
        }
    }
}

impl fmt::Debug for EntityReferencePager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityReferencePager")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
