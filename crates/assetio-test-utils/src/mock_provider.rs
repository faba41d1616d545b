// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock plugin provider producing [`MockManager`]s.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assetio_core::{AssetIoError, ManagerInterface, PluginProvider};

use crate::mock_manager::MockManager;

/// A provider whose managers are clones of a template [`MockManager`].
///
/// The `tag` becomes the managers' display name, so tests can tell apart
/// providers that share an identifier.
pub struct MockProvider {
    identifier: String,
    template: MockManager,
    created: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(identifier: &str, tag: &str) -> Self {
        Self::with_manager(
            MockManager::new()
                .with_identifier(identifier)
                .with_display_name(tag),
        )
    }

    /// A provider for `template`, advertising the template's identifier.
    pub fn with_manager(template: MockManager) -> Self {
        Self {
            identifier: template.identifier(),
            template,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared so it can be read after the provider is handed to a registry.
    pub fn created_counter(&self) -> Arc<AtomicUsize> {
        self.created.clone()
    }

    pub fn template(&self) -> &MockManager {
        &self.template
    }

    pub fn into_arc(self) -> Arc<dyn PluginProvider> {
        Arc::new(self)
    }
}

impl PluginProvider for MockProvider {
    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn create_manager(&self) -> Result<Box<dyn ManagerInterface>, AssetIoError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.template.clone()))
    }
}
