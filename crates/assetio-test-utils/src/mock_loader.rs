// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A source loader over an in-memory map of search paths.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use assetio_core::{AssetIoError, PluginProvider};
use assetio_plugin::{Origin, SharedRegistry, SourceLoader};

/// Registers the providers mapped to each scanned path, in path order.
#[derive(Default)]
pub struct MockSourceLoader {
    paths: Mutex<HashMap<PathBuf, Vec<Arc<dyn PluginProvider>>>>,
    registry: SharedRegistry,
    scans: AtomicUsize,
}

impl MockSourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `providers` discoverable under `path`.
    pub fn with_path(self, path: impl Into<PathBuf>, providers: Vec<Arc<dyn PluginProvider>>) -> Self {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), providers);
        self
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl SourceLoader for MockSourceLoader {
    fn kind(&self) -> &'static str {
        "mock"
    }

    fn scan(&self, paths: &[PathBuf]) {
        self.scans.fetch_add(1, Ordering::SeqCst);
        for path in paths {
            let providers = self
                .paths
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(path)
                .cloned()
                .unwrap_or_default();
            for provider in providers {
                let identifier = provider.identifier();
                self.registry.register(
                    identifier,
                    provider,
                    Origin::Static(path.display().to_string()),
                );
            }
        }
    }

    fn identifiers(&self) -> Vec<String> {
        self.registry.identifiers()
    }

    fn plugin(&self, identifier: &str) -> Result<Arc<dyn PluginProvider>, AssetIoError> {
        self.registry.plugin(identifier)
    }

    fn origin(&self, identifier: &str) -> Option<Origin> {
        self.registry.origin(identifier)
    }

    fn reset(&self) {
        self.registry.reset();
    }
}
