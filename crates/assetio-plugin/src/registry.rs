// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry owned by a single source loader.
//!
//! The `PluginRegistry` maps identifiers to `PluginEntry` records in
//! discovery order. The first registration of an identifier wins; later
//! attempts are logged and handed back to the caller, so precedence is
//! decided purely by the order loaders scan their search paths.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use assetio_core::{AssetIoError, PluginProvider};

/// Where a registered plugin came from. Used for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A native binary found on a search path (canonical path).
    Binary(PathBuf),
    /// A package manifest found on a search path (canonical path).
    Package(PathBuf),
    /// A compiled-in entry point.
    EntryPoint { group: String, name: String },
    /// Registered programmatically.
    Static(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Binary(path) => write!(f, "binary '{}'", path.display()),
            Origin::Package(path) => write!(f, "package '{}'", path.display()),
            Origin::EntryPoint { group, name } => {
                write!(f, "entry point '{name}' in group '{group}'")
            }
            Origin::Static(label) => write!(f, "'{label}'"),
        }
    }
}

/// A single entry in the plugin registry.
#[derive(Clone)]
pub struct PluginEntry {
    pub provider: Arc<dyn PluginProvider>,
    pub origin: Origin,
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Registry of discovered plugins, keyed by identifier.
#[derive(Default)]
pub struct PluginRegistry {
    order: Vec<String>,
    entries: HashMap<String, PluginEntry>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under `identifier`.
    ///
    /// The identifier is passed in rather than queried so callers can ask
    /// the provider before taking any lock. If the identifier is already
    /// taken the entry is handed back unchanged and the existing one kept.
    pub fn register(
        &mut self,
        identifier: String,
        provider: Arc<dyn PluginProvider>,
        origin: Origin,
    ) -> Option<PluginEntry> {
        if let Some(existing) = self.entries.get(&identifier) {
            tracing::debug!(
                identifier = %identifier,
                origin = %origin,
                existing = %existing.origin,
                "skipping '{identifier}' from {origin} as it has already been registered by {}",
                existing.origin
            );
            return Some(PluginEntry { provider, origin });
        }

        tracing::debug!(identifier = %identifier, origin = %origin, "registered plugin");
        self.order.push(identifier.clone());
        self.entries.insert(identifier, PluginEntry { provider, origin });
        None
    }

    /// Identifiers in registration order.
    pub fn identifiers(&self) -> Vec<String> {
        self.order.clone()
    }

    /// The provider registered under `identifier`.
    pub fn plugin(&self, identifier: &str) -> Result<Arc<dyn PluginProvider>, AssetIoError> {
        self.entries
            .get(identifier)
            .map(|entry| entry.provider.clone())
            .ok_or_else(|| AssetIoError::plugin_not_found(identifier))
    }

    pub fn get(&self, identifier: &str) -> Option<&PluginEntry> {
        self.entries.get(identifier)
    }

    pub fn origin(&self, identifier: &str) -> Option<&Origin> {
        self.entries.get(identifier).map(|entry| &entry.origin)
    }

    /// Removes every entry, returning them so the caller decides where they
    /// are dropped. Providers already handed out stay valid.
    pub fn reset(&mut self) -> Vec<PluginEntry> {
        self.order.clear();
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A registry behind a mutex, as held by a source loader.
///
/// Every accessor copies what it needs out of the registry before returning,
/// so the lock is never held while plugin code runs. Rejected and reset
/// entries are dropped after the lock is released, since dropping a provider
/// may run plugin code or unload a binary.
#[derive(Default)]
pub struct SharedRegistry {
    inner: Mutex<PluginRegistry>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PluginRegistry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if the provider was registered.
    pub fn register(
        &self,
        identifier: String,
        provider: Arc<dyn PluginProvider>,
        origin: Origin,
    ) -> bool {
        let rejected = self.lock().register(identifier, provider, origin);
        rejected.is_none()
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.lock().identifiers()
    }

    pub fn plugin(&self, identifier: &str) -> Result<Arc<dyn PluginProvider>, AssetIoError> {
        self.lock().plugin(identifier)
    }

    pub fn origin(&self, identifier: &str) -> Option<Origin> {
        self.lock().origin(identifier).cloned()
    }

    pub fn entries(&self) -> Vec<(String, PluginEntry)> {
        let registry = self.lock();
        registry
            .order
            .iter()
            .filter_map(|id| registry.entries.get(id).map(|e| (id.clone(), e.clone())))
            .collect()
    }

    pub fn reset(&self) {
        let dropped = self.lock().reset();
        drop(dropped);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubProvider;
    use tracing_test::traced_test;

    fn provider(identifier: &str, tag: &str) -> Arc<dyn PluginProvider> {
        Arc::new(StubProvider::new(identifier, tag))
    }

    #[test]
    fn register_and_get_roundtrip() {
        let mut registry = PluginRegistry::new();
        let rejected = registry.register(
            "org.example".into(),
            provider("org.example", "a"),
            Origin::Static("a".into()),
        );
        assert!(rejected.is_none());

        let found = registry.plugin("org.example").unwrap();
        assert_eq!(found.identifier(), "org.example");
        assert_eq!(registry.origin("org.example"), Some(&Origin::Static("a".into())));
    }

    #[test]
    #[traced_test]
    fn first_registration_wins() {
        let mut registry = PluginRegistry::new();
        registry.register(
            "org.example".into(),
            provider("org.example", "first"),
            Origin::Binary("/a/libx.so".into()),
        );
        let rejected = registry.register(
            "org.example".into(),
            provider("org.example", "second"),
            Origin::Binary("/b/libx.so".into()),
        );

        assert_eq!(rejected.unwrap().origin, Origin::Binary("/b/libx.so".into()));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.origin("org.example"),
            Some(&Origin::Binary("/a/libx.so".into()))
        );
        assert!(logs_contain("has already been registered by binary '/a/libx.so'"));
    }

    #[test]
    fn identifiers_keep_registration_order() {
        let mut registry = PluginRegistry::new();
        for id in ["zebra", "alpha", "middle"] {
            registry.register(id.into(), provider(id, id), Origin::Static(id.into()));
        }
        assert_eq!(registry.identifiers(), vec!["zebra", "alpha", "middle"]);
    }

    #[test]
    fn plugin_returns_not_found_for_unknown_identifier() {
        let registry = PluginRegistry::new();
        let err = registry.plugin("nonexistent").err().unwrap();
        assert!(matches!(err, AssetIoError::NotFound { .. }));
    }

    #[test]
    fn reset_keeps_handed_out_providers_valid() {
        let shared = SharedRegistry::new();
        shared.register("org.example".into(), provider("org.example", "a"), Origin::Static("a".into()));
        let held = shared.plugin("org.example").unwrap();

        shared.reset();

        assert!(shared.is_empty());
        assert!(shared.identifiers().is_empty());
        assert_eq!(held.identifier(), "org.example");
        assert!(held.create_manager().is_ok());
    }

    #[test]
    fn shared_entries_follow_registration_order() {
        let shared = SharedRegistry::new();
        shared.register("b".into(), provider("b", "b"), Origin::Static("b".into()));
        shared.register("a".into(), provider("a", "a"), Origin::Static("a".into()));
        assert!(!shared.register("b".into(), provider("b", "dup"), Origin::Static("dup".into())));
        let ids: Vec<String> = shared.entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(shared.len(), 2);
    }
}
