// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of plugin packages and compiled-in entry points.
//!
//! A package is a directory containing `plugin.toml`, or a single `*.toml`
//! manifest file, whose manifest points at the native library implementing
//! it. Once the search paths are exhausted, providers advertised through
//! [`submit_entry_point!`](crate::submit_entry_point) under the configured
//! group are registered too, with the same first-wins precedence.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use assetio_core::{AssetIoError, PluginProvider};

use crate::bound::BoundProvider;
use crate::entry_point::{DEFAULT_ENTRY_POINT_GROUP, entry_points};
use crate::error::PluginError;
use crate::library::LibraryManager;
use crate::loader::{SourceLoader, directory_entries, disabled_by_env, guarded, register_provider};
use crate::manifest::{MANIFEST_FILE_NAME, PluginManifest, read_plugin_manifest};
use crate::native::load_binary;
use crate::registry::{Origin, SharedRegistry};

/// Environment variable that turns entry point discovery off when set to
/// anything non-empty other than `0`.
pub const DISABLE_ENTRY_POINTS_VAR: &str = "ASSETIO_DISABLE_ENTRY_POINTS_PLUGINS";

/// Scans search paths for plugin packages, then compiled-in entry points.
pub struct PackageSourceLoader {
    libraries: Arc<LibraryManager>,
    registry: SharedRegistry,
    manifests: Mutex<HashMap<String, PluginManifest>>,
    include_entry_points: bool,
    entry_point_group: String,
    disable_var: String,
}

impl PackageSourceLoader {
    pub fn new() -> Self {
        Self::with_library_manager(LibraryManager::global())
    }

    pub fn with_library_manager(libraries: Arc<LibraryManager>) -> Self {
        Self {
            libraries,
            registry: SharedRegistry::new(),
            manifests: Mutex::new(HashMap::new()),
            include_entry_points: true,
            entry_point_group: DEFAULT_ENTRY_POINT_GROUP.to_string(),
            disable_var: DISABLE_ENTRY_POINTS_VAR.to_string(),
        }
    }

    pub fn with_entry_points(mut self, include: bool) -> Self {
        self.include_entry_points = include;
        self
    }

    pub fn with_entry_point_group(mut self, group: impl Into<String>) -> Self {
        self.entry_point_group = group.into();
        self
    }

    pub fn with_disable_var(mut self, name: impl Into<String>) -> Self {
        self.disable_var = name.into();
        self
    }

    pub fn entry_point_group(&self) -> &str {
        &self.entry_point_group
    }

    /// Whether entry points are scanned, taking the disable variable into
    /// account at the time of the call.
    pub fn entry_points_enabled(&self) -> bool {
        self.include_entry_points && !disabled_by_env(&self.disable_var)
    }

    /// Manifest of the package registered under `identifier`, if it came
    /// from a package rather than an entry point.
    pub fn manifest(&self, identifier: &str) -> Option<PluginManifest> {
        self.lock_manifests().get(identifier).cloned()
    }

    fn lock_manifests(&self) -> MutexGuard<'_, HashMap<String, PluginManifest>> {
        self.manifests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the package described by `manifest_path` without registering it.
    pub fn load(&self, manifest_path: &Path) -> Result<(PluginManifest, BoundProvider), PluginError> {
        let manifest = read_plugin_manifest(manifest_path)?;
        manifest.check_supported(manifest_path)?;

        let provider = load_binary(&self.libraries, &manifest.library, manifest.symbol.as_deref())?;
        let origin = Origin::Binary(provider.library().path().to_path_buf());
        let actual = guarded(&origin, || provider.identifier())?;
        if actual != manifest.identifier {
            return Err(PluginError::IdentifierMismatch {
                path: manifest_path.to_path_buf(),
                declared: manifest.identifier,
                actual,
            });
        }
        Ok((manifest, provider))
    }

    /// The manifest path for a search path entry, if it is a package.
    fn manifest_path(entry: &Path) -> Option<PathBuf> {
        if entry.is_dir() {
            let manifest = entry.join(MANIFEST_FILE_NAME);
            return manifest.is_file().then_some(manifest);
        }
        let is_toml = entry.extension().is_some_and(|ext| ext == "toml");
        (entry.is_file() && is_toml).then(|| entry.to_path_buf())
    }

    fn scan_paths(&self, paths: &[PathBuf]) {
        let loader = self.kind();
        let mut visited = HashSet::new();
        for dir in paths {
            tracing::debug!(loader, path = %dir.display(), "searching for plugin packages");
            let Some(entries) = directory_entries(dir, &mut visited, loader) else {
                continue;
            };

            for entry in entries {
                let Some(manifest_path) = Self::manifest_path(&entry) else {
                    tracing::debug!(loader, path = %entry.display(), "skipping: not a package");
                    continue;
                };
                let manifest_path = manifest_path.canonicalize().unwrap_or(manifest_path);

                let (manifest, provider) = match self.load(&manifest_path) {
                    Ok(loaded) => loaded,
                    Err(e) => {
                        tracing::warn!(loader, path = %manifest_path.display(), error = %e, "failed to load plugin package");
                        continue;
                    }
                };

                let origin = Origin::Package(manifest_path.clone());
                match register_provider(&self.registry, Arc::new(provider), origin) {
                    Ok(Some(identifier)) => {
                        self.lock_manifests().insert(identifier, manifest);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(loader, path = %manifest_path.display(), error = %e, "failed to register plugin package");
                    }
                }
            }
        }
    }

    fn scan_entry_points(&self) {
        let loader = self.kind();
        if !self.entry_points_enabled() {
            tracing::debug!(loader, group = %self.entry_point_group, "entry point plugins disabled");
            return;
        }

        tracing::debug!(loader, group = %self.entry_point_group, "searching for entry point plugins");
        for entry in entry_points(&self.entry_point_group) {
            let origin = Origin::EntryPoint {
                group: entry.group.to_string(),
                name: entry.name.to_string(),
            };
            let registered = guarded(&origin, entry.provider)
                .and_then(|provider| register_provider(&self.registry, provider, origin.clone()));
            if let Err(e) = registered {
                tracing::warn!(loader, %origin, error = %e, "failed to load entry point plugin");
            }
        }
    }
}

impl Default for PackageSourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader for PackageSourceLoader {
    fn kind(&self) -> &'static str {
        "package"
    }

    fn scan(&self, paths: &[PathBuf]) {
        self.scan_paths(paths);
        self.scan_entry_points();
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
        self.lock_manifests().clear();
        self.registry.reset();
    }
}
