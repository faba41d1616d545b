// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of plugins compiled as native shared libraries.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetio_core::declaration::{LEGACY_PLUGIN_ENTRY_SYMBOL, PLUGIN_ABI_VERSION, PLUGIN_ENTRY_SYMBOL};
use assetio_core::{AssetIoError, CORE_VERSION, PluginProvider};

use crate::bound::BoundProvider;
use crate::error::PluginError;
use crate::library::{LibraryHandle, LibraryManager};
use crate::loader::{SourceLoader, directory_entries, guarded, register_provider};
use crate::registry::{Origin, SharedRegistry};

/// Opens the binary at `path` and instantiates the provider it declares.
///
/// With no `symbol`, the standard entry symbol is tried first, then the
/// legacy one. The returned provider keeps the binary loaded.
pub(crate) fn load_binary(
    libraries: &LibraryManager,
    path: &Path,
    symbol: Option<&str>,
) -> Result<BoundProvider, PluginError> {
    let handle = libraries.open(path)?;
    let declaration = match symbol {
        Some(symbol) => handle
            .declaration(symbol)
            .ok_or_else(|| missing(&handle, symbol))?,
        None => match handle.declaration(PLUGIN_ENTRY_SYMBOL) {
            Some(declaration) => declaration,
            None => {
                let declaration = handle
                    .declaration(LEGACY_PLUGIN_ENTRY_SYMBOL)
                    .ok_or_else(|| missing(&handle, PLUGIN_ENTRY_SYMBOL))?;
                tracing::warn!(
                    path = %handle.path().display(),
                    "'{LEGACY_PLUGIN_ENTRY_SYMBOL}' is deprecated, export '{PLUGIN_ENTRY_SYMBOL}' instead"
                );
                declaration
            }
        },
    };

    if !declaration.is_compatible() {
        return Err(PluginError::Incompatible {
            path: handle.path().to_path_buf(),
            abi_version: declaration.abi_version,
            core_version: declaration.core_version.to_string(),
            expected_abi: PLUGIN_ABI_VERSION,
            expected_core: CORE_VERSION.to_string(),
        });
    }

    let origin = Origin::Binary(handle.path().to_path_buf());
    let provider = guarded(&origin, declaration.provider)?;
    Ok(BoundProvider::new(provider, handle))
}

fn missing(handle: &LibraryHandle, symbol: &str) -> PluginError {
    PluginError::MissingEntryPoint {
        path: handle.path().to_path_buf(),
        symbol: symbol.to_string(),
    }
}

/// Scans search paths for shared libraries exporting a plugin declaration.
pub struct NativeSourceLoader {
    libraries: Arc<LibraryManager>,
    registry: SharedRegistry,
}

impl NativeSourceLoader {
    /// A loader sharing the process-wide [`LibraryManager`].
    pub fn new() -> Self {
        Self::with_library_manager(LibraryManager::global())
    }

    pub fn with_library_manager(libraries: Arc<LibraryManager>) -> Self {
        Self {
            libraries,
            registry: SharedRegistry::new(),
        }
    }

    pub fn library_manager(&self) -> &Arc<LibraryManager> {
        &self.libraries
    }

    /// Loads a single binary without registering it.
    pub fn load(&self, path: &Path) -> Result<BoundProvider, PluginError> {
        load_binary(&self.libraries, path, None)
    }

    fn is_candidate(path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == std::env::consts::DLL_EXTENSION)
    }
}

impl Default for NativeSourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader for NativeSourceLoader {
    fn kind(&self) -> &'static str {
        "native"
    }

    fn scan(&self, paths: &[PathBuf]) {
        let loader = self.kind();
        let mut visited = HashSet::new();
        for dir in paths {
            tracing::debug!(loader, path = %dir.display(), "searching for native plugins");
            let Some(entries) = directory_entries(dir, &mut visited, loader) else {
                continue;
            };

            for path in entries {
                if !Self::is_candidate(&path) {
                    tracing::debug!(
                        loader,
                        path = %path.display(),
                        "skipping: not a .{} file",
                        std::env::consts::DLL_EXTENSION
                    );
                    continue;
                }

                let provider = match self.load(&path) {
                    Ok(provider) => provider,
                    Err(e) => {
                        tracing::warn!(loader, path = %path.display(), error = %e, "failed to load plugin");
                        continue;
                    }
                };

                let origin = Origin::Binary(provider.library().path().to_path_buf());
                if let Err(e) = register_provider(&self.registry, Arc::new(provider), origin) {
                    tracing::warn!(loader, path = %path.display(), error = %e, "failed to register plugin");
                }
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
