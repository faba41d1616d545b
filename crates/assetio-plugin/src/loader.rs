// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The common contract of every discovery mechanism, plus the scan helpers
//! loaders share.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetio_core::{AssetIoError, PluginProvider};

use crate::error::PluginError;
use crate::library::panic_message;
use crate::registry::{Origin, SharedRegistry};

/// A discovery mechanism for plugin providers.
///
/// Each loader owns its own registry. `scan` adds to it and never clears
/// it; `reset` empties it so the next scan starts afresh. Providers already
/// handed out by `plugin` stay valid across a reset.
pub trait SourceLoader: Send + Sync {
    /// Short name of the mechanism, used in diagnostics.
    fn kind(&self) -> &'static str;

    /// Walks `paths` left to right, registering every plugin found. Units
    /// that fail to load are logged and skipped.
    fn scan(&self, paths: &[PathBuf]);

    /// Registered identifiers, in discovery order.
    fn identifiers(&self) -> Vec<String>;

    fn plugin(&self, identifier: &str) -> Result<Arc<dyn PluginProvider>, AssetIoError>;

    /// Where the provider registered under `identifier` was found.
    fn origin(&self, identifier: &str) -> Option<Origin>;

    fn reset(&self);
}

/// Runs plugin code, turning a panic into a load failure for `origin`.
pub(crate) fn guarded<T>(origin: &Origin, f: impl FnOnce() -> T) -> Result<T, PluginError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| PluginError::Panicked {
        origin: origin.to_string(),
        message: panic_message(payload.as_ref()),
    })
}

/// Queries the provider's identifier and registers it.
///
/// Returns the registered identifier, or `None` if an earlier registration
/// holds it. The identifier is fetched before the registry lock is taken.
pub(crate) fn register_provider(
    registry: &SharedRegistry,
    provider: Arc<dyn PluginProvider>,
    origin: Origin,
) -> Result<Option<String>, PluginError> {
    let identifier = guarded(&origin, || provider.identifier())?;
    if identifier.is_empty() {
        return Err(PluginError::EmptyIdentifier {
            origin: origin.to_string(),
        });
    }
    let registered = registry.register(identifier.clone(), provider, origin);
    Ok(registered.then_some(identifier))
}

/// The entries of one search path directory, sorted by file name.
///
/// Returns `None`, after logging why, if `dir` is not a directory or was
/// already visited in this scan under any path that canonicalizes the same.
pub(crate) fn directory_entries(
    dir: &Path,
    visited: &mut HashSet<PathBuf>,
    loader: &'static str,
) -> Option<Vec<PathBuf>> {
    if !dir.is_dir() {
        tracing::debug!(loader, path = %dir.display(), "skipping search path: not a directory");
        return None;
    }

    let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    if !visited.insert(canonical.clone()) {
        tracing::debug!(
            loader,
            path = %dir.display(),
            canonical = %canonical.display(),
            "skipping search path: already scanned"
        );
        return None;
    }

    let read = match std::fs::read_dir(&canonical) {
        Ok(read) => read,
        Err(e) => {
            tracing::warn!(loader, path = %canonical.display(), error = %e, "cannot read search path");
            return None;
        }
    };

    let mut entries: Vec<PathBuf> = read.filter_map(|entry| entry.ok().map(|e| e.path())).collect();
    entries.sort();
    Some(entries)
}

/// Whether the disable variable `name` is set to a value that turns a
/// discovery source off: anything non-empty other than `0`.
pub(crate) fn disabled_by_env(name: &str) -> bool {
    match std::env::var(name) {
        Ok(value) => !value.is_empty() && value != "0",
        Err(_) => false,
    }
}
