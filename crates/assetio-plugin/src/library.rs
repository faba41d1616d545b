// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native library lifetime management.
//!
//! [`LibraryManager`] opens each binary at most once per canonical path and
//! hands out reference-counted [`LibraryHandle`]s. Registries hold handles
//! through the providers they store, and every manager, pager and state
//! object produced from a binary holds one too, so a binary is unloaded
//! exactly when the last of those is dropped.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};

use assetio_core::PluginDeclaration;
use libloading::{Library, Symbol};

use crate::error::PluginError;

/// An opened binary from which plugin declarations can be read.
pub trait NativeBinary: Send + Sync {
    /// The declaration exported under `symbol`, if any.
    fn declaration(&self, symbol: &str) -> Option<PluginDeclaration>;
}

/// Opens binaries. Swappable so tests can stand in for real shared libraries.
pub trait BinaryOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn NativeBinary>, PluginError>;
}

/// Opens shared libraries with `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibOpener;

struct Dylib {
    library: Library,
}

impl NativeBinary for Dylib {
    fn declaration(&self, symbol: &str) -> Option<PluginDeclaration> {
        let name = format!("{symbol}\0");
        // SAFETY: the symbol is looked up as a data address. Plugins export a
        // `PluginDeclaration` static under this name via `export_plugin!`;
        // the copy is only used while this library stays loaded, because it
        // is always held next to the handle that owns the library.
        unsafe {
            let address: Symbol<*const PluginDeclaration> = self.library.get(name.as_bytes()).ok()?;
            let pointer = *address;
            if pointer.is_null() {
                return None;
            }
            Some(*pointer)
        }
    }
}

impl BinaryOpener for DylibOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn NativeBinary>, PluginError> {
        // SAFETY: loading a library runs its initializers. Plugin search
        // paths are trusted configuration.
        let library = unsafe { Library::new(path) }.map_err(|e| PluginError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Box::new(Dylib { library }))
    }
}

/// A loaded binary. Unloaded when dropped.
pub struct LoadedLibrary {
    path: PathBuf,
    binary: Box<dyn NativeBinary>,
}

impl Drop for LoadedLibrary {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "unloading native plugin binary");
    }
}

/// A reference to a loaded binary. The binary stays loaded while any clone
/// of any handle to it is alive.
#[derive(Clone)]
pub struct LibraryHandle {
    library: Arc<LoadedLibrary>,
}

impl LibraryHandle {
    /// Canonical path of the binary.
    pub fn path(&self) -> &Path {
        &self.library.path
    }

    pub fn declaration(&self, symbol: &str) -> Option<PluginDeclaration> {
        self.library.binary.declaration(symbol)
    }

    /// Releases this reference.
    pub fn close(self) {
        drop(self);
    }

    /// An opaque keep-alive for objects that must not outlive the binary.
    pub fn anchor(&self) -> Arc<dyn Any + Send + Sync> {
        self.library.clone()
    }

    /// Number of live references to the binary, including this one.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.library)
    }
}

impl fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("path", &self.library.path)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

static GLOBAL: LazyLock<Arc<LibraryManager>> =
    LazyLock::new(|| Arc::new(LibraryManager::new(Arc::new(DylibOpener))));

/// Reference-counting table of opened binaries, keyed by canonical path.
pub struct LibraryManager {
    opener: Arc<dyn BinaryOpener>,
    libraries: Mutex<HashMap<PathBuf, Weak<LoadedLibrary>>>,
}

impl LibraryManager {
    pub fn new(opener: Arc<dyn BinaryOpener>) -> Self {
        Self {
            opener,
            libraries: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide manager shared by loaders that are not given one.
    pub fn global() -> Arc<LibraryManager> {
        GLOBAL.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Weak<LoadedLibrary>>> {
        self.libraries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the binary at `path`, or takes another reference to it if it is
    /// already loaded under the same canonical path.
    pub fn open(&self, path: &Path) -> Result<LibraryHandle, PluginError> {
        let canonical = path.canonicalize().map_err(|e| PluginError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Some(library) = self.lock().get(&canonical).and_then(Weak::upgrade) {
            tracing::debug!(path = %canonical.display(), "reusing loaded native plugin binary");
            return Ok(LibraryHandle { library });
        }

        // Opening runs the binary's initializers, so no lock is held here.
        let opened = panic::catch_unwind(AssertUnwindSafe(|| self.opener.open(&canonical)))
            .map_err(|payload| PluginError::Panicked {
                origin: format!("binary '{}'", canonical.display()),
                message: panic_message(payload.as_ref()),
            })??;

        let fresh = Arc::new(LoadedLibrary {
            path: canonical.clone(),
            binary: opened,
        });

        let (library, loser) = {
            let mut libraries = self.lock();
            libraries.retain(|_, weak| weak.strong_count() > 0);
            match libraries.get(&canonical).and_then(Weak::upgrade) {
                // Another thread opened it meanwhile; keep theirs.
                Some(existing) => (existing, Some(fresh)),
                None => {
                    libraries.insert(canonical.clone(), Arc::downgrade(&fresh));
                    (fresh, None)
                }
            }
        };
        drop(loser);

        tracing::debug!(path = %canonical.display(), "opened native plugin binary");
        Ok(LibraryHandle { library })
    }

    /// Number of live references to the binary at `path`; zero when unloaded.
    pub fn ref_count(&self, path: &Path) -> usize {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.lock().get(&key).map(Weak::strong_count).unwrap_or(0)
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.ref_count(path) > 0
    }

    /// Canonical paths of every binary currently loaded.
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .lock()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }
}

impl fmt::Debug for LibraryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryManager")
            .field("loaded", &self.loaded_paths())
            .finish_non_exhaustive()
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
