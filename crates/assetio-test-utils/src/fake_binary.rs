// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process stand-ins for native plugin binaries.
//!
//! `FakeBinaryOpener` implements [`BinaryOpener`] over files that exist on
//! disk but hold no code: the declarations they "export" are registered in
//! memory. Opens and unloads are counted per canonical path so tests can
//! observe the library lifetime rules.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use assetio_core::PluginDeclaration;
use assetio_core::declaration::PLUGIN_ENTRY_SYMBOL;
use assetio_plugin::{BinaryOpener, NativeBinary, PluginError};

#[derive(Clone)]
enum Behaviour {
    Exports(Vec<(String, PluginDeclaration)>),
    Panics(String),
}

#[derive(Debug, Default)]
struct Counters {
    opens: HashMap<PathBuf, usize>,
    unloads: HashMap<PathBuf, usize>,
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serves plugin declarations for registered paths.
#[derive(Default)]
pub struct FakeBinaryOpener {
    binaries: Mutex<HashMap<PathBuf, Behaviour>>,
    counters: Arc<Mutex<Counters>>,
}

impl FakeBinaryOpener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `path` exports `declaration` under the standard entry symbol.
    pub fn insert(&self, path: &Path, declaration: PluginDeclaration) {
        self.insert_with_symbol(path, PLUGIN_ENTRY_SYMBOL, declaration);
    }

    pub fn insert_with_symbol(&self, path: &Path, symbol: &str, declaration: PluginDeclaration) {
        lock(&self.binaries).insert(
            canonical(path),
            Behaviour::Exports(vec![(symbol.to_string(), declaration)]),
        );
    }

    /// `path` opens but exports nothing.
    pub fn insert_empty(&self, path: &Path) {
        lock(&self.binaries).insert(canonical(path), Behaviour::Exports(Vec::new()));
    }

    /// Opening `path` panics, as a library initializer might.
    pub fn insert_panicking(&self, path: &Path, message: &str) {
        lock(&self.binaries).insert(canonical(path), Behaviour::Panics(message.to_string()));
    }

    pub fn open_count(&self, path: &Path) -> usize {
        lock(&self.counters).opens.get(&canonical(path)).copied().unwrap_or(0)
    }

    pub fn unload_count(&self, path: &Path) -> usize {
        lock(&self.counters).unloads.get(&canonical(path)).copied().unwrap_or(0)
    }
}

impl BinaryOpener for FakeBinaryOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn NativeBinary>, PluginError> {
        let behaviour = lock(&self.binaries).get(path).cloned();
        match behaviour {
            Some(Behaviour::Exports(exports)) => {
                *lock(&self.counters).opens.entry(path.to_path_buf()).or_default() += 1;
                Ok(Box::new(FakeBinary {
                    path: path.to_path_buf(),
                    exports,
                    counters: self.counters.clone(),
                }))
            }
            Some(Behaviour::Panics(message)) => panic!("{message}"),
            None => Err(PluginError::OpenFailed {
                path: path.to_path_buf(),
                message: "invalid ELF header".to_string(),
            }),
        }
    }
}

/// A "loaded" fake binary. Dropping it counts as an unload.
pub struct FakeBinary {
    path: PathBuf,
    exports: Vec<(String, PluginDeclaration)>,
    counters: Arc<Mutex<Counters>>,
}

impl NativeBinary for FakeBinary {
    fn declaration(&self, symbol: &str) -> Option<PluginDeclaration> {
        self.exports
            .iter()
            .find(|(name, _)| name == symbol)
            .map(|(_, declaration)| *declaration)
    }
}

impl Drop for FakeBinary {
    fn drop(&mut self) {
        *lock(&self.counters).unloads.entry(self.path.clone()).or_default() += 1;
    }
}

/// Creates an empty file named `{stem}.{DLL_EXTENSION}` in `dir`.
pub fn write_binary(dir: &Path, stem: &str) -> PathBuf {
    let path = dir.join(format!("{stem}.{}", std::env::consts::DLL_EXTENSION));
    if let Err(e) = std::fs::write(&path, b"") {
        panic!("cannot create {}: {e}", path.display());
    }
    path
}
