// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Implementation factories: the host-facing view of plugin discovery.

use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use assetio_core::{AssetIoError, ManagerInterface};

use crate::loader::SourceLoader;
use crate::registry::Origin;

/// Default environment variable holding the plugin search path.
pub const DEFAULT_SEARCH_PATH_VAR: &str = "ASSETIO_PLUGIN_PATH";

/// Produces manager implementations by identifier.
pub trait ManagerImplementationFactory: Send + Sync {
    /// Identifiers of every implementation this factory can produce.
    fn identifiers(&self) -> Result<Vec<String>, AssetIoError>;

    /// A new, uninitialized implementation. Never cached.
    fn instantiate(&self, identifier: &str) -> Result<Box<dyn ManagerInterface>, AssetIoError>;

    /// Where the implementation registered under `identifier` was found.
    fn origin(&self, _identifier: &str) -> Option<Origin> {
        None
    }
}

/// Where a factory looks for plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPaths {
    Explicit(Vec<PathBuf>),
    /// Split from the named environment variable at scan time.
    EnvVar(String),
}

impl Default for SearchPaths {
    fn default() -> Self {
        SearchPaths::EnvVar(DEFAULT_SEARCH_PATH_VAR.to_string())
    }
}

impl SearchPaths {
    pub fn resolve(&self) -> Vec<PathBuf> {
        match self {
            SearchPaths::Explicit(paths) => paths.clone(),
            SearchPaths::EnvVar(name) => match env::var_os(name) {
                Some(value) => env::split_paths(&value)
                    .filter(|path| !path.as_os_str().is_empty())
                    .collect(),
                None => {
                    tracing::warn!(
                        var = %name,
                        "no plugin search paths specified, no plugins will load; check ${name} is set"
                    );
                    Vec::new()
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    Scanning(ThreadId),
    Resetting,
    Done,
}

/// Runs a scan at most once until reset. Threads arriving mid-scan or
/// mid-reset wait for it; a re-entrant call from the scanning thread returns
/// immediately. Scans and resets never overlap.
#[derive(Debug)]
struct ScanGate {
    state: Mutex<ScanState>,
    finished: Condvar,
}

impl ScanGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(ScanState::Idle),
            finished: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScanState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run(&self, scan: impl FnOnce()) {
        let me = thread::current().id();
        {
            let mut state = self.lock();
            loop {
                match *state {
                    ScanState::Done => return,
                    ScanState::Scanning(owner) if owner == me => return,
                    ScanState::Scanning(_) | ScanState::Resetting => {
                        state = self
                            .finished
                            .wait(state)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    ScanState::Idle => break,
                }
            }
            *state = ScanState::Scanning(me);
        }

        // The scan runs plugin code, so the gate lock is not held here.
        let outcome = panic::catch_unwind(AssertUnwindSafe(scan));

        *self.lock() = match outcome {
            Ok(()) => ScanState::Done,
            Err(_) => ScanState::Idle,
        };
        self.finished.notify_all();
        if let Err(payload) = outcome {
            panic::resume_unwind(payload);
        }
    }

    /// Waits out any scan or reset in flight, then runs `clear` with no
    /// scan able to start until it returns.
    fn reset(&self, clear: impl FnOnce()) {
        let me = thread::current().id();
        {
            let mut state = self.lock();
            loop {
                match *state {
                    // Reset from inside the scan itself: the scan will
                    // still mark the gate done when it returns.
                    ScanState::Scanning(owner) if owner == me => {
                        drop(state);
                        clear();
                        return;
                    }
                    ScanState::Scanning(_) | ScanState::Resetting => {
                        state = self
                            .finished
                            .wait(state)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    ScanState::Idle | ScanState::Done => break,
                }
            }
            *state = ScanState::Resetting;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(clear));

        *self.lock() = ScanState::Idle;
        self.finished.notify_all();
        if let Err(payload) = outcome {
            panic::resume_unwind(payload);
        }
    }
}

/// A factory backed by one [`SourceLoader`]. Scans lazily on first use.
pub struct PluginImplementationFactory<L: SourceLoader> {
    loader: L,
    search_paths: SearchPaths,
    gate: ScanGate,
}

impl<L: SourceLoader> PluginImplementationFactory<L> {
    pub fn new(loader: L, search_paths: SearchPaths) -> Self {
        Self {
            loader,
            search_paths,
            gate: ScanGate::new(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    fn scan_if_needed(&self) {
        self.gate.run(|| {
            let paths = self.search_paths.resolve();
            tracing::debug!(
                loader = self.loader.kind(),
                paths = ?paths,
                "scanning for plugins"
            );
            self.loader.scan(&paths);
        });
    }

    /// Forgets everything discovered so far; the next query rescans.
    pub fn reset(&self) {
        self.gate.reset(|| self.loader.reset());
    }
}

impl<L: SourceLoader> ManagerImplementationFactory for PluginImplementationFactory<L> {
    fn identifiers(&self) -> Result<Vec<String>, AssetIoError> {
        self.scan_if_needed();
        Ok(self.loader.identifiers())
    }

    fn instantiate(&self, identifier: &str) -> Result<Box<dyn ManagerInterface>, AssetIoError> {
        self.scan_if_needed();
        let provider = self.loader.plugin(identifier)?;
        tracing::debug!(loader = self.loader.kind(), identifier, "instantiating manager");
        provider.create_manager()
    }

    fn origin(&self, identifier: &str) -> Option<Origin> {
        self.scan_if_needed();
        self.loader.origin(identifier)
    }
}
