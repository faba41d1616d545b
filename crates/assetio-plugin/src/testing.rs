// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stand-ins for plugins and binaries used by this crate's unit tests.
//!
//! `FakeOpener` and `StubProvider` mirror `FakeBinaryOpener` and
//! `MockProvider` in `assetio-test-utils`. That crate depends on this one, so
//! unit tests here cannot use it. Keep the two copies in step.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use assetio_core::declaration::PLUGIN_ENTRY_SYMBOL;
use assetio_core::{
    AssetIoError, BatchElementError, BatchSink, BoxedPager, Capability, Context, EmptyPager,
    EntityReference, EntityTraitsAccess, HostInterface, HostSession, ManagerInterface,
    ManagerState, PluginDeclaration, PluginProvider, PolicyAccess, RelationsAccess, Settings,
    TraitSet, TraitsData,
};

use crate::error::PluginError;
use crate::library::{BinaryOpener, NativeBinary};

pub(crate) struct StubHost;

impl HostInterface for StubHost {
    fn identifier(&self) -> String {
        "org.assetio.test.host".into()
    }

    fn display_name(&self) -> String {
        "Stub Host".into()
    }
}

pub(crate) fn host_session() -> HostSession {
    HostSession::new(Arc::new(StubHost))
}

/// A provider whose managers report `tag` as their display name, so tests
/// can tell apart providers sharing an identifier.
pub(crate) struct StubProvider {
    identifier: String,
    tag: String,
}

impl StubProvider {
    pub(crate) fn new(identifier: &str, tag: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            tag: tag.to_string(),
        }
    }
}

impl PluginProvider for StubProvider {
    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn create_manager(&self) -> Result<Box<dyn ManagerInterface>, AssetIoError> {
        Ok(Box::new(StubManager {
            identifier: self.identifier.clone(),
            tag: self.tag.clone(),
        }))
    }
}

pub(crate) struct StubManager {
    identifier: String,
    tag: String,
}

impl ManagerInterface for StubManager {
    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn display_name(&self) -> String {
        self.tag.clone()
    }

    fn initialize(&self, _settings: Settings, _host: &HostSession) -> Result<(), AssetIoError> {
        Ok(())
    }

    fn has_capability(&self, capability: Capability) -> bool {
        Capability::REQUIRED.contains(&capability) || capability == Capability::Stateful
    }

    fn management_policy(
        &self,
        trait_sets: &[TraitSet],
        _access: PolicyAccess,
        _context: &Context,
        _host: &HostSession,
    ) -> Result<Vec<TraitsData>, AssetIoError> {
        Ok(vec![TraitsData::new(); trait_sets.len()])
    }

    fn is_entity_reference_string(&self, candidate: &str, _host: &HostSession) -> bool {
        candidate.starts_with("stub://")
    }

    fn entity_traits(
        &self,
        references: &[EntityReference],
        _access: EntityTraitsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, TraitSet>,
    ) -> Result<(), AssetIoError> {
        for (index, reference) in references.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            if reference.as_str().starts_with("stub://") {
                sink.success(index, TraitSet::new());
            } else {
                sink.error(index, BatchElementError::invalid_entity_reference(reference.as_str()));
            }
        }
        Ok(())
    }

    fn get_with_relationship_paged(
        &self,
        references: &[EntityReference],
        _relationship: &TraitsData,
        _result_trait_set: &TraitSet,
        _page_size: usize,
        _access: RelationsAccess,
        _context: &Context,
        _host: &HostSession,
        sink: &mut BatchSink<'_, BoxedPager>,
    ) -> Result<(), AssetIoError> {
        for (index, reference) in references.iter().enumerate() {
            if sink.is_aborted() {
                break;
            }
            if reference.as_str().starts_with("stub://") {
                sink.success(index, Box::new(EmptyPager));
            } else {
                sink.error(index, BatchElementError::invalid_entity_reference(reference.as_str()));
            }
        }
        Ok(())
    }

    fn create_state(&self, _host: &HostSession) -> Result<ManagerState, AssetIoError> {
        Ok(ManagerState::new(self.tag.clone()))
    }
}

fn stub_provider() -> Arc<dyn PluginProvider> {
    Arc::new(StubProvider::new("org.assetio.test.stub", "stub"))
}

/// A declaration for `org.assetio.test.stub`.
pub(crate) fn stub_declaration() -> PluginDeclaration {
    PluginDeclaration::new(stub_provider)
}

#[derive(Clone)]
enum FakeEntry {
    Exports(Vec<(String, PluginDeclaration)>),
    Panics,
}

#[derive(Default)]
struct Counters {
    opens: HashMap<PathBuf, usize>,
    unloads: HashMap<PathBuf, usize>,
}

/// A [`BinaryOpener`] serving declarations from memory for files that exist
/// on disk. Counts opens and unloads per canonical path.
#[derive(Default)]
pub(crate) struct FakeOpener {
    entries: Mutex<HashMap<PathBuf, FakeEntry>>,
    counters: Arc<Mutex<Counters>>,
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl FakeOpener {
    pub(crate) fn insert(&self, path: &Path, declaration: PluginDeclaration) {
        self.insert_with_symbol(path, PLUGIN_ENTRY_SYMBOL, declaration);
    }

    pub(crate) fn insert_with_symbol(&self, path: &Path, symbol: &str, declaration: PluginDeclaration) {
        self.entries.lock().unwrap().insert(
            canonical(path),
            FakeEntry::Exports(vec![(symbol.to_string(), declaration)]),
        );
    }

    /// A binary with no plugin declaration at all.
    pub(crate) fn insert_empty(&self, path: &Path) {
        self.entries
            .lock()
            .unwrap()
            .insert(canonical(path), FakeEntry::Exports(Vec::new()));
    }

    pub(crate) fn insert_panicking(&self, path: &Path) {
        self.entries.lock().unwrap().insert(canonical(path), FakeEntry::Panics);
    }

    pub(crate) fn open_count(&self, path: &Path) -> usize {
        let counters = self.counters.lock().unwrap();
        counters.opens.get(&canonical(path)).copied().unwrap_or(0)
    }

    pub(crate) fn unload_count(&self, path: &Path) -> usize {
        let counters = self.counters.lock().unwrap();
        counters.unloads.get(&canonical(path)).copied().unwrap_or(0)
    }
}

impl BinaryOpener for FakeOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn NativeBinary>, PluginError> {
        let entry = self.entries.lock().unwrap().get(path).cloned();
        match entry {
            Some(FakeEntry::Exports(exports)) => {
                *self.counters.lock().unwrap().opens.entry(path.to_path_buf()).or_default() += 1;
                Ok(Box::new(FakeBinary {
                    path: path.to_path_buf(),
                    exports,
                    counters: self.counters.clone(),
                }))
            }
            Some(FakeEntry::Panics) => panic!("initializer of {} panicked", path.display()),
            None => Err(PluginError::OpenFailed {
                path: path.to_path_buf(),
                message: "not a shared library".into(),
            }),
        }
    }
}

struct FakeBinary {
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
        if let Ok(mut counters) = self.counters.lock() {
            *counters.unloads.entry(self.path.clone()).or_default() += 1;
        }
    }
}
