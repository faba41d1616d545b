// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for plugin discovery, precedence and library lifetimes.
//!
//! Native binaries are simulated with `FakeBinaryOpener`, so every test runs
//! against real directories without loading real shared libraries.

use std::path::PathBuf;
use std::sync::Arc;

use assetio_core::{PluginDeclaration, PluginProvider};
use assetio_plugin::{
    HybridFactory, LibraryManager, ManagerImplementationFactory, NativeSourceLoader, Origin,
    PackageSourceLoader, PluginImplementationFactory, SearchPaths, SourceLoader,
};
use assetio_test_utils::{FakeBinaryOpener, MockProvider, MockSourceLoader, PluginDirs, write_binary};
use serial_test::serial;
use tracing_test::traced_test;

const MANAGER_ID: &str = "org.example.manager";

fn dir_a_provider() -> Arc<dyn PluginProvider> {
    MockProvider::new(MANAGER_ID, "dirA").into_arc()
}

fn dir_b_provider() -> Arc<dyn PluginProvider> {
    MockProvider::new(MANAGER_ID, "dirB").into_arc()
}

fn extra_provider() -> Arc<dyn PluginProvider> {
    MockProvider::new("org.example.extra", "extra").into_arc()
}

/// `dirA` and `dirB` each hold a binary registering `org.example.manager`.
struct TwoDirs {
    dirs: PluginDirs,
    opener: Arc<FakeBinaryOpener>,
    libraries: Arc<LibraryManager>,
    binaries: Vec<PathBuf>,
}

fn two_dirs() -> TwoDirs {
    let dirs = PluginDirs::new(&["dirA", "dirB"]);
    let opener = FakeBinaryOpener::new();
    let a = write_binary(dirs.dir(0), "libmanager");
    let b = write_binary(dirs.dir(1), "libmanager");
    opener.insert(&a, PluginDeclaration::new(dir_a_provider));
    opener.insert(&b, PluginDeclaration::new(dir_b_provider));
    let libraries = Arc::new(LibraryManager::new(opener.clone()));
    TwoDirs {
        dirs,
        opener,
        libraries,
        binaries: vec![a, b],
    }
}

impl TwoDirs {
    fn loader(&self) -> NativeSourceLoader {
        NativeSourceLoader::with_library_manager(self.libraries.clone())
    }

    fn factory(&self, order: &[usize]) -> PluginImplementationFactory<NativeSourceLoader> {
        PluginImplementationFactory::new(self.loader(), SearchPaths::Explicit(self.dirs.ordered(order)))
    }
}

// ---- Precedence ----

#[test]
fn scanning_dir_a_then_dir_b_instantiates_dir_a() {
    let env = two_dirs();
    let factory = env.factory(&[0, 1]);

    let manager = factory.instantiate(MANAGER_ID).unwrap();
    assert_eq!(manager.identifier(), MANAGER_ID);
    assert_eq!(manager.display_name(), "dirA");
}

#[test]
fn reversing_search_order_reverses_precedence() {
    let env = two_dirs();
    let ab = env.factory(&[0, 1]);
    let ba = env.factory(&[1, 0]);

    assert_eq!(ab.instantiate(MANAGER_ID).unwrap().display_name(), "dirA");
    assert_eq!(ba.instantiate(MANAGER_ID).unwrap().display_name(), "dirB");
}

#[test]
#[traced_test]
fn duplicate_identifier_is_logged_with_canonical_origin() {
    let env = two_dirs();
    let loader = env.loader();
    loader.scan(&env.dirs.ordered(&[0, 1]));

    let winner = env.binaries[0].canonicalize().unwrap();
    assert_eq!(loader.origin(MANAGER_ID), Some(Origin::Binary(winner.clone())));
    assert!(logs_contain(&format!(
        "has already been registered by binary '{}'",
        winner.display()
    )));
}

#[test]
#[serial]
fn search_path_from_environment_variable() {
    let env = two_dirs();
    let var = "ASSETIO_TEST_PLUGIN_SYSTEM_PATH";
    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::set_var(var, env.dirs.joined(&[1, 0])) };
    let factory = PluginImplementationFactory::new(env.loader(), SearchPaths::EnvVar(var.into()));

    let manager = factory.instantiate(MANAGER_ID).unwrap();
    unsafe { std::env::remove_var(var) };
    assert_eq!(manager.display_name(), "dirB");
}

// ---- Scan hygiene ----

#[test]
#[traced_test]
fn missing_and_duplicate_search_paths_are_skipped() {
    let env = two_dirs();
    let loader = env.loader();
    let missing = env.dirs.root().join("does-not-exist");
    let duplicate = env.dirs.dir(0).join(".");
    loader.scan(&[missing, env.dirs.dir(0).to_path_buf(), duplicate]);

    assert_eq!(loader.identifiers(), vec![MANAGER_ID]);
    assert!(logs_contain("not a directory"));
    assert!(logs_contain("already scanned"));
    assert_eq!(env.opener.open_count(&env.binaries[0]), 1);
}

#[test]
fn reset_then_rescan_reproduces_identifier_set() {
    let env = two_dirs();
    let extra = write_binary(env.dirs.dir(1), "libextra");
    env.opener.insert(&extra, PluginDeclaration::new(extra_provider));
    let factory = env.factory(&[0, 1]);

    let mut before = factory.identifiers().unwrap();
    factory.reset();
    let mut after = factory.identifiers().unwrap();
    before.sort();
    after.sort();
    assert_eq!(before, vec!["org.example.extra", MANAGER_ID]);
    assert_eq!(before, after);
}

// ---- Library lifetime ----

#[test]
fn two_loaders_share_one_binary() {
    let env = two_dirs();
    let first = env.loader();
    let second = env.loader();
    let paths = env.dirs.ordered(&[0]);
    first.scan(&paths);
    second.scan(&paths);

    let binary = &env.binaries[0];
    assert_eq!(env.opener.open_count(binary), 1);

    let manager = first.plugin(MANAGER_ID).unwrap().create_manager().unwrap();

    first.reset();
    assert!(env.libraries.is_loaded(binary));
    assert_eq!(second.plugin(MANAGER_ID).unwrap().create_manager().unwrap().display_name(), "dirA");

    drop(second);
    assert!(env.libraries.is_loaded(binary));
    assert_eq!(manager.display_name(), "dirA");

    drop(manager);
    assert!(!env.libraries.is_loaded(binary));
    assert_eq!(env.opener.unload_count(binary), 1);
}

#[test]
fn instance_outlives_its_factory() {
    let env = two_dirs();
    let factory = env.factory(&[0]);
    let manager = factory.instantiate(MANAGER_ID).unwrap();
    drop(factory);

    assert!(env.libraries.is_loaded(&env.binaries[0]));
    assert_eq!(manager.identifier(), MANAGER_ID);
    drop(manager);
    assert!(!env.libraries.is_loaded(&env.binaries[0]));
}

#[cfg(unix)]
#[test]
fn symlinked_search_path_shares_the_handle() {
    let env = two_dirs();
    let link = env.dirs.root().join("linkA");
    std::os::unix::fs::symlink(env.dirs.dir(0), &link).unwrap();

    let direct = env.loader();
    direct.scan(&env.dirs.ordered(&[0]));
    let linked = env.loader();
    linked.scan(&[link]);

    assert_eq!(direct.origin(MANAGER_ID), linked.origin(MANAGER_ID));
    assert_eq!(env.opener.open_count(&env.binaries[0]), 1);
    assert_eq!(env.libraries.ref_count(&env.binaries[0]), 2);
}

// ---- Packages ----

#[test]
fn package_manifest_points_at_binary_in_package() {
    let env = two_dirs();
    let packages = PluginDirs::new(&["packages"]);
    let package = packages.dir(0).join("example");
    std::fs::create_dir_all(&package).unwrap();
    let library = write_binary(&package, "libexample");
    env.opener.insert(&library, PluginDeclaration::new(extra_provider));
    std::fs::write(
        package.join("plugin.toml"),
        format!(
            "[plugin]\nidentifier = \"org.example.extra\"\nlibrary = \"{}\"\n",
            library.file_name().unwrap().to_string_lossy()
        ),
    )
    .unwrap();

    let loader = PackageSourceLoader::with_library_manager(env.libraries.clone()).with_entry_points(false);
    loader.scan(&packages.paths());

    assert_eq!(loader.identifiers(), vec!["org.example.extra"]);
    assert!(matches!(loader.origin("org.example.extra"), Some(Origin::Package(_))));
}

// ---- Hybrid composition ----

#[test]
fn hybrid_prefers_earlier_source_and_unions_identifiers() {
    let env = two_dirs();
    let native: Arc<dyn ManagerImplementationFactory> = Arc::new(env.factory(&[1]));
    let mock_loader = MockSourceLoader::new().with_path(
        "/mock",
        vec![
            MockProvider::new(MANAGER_ID, "mock").into_arc(),
            MockProvider::new("org.example.aaa", "mock").into_arc(),
        ],
    );
    let mock: Arc<dyn ManagerImplementationFactory> = Arc::new(PluginImplementationFactory::new(
        mock_loader,
        SearchPaths::Explicit(vec!["/mock".into()]),
    ));

    let hybrid = HybridFactory::new(vec![native.clone(), mock.clone()]).unwrap();
    assert_eq!(hybrid.identifiers().unwrap(), vec!["org.example.aaa", MANAGER_ID]);
    assert_eq!(hybrid.instantiate(MANAGER_ID).unwrap().display_name(), "dirB");
    assert_eq!(hybrid.instantiate("org.example.aaa").unwrap().display_name(), "mock");

    let reversed = HybridFactory::new(vec![mock, native]).unwrap();
    assert_eq!(reversed.instantiate(MANAGER_ID).unwrap().display_name(), "mock");
}
