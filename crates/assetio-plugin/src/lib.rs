// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin discovery, native library lifetime management and implementation
//! factories.
//!
//! Each discovery mechanism is a [`SourceLoader`] owning its own
//! [`PluginRegistry`]. A [`PluginImplementationFactory`] wraps one loader and
//! scans lazily; a [`HybridFactory`] composes several factories with
//! first-match-wins precedence. Native binaries are opened through a shared
//! [`LibraryManager`] and stay loaded while anything produced from them is
//! alive.

pub mod bound;
pub mod entry_point;
pub mod error;
pub mod factory;
pub mod hybrid;
pub mod library;
pub mod loader;
pub mod manifest;
pub mod native;
pub mod package;
pub mod registry;

#[cfg(test)]
mod testing;

pub use bound::{BoundManager, BoundPager, BoundProvider};
pub use entry_point::{DEFAULT_ENTRY_POINT_GROUP, EntryPoint, entry_points};
pub use error::PluginError;
pub use factory::{
    DEFAULT_SEARCH_PATH_VAR, ManagerImplementationFactory, PluginImplementationFactory,
    SearchPaths,
};
pub use hybrid::HybridFactory;
pub use library::{BinaryOpener, DylibOpener, LibraryHandle, LibraryManager, NativeBinary};
pub use loader::SourceLoader;
pub use manifest::{MANIFEST_FILE_NAME, PluginManifest, parse_plugin_manifest, read_plugin_manifest};
pub use native::NativeSourceLoader;
pub use package::{DISABLE_ENTRY_POINTS_VAR, PackageSourceLoader};
pub use registry::{Origin, PluginEntry, PluginRegistry, SharedRegistry};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_types_are_object_safe() {
        fn assert_factory<T: ManagerImplementationFactory + ?Sized>() {}
        fn assert_loader<T: SourceLoader + ?Sized>() {}
        assert_factory::<dyn ManagerImplementationFactory>();
        assert_factory::<HybridFactory>();
        assert_factory::<PluginImplementationFactory<NativeSourceLoader>>();
        assert_factory::<PluginImplementationFactory<PackageSourceLoader>>();
        assert_loader::<dyn SourceLoader>();
    }

    #[test]
    fn default_search_path_is_environment_driven() {
        assert_eq!(
            SearchPaths::default(),
            SearchPaths::EnvVar(DEFAULT_SEARCH_PATH_VAR.to_string())
        );
        assert_eq!(DEFAULT_SEARCH_PATH_VAR, "ASSETIO_PLUGIN_PATH");
        assert_eq!(DEFAULT_ENTRY_POINT_GROUP, "assetio.manager_plugin");
    }
}
