// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry point contract for native plugin binaries.
//!
//! A native plugin is a `cdylib` exporting a [`PluginDeclaration`] static
//! under [`PLUGIN_ENTRY_SYMBOL`], normally via [`export_plugin!`]. The
//! declaration carries Rust trait objects, so the plugin must be built with
//! the same compiler and a compatible `assetio-core`; both versions are
//! checked before the provider function is called.

use std::sync::Arc;

use crate::traits::plugin::PluginProvider;

/// Bumped whenever the layout of [`PluginDeclaration`] or the protocol traits
/// change incompatibly.
pub const PLUGIN_ABI_VERSION: u32 = 1;

/// Symbol a native plugin exports its declaration under.
pub const PLUGIN_ENTRY_SYMBOL: &str = "assetio_plugin";

/// Older symbol name, still accepted but reported as deprecated.
pub const LEGACY_PLUGIN_ENTRY_SYMBOL: &str = "assetio_manager_plugin";

/// Creates the plugin's provider.
pub type ProviderFn = fn() -> Arc<dyn PluginProvider>;

/// The static record a native plugin exports.
#[derive(Clone, Copy)]
pub struct PluginDeclaration {
    pub abi_version: u32,
    pub core_version: &'static str,
    pub provider: ProviderFn,
}

impl PluginDeclaration {
    pub const fn new(provider: ProviderFn) -> Self {
        Self {
            abi_version: PLUGIN_ABI_VERSION,
            core_version: crate::CORE_VERSION,
            provider,
        }
    }

    /// Whether the declaring binary was built against a compatible core.
    ///
    /// Minor and patch releases of `0.x` core versions are not compatible
    /// with each other, so the full version must match.
    pub fn is_compatible(&self) -> bool {
        self.abi_version == PLUGIN_ABI_VERSION && self.core_version == crate::CORE_VERSION
    }
}

impl std::fmt::Debug for PluginDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDeclaration")
            .field("abi_version", &self.abi_version)
            .field("core_version", &self.core_version)
            .finish_non_exhaustive()
    }
}

/// Exports a [`PluginDeclaration`] from a `cdylib` plugin crate.
///
/// The expression must evaluate to a value implementing
/// [`PluginProvider`](crate::PluginProvider).
///
/// ```ignore
/// assetio_core::export_plugin!(MyProvider::default());
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($provider:expr) => {
        #[allow(non_upper_case_globals)]
        #[unsafe(no_mangle)]
        pub static assetio_plugin: $crate::declaration::PluginDeclaration = {
            fn __assetio_provider() -> ::std::sync::Arc<dyn $crate::PluginProvider> {
                ::std::sync::Arc::new($provider)
            }
            $crate::declaration::PluginDeclaration::new(__assetio_provider)
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetIoError, ManagerInterface};

    struct NullProvider;

    impl PluginProvider for NullProvider {
        fn identifier(&self) -> String {
            "org.assetio.test.null".into()
        }

        fn create_manager(&self) -> Result<Box<dyn ManagerInterface>, AssetIoError> {
            Err(AssetIoError::NotImplemented("null provider".into()))
        }
    }

    mod exported {
        crate::export_plugin!(super::NullProvider);
    }

    #[test]
    fn exported_declaration_is_compatible() {
        let declaration = exported::assetio_plugin;
        assert!(declaration.is_compatible());
        let provider = (declaration.provider)();
        assert_eq!(provider.identifier(), "org.assetio.test.null");
    }

    #[test]
    fn mismatched_versions_are_incompatible() {
        let mut declaration = exported::assetio_plugin;
        declaration.abi_version = PLUGIN_ABI_VERSION + 1;
        assert!(!declaration.is_compatible());

        let mut declaration = exported::assetio_plugin;
        declaration.core_version = "0.0.0-other";
        assert!(!declaration.is_compatible());
    }
}
