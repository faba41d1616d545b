// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled-in plugins advertised through link-time entry points.
//!
//! Any crate linked into the final binary can advertise a provider with
//! [`submit_entry_point!`]; the package loader picks them up by group.

use assetio_core::declaration::ProviderFn;

/// Group scanned for manager plugins unless configured otherwise.
pub const DEFAULT_ENTRY_POINT_GROUP: &str = "assetio.manager_plugin";

/// A provider advertised under a named group.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint {
    pub group: &'static str,
    pub name: &'static str,
    pub provider: ProviderFn,
}

impl EntryPoint {
    pub const fn new(group: &'static str, name: &'static str, provider: ProviderFn) -> Self {
        Self {
            group,
            name,
            provider,
        }
    }
}

inventory::collect!(EntryPoint);

/// Entry points advertised under `group`, sorted by name.
pub fn entry_points(group: &str) -> Vec<&'static EntryPoint> {
    let mut found: Vec<&'static EntryPoint> = inventory::iter::<EntryPoint>
        .into_iter()
        .filter(|entry| entry.group == group)
        .collect();
    found.sort_by(|a, b| a.name.cmp(b.name));
    found
}

/// Advertises a provider function as an entry point.
///
/// ```ignore
/// fn provider() -> Arc<dyn PluginProvider> { Arc::new(MyProvider) }
/// assetio_plugin::submit_entry_point!("assetio.manager_plugin", "my_manager", provider);
/// ```
#[macro_export]
macro_rules! submit_entry_point {
    ($group:expr, $name:expr, $provider:path) => {
        $crate::__private::inventory::submit! {
            $crate::EntryPoint::new($group, $name, $provider)
        }
    };
}
