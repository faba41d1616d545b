// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The discoverable unit that plugin loaders register.

use crate::error::AssetIoError;
use crate::traits::manager::ManagerInterface;

/// A plugin: a stable identifier plus a factory for manager implementations.
///
/// Providers are shared between the registry that discovered them and every
/// implementation they produce, so they must be cheap to keep alive and
/// never mutated after discovery.
pub trait PluginProvider: Send + Sync {
    /// Globally unique identifier of the manager this plugin provides.
    fn identifier(&self) -> String;

    /// Creates a new, uninitialized manager implementation.
    fn create_manager(&self) -> Result<Box<dyn ManagerInterface>, AssetIoError>;
}
