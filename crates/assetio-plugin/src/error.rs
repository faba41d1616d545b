// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors raised while loading a single plugin unit.
//!
//! These never abort a scan: the loader logs them and moves on to the next
//! candidate. They surface to callers only from single-unit entry points
//! such as [`NativeSourceLoader::load`](crate::NativeSourceLoader::load).

use std::path::PathBuf;

use assetio_core::AssetIoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    /// Failed to open the shared library.
    #[error("failed to open library '{}': {message}", path.display())]
    OpenFailed { path: PathBuf, message: String },

    /// The binary doesn't export a plugin declaration.
    #[error("'{}' does not export the plugin entry point '{symbol}'", path.display())]
    MissingEntryPoint { path: PathBuf, symbol: String },

    /// ABI or core version mismatch.
    #[error(
        "'{}' was built for plugin ABI {abi_version} / assetio-core {core_version}, \
         expected ABI {expected_abi} / assetio-core {expected_core}",
        path.display()
    )]
    Incompatible {
        path: PathBuf,
        abi_version: u32,
        core_version: String,
        expected_abi: u32,
        expected_core: String,
    },

    /// The package manifest could not be read or parsed.
    #[error("invalid plugin manifest '{}': {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    /// The manifest requires a newer middleware.
    #[error("'{}' requires assetio {required}, running {running}", path.display())]
    UnsupportedVersion {
        path: PathBuf,
        required: String,
        running: String,
    },

    /// The provider's identifier differs from the one the manifest declares.
    #[error(
        "'{}' declares identifier '{declared}' but its provider reports '{actual}'",
        path.display()
    )]
    IdentifierMismatch {
        path: PathBuf,
        declared: String,
        actual: String,
    },

    /// The provider reported an empty identifier.
    #[error("plugin from {origin} reported an empty identifier")]
    EmptyIdentifier { origin: String },

    /// Plugin code panicked while being loaded.
    #[error("plugin from {origin} panicked: {message}")]
    Panicked { origin: String, message: String },
}

impl From<PluginError> for AssetIoError {
    fn from(err: PluginError) -> Self {
        AssetIoError::PluginLoad {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
