// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin package manifest parsing from `plugin.toml` files.
//!
//! A package is either a directory holding `plugin.toml` or a single
//! `*.toml` file. The manifest names the manager identifier the package
//! provides and the native library that implements it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// File name marking a directory as a plugin package.
pub const MANIFEST_FILE_NAME: &str = "plugin.toml";

/// Parsed plugin package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Identifier of the manager the package provides.
    pub identifier: String,
    /// Optional human-readable name.
    pub display_name: Option<String>,
    /// Semantic version string of the package.
    pub version: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Minimum middleware version required (e.g., "0.1.0").
    pub min_assetio_version: Option<String>,
    /// Native library implementing the plugin, resolved against the manifest's directory.
    pub library: PathBuf,
    /// Exported symbol holding the plugin declaration, if not the default.
    pub symbol: Option<String>,
}

/// Intermediate TOML deserialization struct for `plugin.toml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginManifestFile {
    plugin: PluginSection,
}

/// The `[plugin]` section of a `plugin.toml` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    identifier: String,
    display_name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    min_assetio_version: Option<String>,
    library: String,
    symbol: Option<String>,
}

/// Parse a plugin manifest from TOML content.
///
/// `manifest_path` is used for error messages and to resolve a relative
/// `library` path.
pub fn parse_plugin_manifest(
    toml_content: &str,
    manifest_path: &Path,
) -> Result<PluginManifest, PluginError> {
    let invalid = |message: String| PluginError::InvalidManifest {
        path: manifest_path.to_path_buf(),
        message,
    };

    let file: PluginManifestFile = toml::from_str(toml_content).map_err(|e| invalid(e.to_string()))?;
    let section = file.plugin;

    if section.identifier.trim().is_empty() {
        return Err(invalid("identifier must not be empty".to_string()));
    }

    if section.library.trim().is_empty() {
        return Err(invalid("library must not be empty".to_string()));
    }

    if let Some(version) = &section.version {
        semver::Version::parse(version)
            .map_err(|e| invalid(format!("version '{version}' is not valid semver: {e}")))?;
    }

    if let Some(min) = &section.min_assetio_version {
        semver::Version::parse(min).map_err(|e| {
            invalid(format!("min_assetio_version '{min}' is not valid semver: {e}"))
        })?;
    }

    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    Ok(PluginManifest {
        identifier: section.identifier,
        display_name: section.display_name,
        version: section.version,
        description: section.description,
        min_assetio_version: section.min_assetio_version,
        library: base.join(section.library),
        symbol: section.symbol,
    })
}

/// Read and parse a manifest file.
pub fn read_plugin_manifest(manifest_path: &Path) -> Result<PluginManifest, PluginError> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| PluginError::InvalidManifest {
        path: manifest_path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_plugin_manifest(&content, manifest_path)
}

impl PluginManifest {
    /// Checks `min_assetio_version` against the running middleware.
    pub fn check_supported(&self, manifest_path: &Path) -> Result<(), PluginError> {
        let Some(min) = &self.min_assetio_version else {
            return Ok(());
        };
        let running = assetio_core::CORE_VERSION;
        let (Ok(required), Ok(current)) = (semver::Version::parse(min), semver::Version::parse(running))
        else {
            return Ok(());
        };
        if current < required {
            return Err(PluginError::UnsupportedVersion {
                path: manifest_path.to_path_buf(),
                required: min.clone(),
                running: running.to_string(),
            });
        }
        Ok(())
    }
}
