// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the AssetIO middleware.
//!
//! Settings come from layered TOML files and `ASSETIO_*` variables; the
//! default manager may also come from a standalone file named by
//! `ASSETIO_DEFAULT_CONFIG`. Unknown keys are rejected, and every error is
//! reported at once with a span into the file that caused it.
//!
//! # Usage
//!
//! ```no_run
//! use assetio_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Plugin search path variable: {}", config.plugins.search_path_var);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, SourceSet, render_errors};
pub use loader::{
    CONFIG_DIR_PLACEHOLDER, DEFAULT_MANAGER_CONFIG_VAR, load_config, load_config_from_path,
    load_config_from_str, load_default_manager_from_str,
};
pub use model::{AssetIoConfig, LoggingConfig, ManagerConfig, PluginsConfig};

/// Turns an extraction result into validated configuration, attributing
/// every error to the TOML text in `sources`.
fn checked(
    extracted: Result<AssetIoConfig, figment::Error>,
    sources: &SourceSet,
) -> Result<AssetIoConfig, Vec<ConfigError>> {
    let config = extracted.map_err(|err| diagnostic::from_figment(err, sources))?;
    validation::validate_config(&config, sources)?;
    Ok(config)
}

/// Load the layered configuration (system, user and local files, then
/// `ASSETIO_*` variables) and validate it.
pub fn load_and_validate() -> Result<AssetIoConfig, Vec<ConfigError>> {
    let sources = SourceSet::read(loader::config_file_paths());
    checked(loader::load_config(), &sources)
}

/// Validate configuration given as TOML text, without files or variables.
pub fn load_and_validate_str(toml_content: &str) -> Result<AssetIoConfig, Vec<ConfigError>> {
    let sources = SourceSet::single("<inline>", toml_content);
    checked(loader::load_config_from_str(toml_content), &sources)
}

/// Read and validate a standalone default manager file.
pub fn load_default_manager(path: &Path) -> Result<ManagerConfig, Vec<ConfigError>> {
    read_default_manager(path, None)
}

/// The default manager file named by `ASSETIO_DEFAULT_CONFIG`, if the
/// variable is set.
pub fn load_default_manager_from_env() -> Option<Result<ManagerConfig, Vec<ConfigError>>> {
    let path = std::env::var_os(DEFAULT_MANAGER_CONFIG_VAR)?;
    if path.is_empty() {
        return None;
    }
    Some(read_default_manager(
        Path::new(&path),
        Some(DEFAULT_MANAGER_CONFIG_VAR),
    ))
}

fn read_default_manager(
    path: &Path,
    named_by: Option<&str>,
) -> Result<ManagerConfig, Vec<ConfigError>> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        vec![ConfigError::DefaultManagerUnreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
            named_by: named_by.map(str::to_string),
        }]
    })?;
    let sources = SourceSet::single(path.display().to_string(), content.as_str());
    let manager = loader::load_default_manager_from_str(&content, path)
        .map_err(|err| diagnostic::from_figment(err, &sources))?;
    if manager.identifier.trim().is_empty() {
        return Err(vec![validation::empty_value(&sources, "manager", "identifier")]);
    }
    Ok(manager)
}
