// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./assetio.toml` > `~/.config/assetio/assetio.toml` > `/etc/assetio/assetio.toml`
//! with environment variable overrides via `ASSETIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use assetio_core::{PropertyValue, Settings};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::{AssetIoConfig, DefaultManagerFile, ManagerConfig};

/// Environment variable naming a standalone default manager file.
pub const DEFAULT_MANAGER_CONFIG_VAR: &str = "ASSETIO_DEFAULT_CONFIG";

/// Placeholder in default manager settings replaced by the file's directory.
pub const CONFIG_DIR_PLACEHOLDER: &str = "${config_dir}";

const SYSTEM_CONFIG: &str = "/etc/assetio/assetio.toml";
const LOCAL_CONFIG: &str = "assetio.toml";

/// The user config file under the XDG config directory.
pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("assetio/assetio.toml"))
        .unwrap_or_default()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub(crate) fn config_file_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from(SYSTEM_CONFIG),
        user_config_path(),
        PathBuf::from(LOCAL_CONFIG),
    ]
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/assetio/assetio.toml` (system-wide)
/// 3. `~/.config/assetio/assetio.toml` (user XDG config)
/// 4. `./assetio.toml` (local directory)
/// 5. `ASSETIO_*` environment variables
pub fn load_config() -> Result<AssetIoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AssetIoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AssetIoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AssetIoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AssetIoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    config_file_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(AssetIoConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` since key names contain
/// underscores: `ASSETIO_PLUGINS_SEARCH_PATH_VAR` must map to
/// `plugins.search_path_var`. Only variables naming a config section are
/// read; `ASSETIO_PLUGIN_PATH` and `ASSETIO_DEFAULT_CONFIG` are not config keys.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("ASSETIO_")
        .filter(|key| {
            let key = key.as_str().to_ascii_lowercase();
            key.starts_with("plugins_")
                || key.starts_with("logging_")
                || key == "manager_identifier"
        })
        .map(|key| {
            let key = key.as_str().to_ascii_lowercase();
            let mapped = key
                .replacen("plugins_", "plugins.", 1)
                .replacen("logging_", "logging.", 1)
                .replacen("manager_", "manager.", 1);
            mapped.into()
        })
}

/// Parse a standalone default manager file.
///
/// String settings have `${config_dir}` replaced by the directory holding
/// the file, so settings can name resources next to it.
pub fn load_default_manager_from_str(
    toml_content: &str,
    path: &Path,
) -> Result<ManagerConfig, figment::Error> {
    let file: DefaultManagerFile = Figment::from(Toml::string(toml_content)).extract()?;
    let mut manager = file.manager;
    let config_dir = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    substitute_config_dir(&mut manager.settings, &config_dir);
    tracing::debug!(
        path = %path.display(),
        identifier = %manager.identifier,
        "loaded default manager configuration"
    );
    Ok(manager)
}

/// Replaces `${config_dir}` in every string setting.
pub fn substitute_config_dir(settings: &mut Settings, config_dir: &Path) {
    let dir = config_dir.display().to_string();
    for value in settings.values_mut() {
        if let PropertyValue::Str(s) = value
            && s.contains(CONFIG_DIR_PLACEHOLDER)
        {
            *s = s.replace(CONFIG_DIR_PLACEHOLDER, &dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_placeholder_is_substituted() {
        let mut settings = Settings::new();
        settings.insert("root".into(), "${config_dir}/library".into());
        settings.insert("count".into(), 2.into());
        substitute_config_dir(&mut settings, Path::new("/opt/show"));
        assert_eq!(settings.get("root"), Some(&PropertyValue::Str("/opt/show/library".into())));
        assert_eq!(settings.get("count"), Some(&PropertyValue::Int(2)));
    }

    #[test]
    fn default_manager_file_parses() {
        let content = r#"
[manager]
identifier = "org.example.manager"

[manager.settings]
root = "${config_dir}/data"
"#;
        let manager =
            load_default_manager_from_str(content, Path::new("/nonexistent/show/manager.toml"))
                .unwrap();
        assert_eq!(manager.identifier, "org.example.manager");
        assert_eq!(
            manager.settings.get("root"),
            Some(&PropertyValue::Str("/nonexistent/show/data".into()))
        );
    }

    #[test]
    fn default_manager_file_requires_manager_section() {
        let err = load_default_manager_from_str("", Path::new("/x/manager.toml")).unwrap_err();
        assert!(err.to_string().contains("manager"));
    }

    #[test]
    fn config_files_are_ordered_lowest_precedence_first() {
        let paths = config_file_paths();
        assert_eq!(paths[0], PathBuf::from("/etc/assetio/assetio.toml"));
        assert_eq!(paths[2], PathBuf::from("assetio.toml"));
    }
}
