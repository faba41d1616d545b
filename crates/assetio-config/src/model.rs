// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the AssetIO middleware.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use assetio_core::Settings;
use serde::{Deserialize, Serialize};

/// Source name for native shared library plugins.
pub const NATIVE_SOURCE: &str = "native";

/// Source name for manifest packages and compiled-in entry points.
pub const PACKAGE_SOURCE: &str = "package";

/// Every source name accepted in `plugins.sources`.
pub const KNOWN_SOURCES: [&str; 2] = [NATIVE_SOURCE, PACKAGE_SOURCE];

/// Top-level AssetIO configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetIoConfig {
    /// Plugin discovery settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// The default manager, if one is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<ManagerConfig>,

    /// Diagnostic output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Plugin discovery configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Environment variable holding the search path, split with the
    /// platform path separator.
    #[serde(default = "default_search_path_var")]
    pub search_path_var: String,

    /// Explicit search paths. When non-empty, `search_path_var` is ignored.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Whether compiled-in entry point plugins are discovered.
    #[serde(default = "default_true")]
    pub entry_points: bool,

    /// Entry point group scanned for compiled-in plugins.
    #[serde(default = "default_entry_point_group")]
    pub entry_point_group: String,

    /// Environment variable that disables entry point discovery when set.
    #[serde(default = "default_entry_points_disable_var")]
    pub entry_points_disable_var: String,

    /// Plugin sources in precedence order.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            search_path_var: default_search_path_var(),
            search_paths: Vec::new(),
            entry_points: true,
            entry_point_group: default_entry_point_group(),
            entry_points_disable_var: default_entry_points_disable_var(),
            sources: default_sources(),
        }
    }
}

fn default_search_path_var() -> String {
    "ASSETIO_PLUGIN_PATH".to_string()
}

fn default_true() -> bool {
    true
}

fn default_entry_point_group() -> String {
    "assetio.manager_plugin".to_string()
}

fn default_entry_points_disable_var() -> String {
    "ASSETIO_DISABLE_ENTRY_POINTS_PLUGINS".to_string()
}

fn default_sources() -> Vec<String> {
    KNOWN_SOURCES.iter().map(|s| s.to_string()).collect()
}

/// A manager to instantiate and the settings to initialize it with.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    /// Identifier of the manager plugin.
    pub identifier: String,

    /// Settings passed to `initialize`.
    #[serde(default)]
    pub settings: Settings,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Layout of a standalone default manager file, as named by
/// `ASSETIO_DEFAULT_CONFIG`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DefaultManagerFile {
    pub manager: ManagerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetio_core::PropertyValue;

    #[test]
    fn defaults_are_sensible() {
        let config = AssetIoConfig::default();
        assert_eq!(config.plugins.search_path_var, "ASSETIO_PLUGIN_PATH");
        assert!(config.plugins.search_paths.is_empty());
        assert!(config.plugins.entry_points);
        assert_eq!(config.plugins.entry_point_group, "assetio.manager_plugin");
        assert_eq!(config.plugins.sources, vec!["native", "package"]);
        assert!(config.manager.is_none());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn manager_settings_keep_primitive_types() {
        let toml_str = r#"
[manager]
identifier = "org.example.manager"

[manager.settings]
library_path = "/srv/assets"
retries = 3
strict = true
"#;
        let config: AssetIoConfig = toml::from_str(toml_str).unwrap();
        let manager = config.manager.unwrap();
        assert_eq!(manager.identifier, "org.example.manager");
        assert_eq!(manager.settings.get("retries"), Some(&PropertyValue::Int(3)));
        assert_eq!(manager.settings.get("strict"), Some(&PropertyValue::Bool(true)));
        assert_eq!(
            manager.settings.get("library_path"),
            Some(&PropertyValue::Str("/srv/assets".into()))
        );
    }

    #[test]
    fn plugins_deny_unknown_fields() {
        let toml_str = r#"
[plugins]
serach_paths = ["/a"]
"#;
        assert!(toml::from_str::<AssetIoConfig>(toml_str).is_err());
    }

    #[test]
    fn manager_requires_identifier() {
        let toml_str = r#"
[manager.settings]
a = 1
"#;
        assert!(toml::from_str::<AssetIoConfig>(toml_str).is_err());
    }
}
