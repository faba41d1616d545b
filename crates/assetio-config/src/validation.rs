// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks what serde attributes cannot express: environment variable names,
//! plugin source lists and log levels. Every error points back into the TOML
//! text that set the value when that text is in the [`SourceSet`].

use std::collections::{HashMap, HashSet};

use crate::diagnostic::{ConfigError, SourceSet, closest_match};
use crate::model::{AssetIoConfig, KNOWN_SOURCES};

/// Levels accepted by `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn is_env_var_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Validate a deserialized configuration, collecting every error rather
/// than stopping at the first.
pub fn validate_config(config: &AssetIoConfig, sources: &SourceSet) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let plugins = &config.plugins;

    for (key, name) in [
        ("search_path_var", &plugins.search_path_var),
        ("entry_points_disable_var", &plugins.entry_points_disable_var),
    ] {
        if !is_env_var_name(name) {
            let (span, src) = sources.locate_key(None, "plugins", key);
            errors.push(ConfigError::BadEnvVarName {
                key: format!("plugins.{key}"),
                name: name.clone(),
                span,
                src,
            });
        }
    }

    if plugins.entry_point_group.trim().is_empty() {
        errors.push(empty_value(sources, "plugins", "entry_point_group"));
    }

    if plugins.sources.is_empty() {
        errors.push(empty_value(sources, "plugins", "sources"));
    }

    let mut seen = HashSet::new();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for name in &plugins.sources {
        let nth = occurrences.entry(name.as_str()).or_default();
        let (span, src) = sources.locate_value("plugins", "sources", name, *nth);
        *nth += 1;
        if !KNOWN_SOURCES.contains(&name.as_str()) {
            errors.push(ConfigError::UnknownSource {
                name: name.clone(),
                suggestion: closest_match(name, KNOWN_SOURCES),
                span,
                src,
            });
        } else if !seen.insert(name) {
            errors.push(ConfigError::DuplicateSource {
                name: name.clone(),
                span,
                src,
            });
        }
    }

    if let Some(manager) = &config.manager
        && manager.identifier.trim().is_empty()
    {
        errors.push(empty_value(sources, "manager", "identifier"));
    }

    let level = &config.logging.level;
    if !LOG_LEVELS.contains(&level.as_str()) {
        let (span, src) = sources.locate_key(None, "logging", "level");
        errors.push(ConfigError::UnknownLogLevel {
            level: level.clone(),
            suggestion: closest_match(&level.to_ascii_lowercase(), LOG_LEVELS),
            span,
            src,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn empty_value(sources: &SourceSet, section: &str, key: &str) -> ConfigError {
    let (span, src) = sources.locate_key(None, section, key);
    ConfigError::EmptyValue {
        key: format!("{section}.{key}"),
        span,
        src,
    }
}
