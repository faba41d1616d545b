// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the AssetIO configuration system.

use std::path::PathBuf;

use assetio_config::diagnostic::{ConfigError, closest_match};
use assetio_config::model::AssetIoConfig;
use assetio_config::{
    DEFAULT_MANAGER_CONFIG_VAR, load_and_validate_str, load_config_from_path,
    load_config_from_str, load_default_manager, load_default_manager_from_env,
};
use assetio_core::PropertyValue;
use serial_test::serial;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_assetio_config() {
    let toml = r#"
[plugins]
search_path_var = "STUDIO_PLUGIN_PATH"
search_paths = ["/opt/plugins", "/usr/local/plugins"]
entry_points = false
entry_point_group = "studio.manager_plugin"
entry_points_disable_var = "STUDIO_NO_ENTRY_POINTS"
sources = ["package", "native"]

[manager]
identifier = "org.example.manager"

[manager.settings]
root = "/srv/assets"

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.plugins.search_path_var, "STUDIO_PLUGIN_PATH");
    assert_eq!(
        config.plugins.search_paths,
        vec![PathBuf::from("/opt/plugins"), PathBuf::from("/usr/local/plugins")]
    );
    assert!(!config.plugins.entry_points);
    assert_eq!(config.plugins.entry_point_group, "studio.manager_plugin");
    assert_eq!(config.plugins.entry_points_disable_var, "STUDIO_NO_ENTRY_POINTS");
    assert_eq!(config.plugins.sources, vec!["package", "native"]);
    let manager = config.manager.expect("manager section");
    assert_eq!(manager.identifier, "org.example.manager");
    assert_eq!(
        manager.settings.get("root"),
        Some(&PropertyValue::Str("/srv/assets".into()))
    );
    assert_eq!(config.logging.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config, AssetIoConfig::default());
    assert!(config.manager.is_none());
}

/// Unknown field in [plugins] section produces an UnknownField error.
#[test]
fn unknown_field_in_plugins_produces_error() {
    let toml = r#"
[plugins]
serach_paths = ["/a"]
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("serach_paths"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[agent]
name = "x"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("agent"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Dotted keys override file values, as the `ASSETIO_` env provider does.
#[test]
fn dotted_override_replaces_file_value() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: AssetIoConfig = Figment::new()
        .merge(Serialized::defaults(AssetIoConfig::default()))
        .merge(Toml::string("[plugins]\nsearch_path_var = \"FROM_TOML\"\n"))
        .merge(("plugins.search_path_var", "FROM_ENV"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.plugins.search_path_var, "FROM_ENV");
}

// ---- Environment overrides ----

/// `ASSETIO_LOGGING_LEVEL` maps to `logging.level`, and unrelated `ASSETIO_`
/// variables such as the plugin search path are not read as config keys.
#[test]
#[serial]
fn env_vars_override_file_and_skip_non_config_vars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assetio.toml");
    std::fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();

    // SAFETY: serialized with every other test touching the environment.
    unsafe {
        std::env::set_var("ASSETIO_LOGGING_LEVEL", "trace");
        std::env::set_var("ASSETIO_PLUGINS_SEARCH_PATH_VAR", "STUDIO_PATH");
        std::env::set_var("ASSETIO_PLUGIN_PATH", "/not/a/config/key");
    }
    let config = load_config_from_path(&path);
    unsafe {
        std::env::remove_var("ASSETIO_LOGGING_LEVEL");
        std::env::remove_var("ASSETIO_PLUGINS_SEARCH_PATH_VAR");
        std::env::remove_var("ASSETIO_PLUGIN_PATH");
    }

    let config = config.expect("env overrides should load");
    assert_eq!(config.logging.level, "trace");
    assert_eq!(config.plugins.search_path_var, "STUDIO_PATH");
}

// ---- Diagnostics ----

/// Unknown key "serach_paths" produces suggestion "search_paths".
#[test]
fn diagnostic_serach_paths_suggests_search_paths() {
    let valid_keys = ["search_path_var", "search_paths", "entry_points"];
    assert_eq!(
        closest_match("serach_paths", valid_keys),
        Some("search_paths".to_string())
    );
}

/// Error output from load_and_validate_str includes the unknown key name.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[logging]
levle = "debug"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { section, key, suggestion, valid_keys, .. } if {
            section == "logging"
                && key == "levle"
                && suggestion.as_deref() == Some("level")
                && valid_keys.iter().any(|k| k == "level")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'levle' with suggestion 'level', got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_follow_successful_parse() {
    let toml = r#"
[plugins]
sources = ["native", "python"]

[logging]
level = "verbose"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(matches!(&errors[0], ConfigError::UnknownSource { name, .. } if name == "python"));
    assert!(matches!(&errors[1], ConfigError::UnknownLogLevel { level, .. } if level == "verbose"));
}

/// Errors from inline TOML carry a span into that text.
#[test]
fn inline_errors_point_into_the_text() {
    let toml = "[plugins]\nsources = [\"native\", \"natve\"]\n";

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    match &errors[0] {
        ConfigError::UnknownSource { suggestion, span: Some(span), src: Some(src), .. } => {
            assert_eq!(suggestion.as_deref(), Some("native"));
            assert_eq!(span.offset(), toml.find("\"natve\"").unwrap());
            assert_eq!(src.name(), "<inline>");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---- Default manager file ----

/// `${config_dir}` resolves to the directory holding the file.
#[test]
fn default_manager_file_substitutes_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manager.toml");
    std::fs::write(
        &path,
        "[manager]\nidentifier = \"org.example.manager\"\n\n[manager.settings]\nlibrary = \"${config_dir}/library.json\"\n",
    )
    .unwrap();

    let manager = load_default_manager(&path).expect("should load");
    let expected = dir.path().canonicalize().unwrap().join("library.json");
    assert_eq!(
        manager.settings.get("library"),
        Some(&PropertyValue::Str(expected.display().to_string()))
    );
}

#[test]
fn missing_default_manager_file_is_reported() {
    let errors = load_default_manager(std::path::Path::new("/nonexistent/manager.toml"))
        .expect_err("missing file should fail");
    assert!(matches!(
        &errors[0],
        ConfigError::DefaultManagerUnreadable { path, named_by: None, .. } if path.contains("manager.toml")
    ));
}

#[test]
fn empty_default_manager_identifier_points_at_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manager.toml");
    let content = "[manager]\nidentifier = \"\"\n";
    std::fs::write(&path, content).unwrap();

    let errors = load_default_manager(&path).expect_err("empty identifier should fail");
    match &errors[0] {
        ConfigError::EmptyValue { key, span: Some(span), .. } => {
            assert_eq!(key, "manager.identifier");
            assert_eq!(span.offset(), content.find("identifier").unwrap());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
#[serial]
fn default_manager_from_env_names_the_variable_when_unreadable() {
    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::set_var(DEFAULT_MANAGER_CONFIG_VAR, "/nonexistent/env-manager.toml") };
    let loaded = load_default_manager_from_env();
    unsafe { std::env::remove_var(DEFAULT_MANAGER_CONFIG_VAR) };

    let errors = loaded.expect("variable is set").expect_err("missing file should fail");
    assert!(matches!(
        &errors[0],
        ConfigError::DefaultManagerUnreadable { named_by: Some(var), .. } if var == DEFAULT_MANAGER_CONFIG_VAR
    ));
}

#[test]
#[serial]
fn default_manager_from_env_unset_is_none() {
    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::remove_var(DEFAULT_MANAGER_CONFIG_VAR) };
    assert!(load_default_manager_from_env().is_none());
}

#[test]
#[serial]
fn default_manager_from_env_reads_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manager.toml");
    std::fs::write(&path, "[manager]\nidentifier = \"org.example.env\"\n").unwrap();

    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::set_var(DEFAULT_MANAGER_CONFIG_VAR, &path) };
    let loaded = load_default_manager_from_env();
    unsafe { std::env::remove_var(DEFAULT_MANAGER_CONFIG_VAR) };

    let manager = loaded.expect("variable is set").expect("file is valid");
    assert_eq!(manager.identifier, "org.example.env");
    assert!(manager.settings.is_empty());
}
