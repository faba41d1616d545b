// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment errors and failed semantic checks both become [`ConfigError`]s.
//! When the TOML text a value came from is known (see [`SourceSet`]), the
//! error carries a span pointing at the offending key or value so miette can
//! show it in context.

#![allow(unused_assignments)] // emitted by the `Diagnostic` derive

use std::fmt::Write as _;
use std::path::PathBuf;

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate must beat to be offered as a correction.
const MIN_SIMILARITY: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section))]
    #[diagnostic(
        code(assetio::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Dotted table the key appeared in; empty at the top level.
        section: String,
        key: String,
        suggestion: Option<String>,
        valid_keys: Vec<String>,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(assetio::config::wrong_type), help("expected {expected}"))]
    WrongType {
        key: String,
        found: String,
        expected: String,
        #[label("set here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` is missing from {file}")]
    #[diagnostic(
        code(assetio::config::missing_key),
        help("add `{key}` under its table")
    )]
    MissingKey { key: String, file: String },

    #[error("unknown plugin source `{name}` in plugins.sources")]
    #[diagnostic(
        code(assetio::config::unknown_source),
        help("{}", unknown_source_help(suggestion.as_deref()))
    )]
    UnknownSource {
        name: String,
        suggestion: Option<String>,
        #[label("no such source")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("plugin source `{name}` is listed more than once in plugins.sources")]
    #[diagnostic(
        code(assetio::config::duplicate_source),
        help("each source is scanned once; remove the repeated entry")
    )]
    DuplicateSource {
        name: String,
        #[label("repeated here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("{key} `{name}` is not a valid environment variable name")]
    #[diagnostic(
        code(assetio::config::env_var_name),
        help("use upper-case ASCII letters, digits and `_`")
    )]
    BadEnvVarName {
        key: String,
        name: String,
        #[label("not a variable name")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("{key} must not be empty")]
    #[diagnostic(code(assetio::config::empty_value))]
    EmptyValue {
        key: String,
        #[label("empty")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("log level `{level}` is not recognized")]
    #[diagnostic(
        code(assetio::config::log_level),
        help("{}", log_level_help(suggestion.as_deref()))
    )]
    UnknownLogLevel {
        level: String,
        suggestion: Option<String>,
        #[label("unknown level")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("cannot read default manager file `{path}`: {reason}")]
    #[diagnostic(
        code(assetio::config::default_manager_unreadable),
        help("{}", unreadable_help(named_by.as_deref()))
    )]
    DefaultManagerUnreadable {
        path: String,
        reason: String,
        /// Environment variable the path was taken from, if any.
        named_by: Option<String>,
    },

    #[error("configuration error: {0}")]
    #[diagnostic(code(assetio::config::other))]
    Other(String),
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &[String]) -> String {
    let valid = valid_keys.join(", ");
    match suggestion {
        Some(s) => format!("did you mean `{s}`? accepted keys: {valid}"),
        None => format!("accepted keys: {valid}"),
    }
}

fn unknown_source_help(suggestion: Option<&str>) -> String {
    let known = crate::model::KNOWN_SOURCES.join(", ");
    match suggestion {
        Some(s) => format!("did you mean `{s}`? known sources: {known}"),
        None => format!("known sources: {known}"),
    }
}

fn log_level_help(suggestion: Option<&str>) -> String {
    let levels = crate::validation::LOG_LEVELS.join(", ");
    match suggestion {
        Some(s) => format!("did you mean `{s}`? levels: {levels}"),
        None => format!("levels: {levels}"),
    }
}

fn unreadable_help(named_by: Option<&str>) -> String {
    match named_by {
        Some(var) => format!("the path comes from ${var}; point it at an existing file or unset it"),
        None => "check the path exists and is readable".to_string(),
    }
}

/// The closest of `options` to `candidate`, if any is similar enough.
pub fn closest_match<'a>(candidate: &str, options: impl IntoIterator<Item = &'a str>) -> Option<String> {
    options
        .into_iter()
        .map(|option| (strsim::jaro_winkler(candidate, option), option))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, option)| option.to_string())
}

/// A span and the text it points into, when one was found.
pub type Location = (Option<SourceSpan>, Option<NamedSource<String>>);

/// The TOML text a configuration was read from, lowest precedence first.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<(String, String)>,
}

impl SourceSet {
    pub fn single(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            files: vec![(name.into(), content.into())],
        }
    }

    /// Reads whichever of `paths` exist. Names are canonicalized so they
    /// match the paths figment records.
    pub fn read(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let files = paths
            .into_iter()
            .filter_map(|path| {
                let content = std::fs::read_to_string(&path).ok()?;
                let name = std::fs::canonicalize(&path).unwrap_or(path);
                Some((name.display().to_string(), content))
            })
            .collect();
        Self { files }
    }

    /// Where `key` is set in table `section`. `file` restricts the search;
    /// otherwise the highest-precedence file setting it wins.
    pub fn locate_key(&self, file: Option<&str>, section: &str, key: &str) -> Location {
        self.locate(file, |content| key_offset(content, section, key).map(|at| (at, key.len())))
    }

    /// Where the `nth` (from zero) quoted occurrence of `value` sits in the
    /// value of `key` in table `section`.
    pub fn locate_value(&self, section: &str, key: &str, value: &str, nth: usize) -> Location {
        let quoted = format!("\"{value}\"");
        self.locate(None, |content| {
            let start = key_offset(content, section, key)?;
            let statement = &content[start..start + statement_len(&content[start..])];
            let (at, _) = statement.match_indices(quoted.as_str()).nth(nth)?;
            Some((start + at, quoted.len()))
        })
    }

    fn locate(&self, file: Option<&str>, find: impl Fn(&str) -> Option<(usize, usize)>) -> Location {
        self.files
            .iter()
            .rev()
            .filter(|(name, _)| file.is_none_or(|wanted| wanted == name.as_str()))
            .find_map(|(name, content)| {
                let (offset, len) = find(content)?;
                Some((
                    Some(SourceSpan::new(offset.into(), len)),
                    Some(NamedSource::new(name, content.clone())),
                ))
            })
            .unwrap_or((None, None))
    }
}

/// Byte offset of `key` in table `section` (dotted, empty for the top
/// level). Keys are matched at the start of a line, before `=`.
fn key_offset(content: &str, section: &str, key: &str) -> Option<usize> {
    let mut table = String::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(header) = trimmed.strip_prefix('[') {
            table = header
                .split(']')
                .next()
                .unwrap_or_default()
                .trim_matches(|c: char| c == '[' || c.is_whitespace())
                .to_string();
        } else if table == section
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Length of the statement starting at a key: up to the next table header
/// or the end of the text. Enough for multi-line arrays.
fn statement_len(text: &str) -> usize {
    text.match_indices("\n[")
        .map(|(at, _)| at)
        .next()
        .unwrap_or(text.len())
}

/// Converts every error figment collected into a [`ConfigError`].
pub fn from_figment(err: figment::Error, sources: &SourceSet) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(error, sources)).collect()
}

fn convert(error: figment::Error, sources: &SourceSet) -> ConfigError {
    use figment::error::Kind;

    let file = error
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(
                std::fs::canonicalize(path)
                    .unwrap_or_else(|_| path.clone())
                    .display()
                    .to_string(),
            ),
            _ => None,
        });
    let path = error.path.join(".");

    match &error.kind {
        Kind::UnknownField(key, expected) => {
            // The path ends with the rejected key itself.
            let section = match error.path.split_last() {
                Some((last, parents)) if last == key => parents.join("."),
                _ => path,
            };
            let (span, src) = sources.locate_key(file.as_deref(), &section, key);
            ConfigError::UnknownKey {
                suggestion: closest_match(key, expected.iter().copied()),
                valid_keys: expected.iter().map(ToString::to_string).collect(),
                section,
                key: key.clone(),
                span,
                src,
            }
        }
        Kind::MissingField(key) => ConfigError::MissingKey {
            key: if path.is_empty() {
                key.to_string()
            } else {
                format!("{path}.{key}")
            },
            file: file.unwrap_or_else(|| "the configuration".to_string()),
        },
        Kind::InvalidType(found, expected) => {
            let (section, key) = match error.path.split_last() {
                Some((key, parents)) => (parents.join("."), key.as_str()),
                None => (String::new(), ""),
            };
            let (span, src) = sources.locate_key(file.as_deref(), &section, key);
            ConfigError::WrongType {
                key: path,
                found: found.to_string(),
                expected: expected.clone(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Writes every error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    let mut report = String::new();
    for error in errors {
        if handler.render_report(&mut report, error).is_err() {
            let _ = writeln!(report, "error: {error}");
        }
    }
    eprint!("{report}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssetIoConfig;
    use figment::{Figment, providers::{Format, Toml}};

    const TEXT: &str = "\
[plugins]
sources = [
    \"native\",
    \"native\",
]

[manager]
identifier = \"org.example.manager\"

[manager.settings]
identifier = \"shadowed\"
";

    fn span_text<'a>(text: &'a str, location: &Location) -> &'a str {
        let span = location.0.expect("span");
        &text[span.offset()..span.offset() + span.len()]
    }

    fn figment_errors(text: &str) -> Vec<ConfigError> {
        let err = Figment::from(Toml::string(text))
            .extract::<AssetIoConfig>()
            .unwrap_err();
        from_figment(err, &SourceSet::single("assetio.toml", text))
    }

    #[test]
    fn keys_are_found_in_their_own_table() {
        let sources = SourceSet::single("assetio.toml", TEXT);
        let top = sources.locate_key(None, "manager", "identifier");
        let nested = sources.locate_key(None, "manager.settings", "identifier");
        assert!(top.0.unwrap().offset() < nested.0.unwrap().offset());
        assert_eq!(span_text(TEXT, &nested), "identifier");
        assert!(sources.locate_key(None, "logging", "identifier").0.is_none());
    }

    #[test]
    fn repeated_values_are_told_apart() {
        let sources = SourceSet::single("assetio.toml", TEXT);
        let first = sources.locate_value("plugins", "sources", "native", 0);
        let second = sources.locate_value("plugins", "sources", "native", 1);
        assert_eq!(span_text(TEXT, &second), "\"native\"");
        assert!(first.0.unwrap().offset() < second.0.unwrap().offset());
        assert!(sources.locate_value("plugins", "sources", "native", 2).0.is_none());
    }

    #[test]
    fn later_files_take_precedence() {
        let mut sources = SourceSet::single("system.toml", "[logging]\nlevel = \"info\"\n");
        sources.files.push(("local.toml".into(), "[logging]\nlevel = \"warn\"\n".into()));
        let (_, src) = sources.locate_key(None, "logging", "level");
        assert_eq!(src.unwrap().name(), "local.toml");
        let (_, src) = sources.locate_key(Some("system.toml"), "logging", "level");
        assert_eq!(src.unwrap().name(), "system.toml");
    }

    #[test]
    fn unknown_key_points_at_key_and_suggests() {
        let text = "[plugins]\nserach_paths = [\"/a\"]\n";
        let errors = figment_errors(text);
        match &errors[0] {
            ConfigError::UnknownKey { section, key, suggestion, valid_keys, span, .. } => {
                assert_eq!(section, "plugins");
                assert_eq!(key, "serach_paths");
                assert_eq!(suggestion.as_deref(), Some("search_paths"));
                assert!(valid_keys.iter().any(|k| k == "sources"));
                assert_eq!(span.unwrap().offset(), text.find("serach_paths").unwrap());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_type_names_full_key() {
        let errors = figment_errors("[plugins]\nentry_points = \"yes\"\n");
        assert!(matches!(
            &errors[0],
            ConfigError::WrongType { key, span: Some(_), .. } if key == "plugins.entry_points"
        ));
    }

    #[test]
    fn missing_identifier_is_qualified() {
        let errors = figment_errors("[manager]\nsettings = {}\n");
        assert!(matches!(&errors[0], ConfigError::MissingKey { key, .. } if key == "manager.identifier"));
    }

    #[test]
    fn closest_match_needs_similarity() {
        assert_eq!(closest_match("levle", ["level"]), Some("level".to_string()));
        assert_eq!(closest_match("natve", ["native", "package"]), Some("native".to_string()));
        assert_eq!(closest_match("zzzzzz", ["identifier", "settings"]), None);
    }

    #[test]
    fn unreadable_help_names_variable() {
        let help = unreadable_help(Some("ASSETIO_DEFAULT_CONFIG"));
        assert!(help.contains("$ASSETIO_DEFAULT_CONFIG"));
    }
}
