// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AssetIO command-line tool.
//!
//! Lists the manager plugins visible to this machine and queries the
//! configured default manager.

mod host;
mod plugins;
mod query;

use std::process::ExitCode;

use assetio_config::{AssetIoConfig, DEFAULT_MANAGER_CONFIG_VAR};
use assetio_core::AssetIoError;
use assetio_host::{Manager, ManagerFactory};
use clap::{Parser, Subcommand};

/// AssetIO - asset management middleware.
#[derive(Parser, Debug)]
#[command(name = "assetio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List discovered plugins for each configured source.
    Plugins {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the managers available to this host.
    Managers {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Resolve traits for entity references with the default manager.
    Resolve {
        /// Entity references to resolve.
        #[arg(required = true)]
        references: Vec<String>,
        /// Trait to resolve. Repeat for several traits.
        #[arg(long = "trait", value_name = "ID", required = true)]
        traits: Vec<String>,
    },
    /// Check whether entities exist in the default manager.
    Exists {
        /// Entity references to check.
        #[arg(required = true)]
        references: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match assetio_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            assetio_config::render_errors(&errors);
            return ExitCode::from(1);
        }
    };
    init_tracing(&config.logging.level);
    tracing::debug!(command = ?cli.command, "running command");

    let mut stdout = std::io::stdout().lock();
    match run(cli.command, &config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Element errors have already been reported per reference.
            if !matches!(e, AssetIoError::BatchElement { .. }) {
                eprintln!("assetio: {e}");
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

fn run(
    command: Commands,
    config: &AssetIoConfig,
    out: &mut dyn std::io::Write,
) -> Result<(), AssetIoError> {
    match command {
        Commands::Plugins { json } => plugins::run_plugins(&config.plugins, json, out),
        Commands::Managers { json } => {
            let factory = ManagerFactory::from_config(host::cli_host(), &config.plugins)?;
            plugins::run_managers(&factory, json, out)
        }
        Commands::Resolve { references, traits } => {
            let manager = default_manager(config)?;
            query::run_resolve(&manager, &references, &traits, out)
        }
        Commands::Exists { references } => {
            let manager = default_manager(config)?;
            query::run_exists(&manager, &references, out)
        }
    }
}

/// The manager named by `ASSETIO_DEFAULT_CONFIG`, else by `[manager]`.
fn default_manager(config: &AssetIoConfig) -> Result<Manager, AssetIoError> {
    let factory = ManagerFactory::from_config(host::cli_host(), &config.plugins)?;
    if let Some(manager) = factory.default_manager_from_env()? {
        return Ok(manager);
    }
    match &config.manager {
        Some(manager) => factory.manager_from_config(manager),
        None => Err(AssetIoError::Config(format!(
            "no default manager configured: add a [manager] section to assetio.toml or set {DEFAULT_MANAGER_CONFIG_VAR}"
        ))),
    }
}

pub(crate) fn output_error(e: impl std::fmt::Display) -> AssetIoError {
    AssetIoError::Internal(format!("cannot write output: {e}"))
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_takes_repeated_traits() {
        let cli = Cli::try_parse_from([
            "assetio",
            "resolve",
            "mock:///a",
            "mock:///b",
            "--trait",
            "animal",
            "--trait",
            "furry",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve { references, traits } => {
                assert_eq!(references, vec!["mock:///a", "mock:///b"]);
                assert_eq!(traits, vec!["animal", "furry"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn resolve_requires_a_trait() {
        assert!(Cli::try_parse_from(["assetio", "resolve", "mock:///a"]).is_err());
    }

    #[test]
    fn missing_default_manager_is_config_error() {
        let config = AssetIoConfig::default();
        // The surrounding environment may name a default manager.
        if std::env::var_os(DEFAULT_MANAGER_CONFIG_VAR).is_some() {
            return;
        }
        let err = default_manager(&config).unwrap_err();
        assert!(matches!(err, AssetIoError::Config(_)));
        assert!(err.to_string().contains("[manager]"));
    }
}
