// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `assetio plugins` and `assetio managers`.

use std::io::Write;

use assetio_config::PluginsConfig;
use assetio_core::{AssetIoError, InfoDictionary};
use assetio_host::ManagerFactory;
use serde::Serialize;

use crate::host::cli_host;
use crate::output_error;

#[derive(Debug, Serialize)]
struct PluginRow {
    identifier: String,
    origin: Option<String>,
}

/// Plugins found by one source.
#[derive(Debug, Serialize)]
struct SourceListing {
    source: String,
    plugins: Vec<PluginRow>,
}

#[derive(Debug, Serialize)]
struct ManagerRow {
    identifier: String,
    display_name: String,
    info: InfoDictionary,
}

fn list_source(factory: &ManagerFactory, source: &str) -> Result<SourceListing, AssetIoError> {
    let plugins = factory
        .identifiers()?
        .into_iter()
        .map(|identifier| PluginRow {
            origin: factory.origin(&identifier).map(|origin| origin.to_string()),
            identifier,
        })
        .collect();
    Ok(SourceListing {
        source: source.to_string(),
        plugins,
    })
}

/// Scans each configured source on its own, in precedence order.
pub fn run_plugins(
    config: &PluginsConfig,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), AssetIoError> {
    let mut listings = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let single = PluginsConfig {
            sources: vec![source.clone()],
            ..config.clone()
        };
        let factory = ManagerFactory::from_config(cli_host(), &single)?;
        listings.push(list_source(&factory, source)?);
    }

    if json {
        let rendered = serde_json::to_string_pretty(&listings).map_err(output_error)?;
        writeln!(out, "{rendered}").map_err(output_error)?;
        return Ok(());
    }

    for listing in &listings {
        writeln!(out, "{}:", listing.source).map_err(output_error)?;
        if listing.plugins.is_empty() {
            writeln!(out, "  (none)").map_err(output_error)?;
        }
        for plugin in &listing.plugins {
            let written = match &plugin.origin {
                Some(origin) => writeln!(out, "  {}  {origin}", plugin.identifier),
                None => writeln!(out, "  {}", plugin.identifier),
            };
            written.map_err(output_error)?;
        }
    }
    Ok(())
}

pub fn run_managers(
    factory: &ManagerFactory,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), AssetIoError> {
    let managers: Vec<ManagerRow> = factory
        .available_managers()?
        .into_values()
        .map(|detail| ManagerRow {
            identifier: detail.identifier,
            display_name: detail.display_name,
            info: detail.info,
        })
        .collect();

    if json {
        let rendered = serde_json::to_string_pretty(&managers).map_err(output_error)?;
        writeln!(out, "{rendered}").map_err(output_error)?;
        return Ok(());
    }

    if managers.is_empty() {
        writeln!(out, "no managers found").map_err(output_error)?;
    }
    for manager in &managers {
        writeln!(out, "{}  {}", manager.identifier, manager.display_name).map_err(output_error)?;
    }
    Ok(())
}
