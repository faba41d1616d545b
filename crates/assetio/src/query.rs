// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `assetio resolve` and `assetio exists`.
//!
//! Both commands send every reference in one batch. Successful elements are
//! printed to stdout; each failed element is reported on stderr, and the
//! first one becomes the command's error so the process exits with its code.

use std::io::Write;

use assetio_core::{
    Access, AssetIoError, BatchElementError, Context, EntityReference, ResolveAccess, trait_set,
};
use assetio_host::{Manager, Variant};

use crate::output_error;

fn parse_references(manager: &Manager, references: &[String]) -> Result<Vec<EntityReference>, AssetIoError> {
    references
        .iter()
        .map(|reference| manager.create_entity_reference(reference))
        .collect()
}

fn read_context(manager: &Manager) -> Result<Context, AssetIoError> {
    let mut context = manager.create_context()?;
    context.access = Access::Read;
    Ok(context)
}

/// Reports `error` on stderr and keeps the first one.
fn element_failed(
    reference: &EntityReference,
    index: usize,
    error: BatchElementError,
    first: &mut Option<AssetIoError>,
) {
    eprintln!("assetio: {reference}: {error}");
    first.get_or_insert(AssetIoError::BatchElement { index, error });
}

pub fn run_resolve(
    manager: &Manager,
    references: &[String],
    traits: &[String],
    out: &mut dyn Write,
) -> Result<(), AssetIoError> {
    let references = parse_references(manager, references)?;
    let context = read_context(manager)?;
    let traits = trait_set(traits.iter().cloned());

    let outcomes =
        manager.resolve_all::<Variant>(&references, &traits, ResolveAccess::Read, &context)?;

    let mut resolved = serde_json::Map::new();
    let mut first_error = None;
    for (index, (reference, outcome)) in references.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(data) => {
                let value = serde_json::to_value(&data).map_err(output_error)?;
                resolved.insert(reference.to_string(), value);
            }
            Err(error) => element_failed(reference, index, error, &mut first_error),
        }
    }

    let rendered = serde_json::to_string_pretty(&resolved).map_err(output_error)?;
    writeln!(out, "{rendered}").map_err(output_error)?;
    first_error.map_or(Ok(()), Err)
}

pub fn run_exists(
    manager: &Manager,
    references: &[String],
    out: &mut dyn Write,
) -> Result<(), AssetIoError> {
    let references = parse_references(manager, references)?;
    let context = read_context(manager)?;

    let outcomes = manager.entity_exists_all::<Variant>(&references, &context)?;

    let mut first_error = None;
    for (index, (reference, outcome)) in references.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(exists) => writeln!(out, "{reference}\t{exists}").map_err(output_error)?,
            Err(error) => element_failed(reference, index, error, &mut first_error),
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetio_core::{BatchErrorCode, TraitsData};
    use assetio_test_utils::{MockManager, host_session};

    fn manager() -> Manager {
        let mock = MockManager::new()
            .with_entity("cat", TraitsData::with_traits(["animal", "furry"]))
            .with_entity("dog", TraitsData::with_traits(["animal"]));
        Manager::new(Box::new(mock), host_session())
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolve_prints_json_keyed_by_reference() {
        let mut out = Vec::new();
        run_resolve(
            &manager(),
            &strings(&["mock:///cat", "mock:///dog"]),
            &strings(&["furry"]),
            &mut out,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let resolved: TraitsData = serde_json::from_value(value["mock:///cat"].clone()).unwrap();
        assert!(resolved.has_trait("furry"));
        assert!(!resolved.has_trait("animal"));
        assert!(value.get("mock:///dog").is_some());
    }

    #[test]
    fn resolve_failure_keeps_other_results_and_reports_code() {
        let mut out = Vec::new();
        let err = run_resolve(
            &manager(),
            &strings(&["mock:///cat", "mock:///missing"]),
            &strings(&["animal"]),
            &mut out,
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), BatchErrorCode::EntityResolutionError.value());
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("mock:///cat").is_some());
        assert!(value.get("mock:///missing").is_none());
    }

    #[test]
    fn malformed_reference_is_input_error() {
        let mut out = Vec::new();
        let err = run_exists(&manager(), &strings(&["file:///cat"]), &mut out).unwrap_err();
        assert!(matches!(err, AssetIoError::InputValidation(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn exists_prints_one_line_per_reference() {
        let mut out = Vec::new();
        run_exists(&manager(), &strings(&["mock:///cat", "mock:///bird"]), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "mock:///cat\ttrue\nmock:///bird\tfalse\n"
        );
    }
}
