// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call shapes for the convenience forms of batch operations.
//!
//! Every batch operation on [`crate::Manager`] has a raw callback form and
//! `_one`/`_all` forms generic over an [`ErrorPolicy`]:
//!
//! - [`Exception`]: the first element error reported stops the batch and
//!   is raised as [`AssetIoError::BatchElement`].
//! - [`Variant`]: each element yields `Result<T, BatchElementError>` and the
//!   call only fails as a whole.

use std::cell::RefCell;

use assetio_core::{AssetIoError, BatchElementError, BatchSink};

use crate::manager::{OnError, OnSuccess};

/// Decides how per-element errors surface from `_one`/`_all` calls.
pub trait ErrorPolicy {
    /// Result of a single-element call.
    type One<T>;
    /// Result of a whole-batch call.
    type All<T>;

    /// Whether the first element error stops the rest of the batch.
    const STOP_ON_ERROR: bool;

    fn one<T>(outcome: Result<T, BatchElementError>) -> Result<Self::One<T>, AssetIoError>;

    fn all<T>(outcomes: Vec<Result<T, BatchElementError>>) -> Result<Self::All<T>, AssetIoError>;
}

/// Element errors are raised as [`AssetIoError::BatchElement`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Exception;

/// Element errors are returned in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Variant;

impl ErrorPolicy for Exception {
    type One<T> = T;
    type All<T> = Vec<T>;

    const STOP_ON_ERROR: bool = true;

    fn one<T>(outcome: Result<T, BatchElementError>) -> Result<T, AssetIoError> {
        outcome.map_err(|error| AssetIoError::BatchElement { index: 0, error })
    }

    fn all<T>(outcomes: Vec<Result<T, BatchElementError>>) -> Result<Vec<T>, AssetIoError> {
        outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                outcome.map_err(|error| AssetIoError::BatchElement { index, error })
            })
            .collect()
    }
}

impl ErrorPolicy for Variant {
    type One<T> = Result<T, BatchElementError>;
    type All<T> = Vec<Result<T, BatchElementError>>;

    const STOP_ON_ERROR: bool = false;

    fn one<T>(
        outcome: Result<T, BatchElementError>,
    ) -> Result<Result<T, BatchElementError>, AssetIoError> {
        Ok(outcome)
    }

    fn all<T>(
        outcomes: Vec<Result<T, BatchElementError>>,
    ) -> Result<Vec<Result<T, BatchElementError>>, AssetIoError> {
        Ok(outcomes)
    }
}

/// Where a batch run sends its outcomes.
pub(crate) struct Delivery<'a, T> {
    pub(crate) on_success: OnSuccess<'a, T>,
    pub(crate) on_error: OnError<'a>,
    pub(crate) stop_on_error: bool,
}

impl<'a, T> Delivery<'a, T> {
    /// Every index gets exactly one outcome.
    pub(crate) fn every(on_success: OnSuccess<'a, T>, on_error: OnError<'a>) -> Self {
        Self {
            on_success,
            on_error,
            stop_on_error: false,
        }
    }
}

/// Runs `call` and gathers one outcome per index, in input order. The first
/// report for an index wins; indices never reported become `unknown` errors.
///
/// With `stop_on_error`, the batch stops at the first error delivered and
/// that error is returned as [`AssetIoError::BatchElement`].
pub(crate) fn collect<T, F>(
    len: usize,
    stop_on_error: bool,
    call: F,
) -> Result<Vec<Result<T, BatchElementError>>, AssetIoError>
where
    F: FnOnce(Delivery<'_, T>) -> Result<(), AssetIoError>,
{
    let mut slots: Vec<Option<Result<T, BatchElementError>>> = (0..len).map(|_| None).collect();
    let mut stopped = None;
    {
        let slots = RefCell::new(&mut slots);
        let mut on_success = |index: usize, value: T| {
            if let Some(slot) = slots.borrow_mut().get_mut(index) {
                slot.get_or_insert(Ok(value));
            }
        };
        let mut on_error = |index: usize, error: BatchElementError| {
            if stop_on_error {
                stopped.get_or_insert((index, error));
            } else if let Some(slot) = slots.borrow_mut().get_mut(index) {
                slot.get_or_insert(Err(error));
            }
        };
        call(Delivery {
            on_success: &mut on_success,
            on_error: &mut on_error,
            stop_on_error,
        })?;
    }
    if let Some((index, error)) = stopped {
        return Err(AssetIoError::BatchElement { index, error });
    }
    Ok(slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| Err(BatchElementError::unknown("no result was reported for this element")))
        })
        .collect())
}

/// Drives one [`BatchSink`] run into `delivery`.
///
/// The sink is finished only when `call` succeeds; a whole-call error leaves
/// unreported indices untouched.
pub(crate) fn run_sink<T, F>(len: usize, delivery: Delivery<'_, T>, call: F) -> Result<(), AssetIoError>
where
    F: FnOnce(&mut BatchSink<'_, T>) -> Result<(), AssetIoError>,
{
    let mut sink = BatchSink::new(len, delivery.on_success, delivery.on_error);
    if delivery.stop_on_error {
        sink = sink.stop_on_error();
    }
    call(&mut sink)?;
    sink.finish();
    Ok(())
}
