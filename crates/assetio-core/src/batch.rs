// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-element batch results.
//!
//! Batch operations report one outcome per input index through a
//! [`BatchSink`]. The sink guarantees that each index reaches exactly one of
//! the host's two callbacks: duplicate and out-of-range reports are dropped,
//! and [`BatchSink::finish`] fills any index left unreported with an
//! [`BatchErrorCode::Unknown`] error.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Classification of a per-element failure. Values are stable and double as
/// process exit codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
#[repr(i32)]
pub enum BatchErrorCode {
    Unknown = 128,
    InvalidEntityReference = 129,
    MalformedEntityReference = 130,
    EntityAccessError = 131,
    EntityResolutionError = 132,
    InvalidPreflightHint = 133,
    InvalidTraitSet = 134,
}

impl BatchErrorCode {
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// A failure for a single element of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct BatchElementError {
    code: BatchErrorCode,
    message: String,
}

impl BatchElementError {
    pub fn new(code: BatchErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> BatchErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::Unknown, message)
    }

    pub fn invalid_entity_reference(message: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::InvalidEntityReference, message)
    }

    pub fn malformed_entity_reference(message: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::MalformedEntityReference, message)
    }

    pub fn entity_access_error(message: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::EntityAccessError, message)
    }

    pub fn entity_resolution_error(message: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::EntityResolutionError, message)
    }

    pub fn invalid_preflight_hint(message: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::InvalidPreflightHint, message)
    }

    pub fn invalid_trait_set(message: impl Into<String>) -> Self {
        Self::new(BatchErrorCode::InvalidTraitSet, message)
    }
}

/// Receives the outcomes of a batch operation, one per input index.
///
/// Implementations call [`success`](BatchSink::success) or
/// [`error`](BatchSink::error) once per index, in any order. The callbacks
/// are host code; the sink holds no lock while invoking them.
///
/// A sink built with [`stop_on_error`](BatchSink::stop_on_error) is aborted
/// by its first error: later outcomes are dropped and [`finish`](BatchSink::finish)
/// reports nothing more. Implementations should poll
/// [`is_aborted`](BatchSink::is_aborted) between elements and return early.
pub struct BatchSink<'a, T> {
    reported: Vec<bool>,
    stop_on_error: bool,
    aborted: bool,
    on_success: &'a mut dyn FnMut(usize, T),
    on_error: &'a mut dyn FnMut(usize, BatchElementError),
}

impl<'a, T> BatchSink<'a, T> {
    pub fn new(
        len: usize,
        on_success: &'a mut dyn FnMut(usize, T),
        on_error: &'a mut dyn FnMut(usize, BatchElementError),
    ) -> Self {
        Self {
            reported: vec![false; len],
            stop_on_error: false,
            aborted: false,
            on_success,
            on_error,
        }
    }

    /// Aborts the batch at the first error delivered.
    pub fn stop_on_error(mut self) -> Self {
        self.stop_on_error = true;
        self
    }

    pub fn stops_on_error(&self) -> bool {
        self.stop_on_error
    }

    /// True once an error has stopped the batch. Remaining elements need not
    /// be processed.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Number of elements in the batch.
    pub fn len(&self) -> usize {
        self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }

    pub fn success(&mut self, index: usize, value: T) {
        if self.accepts(index) {
            (self.on_success)(index, value);
        }
    }

    pub fn error(&mut self, index: usize, error: BatchElementError) {
        if self.accepts(index) {
            (self.on_error)(index, error);
            self.aborted = self.stop_on_error;
        }
    }

    pub fn report(&mut self, index: usize, outcome: Result<T, BatchElementError>) {
        match outcome {
            Ok(value) => self.success(index, value),
            Err(error) => self.error(index, error),
        }
    }

    pub fn is_reported(&self, index: usize) -> bool {
        self.reported.get(index).copied().unwrap_or(false)
    }

    /// Indices that have not received an outcome yet.
    pub fn unreported(&self) -> Vec<usize> {
        self.reported
            .iter()
            .enumerate()
            .filter(|(_, done)| !**done)
            .map(|(i, _)| i)
            .collect()
    }

    /// Completes the batch, delivering an `unknown` error to every index that
    /// was never reported.
    pub fn finish(mut self) {
        for index in self.unreported() {
            if self.aborted {
                break;
            }
            tracing::warn!(index, "manager reported no outcome for batch element");
            self.error(
                index,
                BatchElementError::unknown("no result was reported for this element"),
            );
        }
    }

    fn accepts(&mut self, index: usize) -> bool {
        if self.aborted {
            tracing::debug!(index, "dropping outcome reported after the batch was aborted");
            return false;
        }
        self.claim(index)
    }

    fn claim(&mut self, index: usize) -> bool {
        match self.reported.get_mut(index) {
            Some(done) if *done => {
                tracing::warn!(index, "ignoring duplicate outcome for batch element");
                false
            }
            Some(done) => {
                *done = true;
                true
            }
            None => {
                tracing::warn!(
                    index,
                    len = self.reported.len(),
                    "ignoring outcome for out-of-range batch index"
                );
                false
            }
        }
    }
}
