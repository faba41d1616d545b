// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the AssetIO middleware.

use thiserror::Error;

use crate::batch::BatchElementError;
use crate::types::Capability;

/// The primary error type used across the protocol traits, plugin loading
/// and host-side dispatch.
#[derive(Debug, Error)]
pub enum AssetIoError {
    /// Configuration errors (bad search paths, malformed settings files).
    #[error("configuration error: {0}")]
    Config(String),

    /// Synchronous input validation failures (empty composite child list,
    /// malformed entity reference, mismatched batch lengths).
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// A named item (plugin, manager) could not be found.
    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: &'static str,
        identifier: String,
    },

    /// An optional protocol method was invoked but the implementation does
    /// not provide it.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// The dispatch layer refused to call a method gated by a capability the
    /// manager does not advertise.
    #[error("manager '{manager}' does not support the '{capability}' capability")]
    CapabilityUnsupported {
        manager: String,
        capability: Capability,
    },

    /// A per-element failure raised through the exception-style call shape.
    #[error("batch element {index} failed: {error}")]
    BatchElement {
        index: usize,
        error: BatchElementError,
    },

    /// A plugin unit failed to load.
    #[error("plugin load error: {message}")]
    PluginLoad {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Errors raised by a manager implementation for a whole call.
    #[error("manager error: {message}")]
    Manager {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AssetIoError {
    /// Shorthand for a [`AssetIoError::NotFound`] naming a plugin identifier.
    pub fn plugin_not_found(identifier: impl Into<String>) -> Self {
        AssetIoError::NotFound {
            kind: "plugin",
            identifier: identifier.into(),
        }
    }

    /// Shorthand for a [`AssetIoError::Manager`] without an underlying source.
    pub fn manager(message: impl Into<String>) -> Self {
        AssetIoError::Manager {
            message: message.into(),
            source: None,
        }
    }

    /// Process exit code for command-line style use.
    ///
    /// Element failures exit with their numeric error code; everything else
    /// exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            AssetIoError::BatchElement { error, .. } => error.code().value(),
            _ => 1,
        }
    }
}
