// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host identity exposed to manager implementations.

use std::fmt;
use std::sync::Arc;

use crate::types::InfoDictionary;

/// Implemented by the application embedding the middleware.
pub trait HostInterface: Send + Sync {
    /// Unique, stable identifier of the host application.
    fn identifier(&self) -> String;

    /// Human-readable name of the host application.
    fn display_name(&self) -> String;

    /// Free-form metadata about the host.
    fn info(&self) -> InfoDictionary {
        InfoDictionary::new()
    }
}

/// Passed to every manager implementation call, giving access to the host
/// making the request.
#[derive(Clone)]
pub struct HostSession {
    host: Arc<dyn HostInterface>,
}

impl HostSession {
    pub fn new(host: Arc<dyn HostInterface>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &dyn HostInterface {
        self.host.as_ref()
    }

    pub fn host_identifier(&self) -> String {
        self.host.identifier()
    }
}

impl fmt::Debug for HostSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSession")
            .field("host", &self.host.identifier())
            .finish()
    }
}
