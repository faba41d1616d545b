// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A host application stand-in.

use std::sync::Arc;

use assetio_core::{HostInterface, HostSession, InfoDictionary};

pub const MOCK_HOST_IDENTIFIER: &str = "org.assetio.test.host";

#[derive(Debug, Default, Clone, Copy)]
pub struct MockHost;

impl HostInterface for MockHost {
    fn identifier(&self) -> String {
        MOCK_HOST_IDENTIFIER.to_string()
    }

    fn display_name(&self) -> String {
        "Mock Host".to_string()
    }

    fn info(&self) -> InfoDictionary {
        let mut info = InfoDictionary::new();
        info.insert("test".into(), true.into());
        info
    }
}

pub fn mock_host() -> Arc<dyn HostInterface> {
    Arc::new(MockHost)
}

pub fn host_session() -> HostSession {
    HostSession::new(mock_host())
}
