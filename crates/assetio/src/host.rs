// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host identity reported to managers by the command-line tool.

use std::sync::Arc;

use assetio_core::{HostInterface, InfoDictionary};

pub const CLI_HOST_IDENTIFIER: &str = "org.assetio.cli";

pub struct CliHost;

impl HostInterface for CliHost {
    fn identifier(&self) -> String {
        CLI_HOST_IDENTIFIER.to_string()
    }

    fn display_name(&self) -> String {
        "AssetIO CLI".to_string()
    }

    fn info(&self) -> InfoDictionary {
        let mut info = InfoDictionary::new();
        info.insert("version".into(), env!("CARGO_PKG_VERSION").into());
        info
    }
}

pub fn cli_host() -> Arc<dyn HostInterface> {
    Arc::new(CliHost)
}
