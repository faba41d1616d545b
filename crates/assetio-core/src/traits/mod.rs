// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol traits shared by hosts, managers and plugins.

pub mod host;
pub mod manager;
pub mod pager;
pub mod plugin;

pub use host::{HostInterface, HostSession};
pub use manager::ManagerInterface;
pub use pager::{EmptyPager, EntityReferencePagerInterface};
pub use plugin::PluginProvider;
