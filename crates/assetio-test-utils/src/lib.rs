// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for AssetIO integration tests.
//!
//! Provides in-memory managers, providers, loaders and fake native binaries
//! for fast, deterministic tests that never touch real shared libraries.
//!
//! # Components
//!
//! - [`MockManager`] - In-memory manager implementing every capability
//! - [`MockProvider`] - Provider producing clones of a template `MockManager`
//! - [`MockSourceLoader`] - Source loader over an in-memory path map
//! - [`FakeBinaryOpener`] - Stand-in for the shared library loader
//! - [`MockHost`] - Host application identity
//! - [`PluginDirs`] - Temporary plugin search directories

pub mod fake_binary;
pub mod fixtures;
pub mod host;
pub mod mock_loader;
pub mod mock_manager;
pub mod mock_provider;

pub use fake_binary::{FakeBinary, FakeBinaryOpener, write_binary};
pub use fixtures::PluginDirs;
pub use host::{MOCK_HOST_IDENTIFIER, MockHost, host_session, mock_host};
pub use mock_loader::MockSourceLoader;
pub use mock_manager::{
    MANAGED_TRAIT, MOCK_MANAGER_IDENTIFIER, MOCK_REFERENCE_PREFIX, MockManager, MockPager, MockState,
    mock_reference,
};
pub use mock_provider::MockProvider;
