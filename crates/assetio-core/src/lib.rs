// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the AssetIO middleware.
//!
//! This crate provides the protocol traits a manager plugin implements, the
//! value types exchanged between host and manager, and the error taxonomy
//! shared by the rest of the workspace. Plugins only need to depend on this
//! crate.

pub mod batch;
pub mod context;
pub mod declaration;
pub mod error;
pub mod traits;
pub mod traits_data;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use batch::{BatchElementError, BatchErrorCode, BatchSink};
pub use context::{Context, ManagerState};
pub use declaration::PluginDeclaration;
pub use error::AssetIoError;
pub use traits_data::TraitsData;
pub use types::{
    Access, Capability, DefaultEntityAccess, EntityReference, EntityTraitsAccess, InfoDictionary,
    PolicyAccess, PropertyValue, PublishingAccess, RelationsAccess, ResolveAccess, Settings,
    StrMap, TraitSet, trait_set,
};

pub use traits::manager::BoxedPager;
pub use traits::{
    EmptyPager, EntityReferencePagerInterface, HostInterface, HostSession, ManagerInterface,
    PluginProvider,
};

/// Version of this crate, recorded by native plugins at build time.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
