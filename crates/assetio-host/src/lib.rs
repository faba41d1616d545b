// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-side API of the AssetIO middleware.
//!
//! A host builds a [`ManagerFactory`] over its plugin sources, picks a
//! manager (usually the configured default), and talks to it through
//! [`Manager`]. The manager wrapper checks capabilities before dispatching,
//! guarantees exactly one outcome per batch index, and offers single-element
//! and whole-batch call shapes under an [`ErrorPolicy`].

pub mod factory;
pub mod manager;
pub mod pager;
pub mod policy;

pub use factory::{ManagerDetail, ManagerFactory};
pub use manager::{Manager, OnError, OnSuccess};
pub use pager::EntityReferencePager;
pub use policy::{ErrorPolicy, Exception, Variant};

#[cfg(test)]
mod tests {
    use super::*;
    use assetio_core::{AssetIoError, Capability, Context, EntityReference, ResolveAccess, trait_set};
    use assetio_test_utils::{MockManager, host_session, mock_reference};

    fn manager(mock: MockManager) -> Manager {
        Manager::new(Box::new(mock), host_session())
    }

    #[test]
    fn handles_can_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        fn assert_send<T: Send>() {}
        assert_send_sync::<Manager>();
        assert_send_sync::<ManagerFactory>();
        assert_send::<EntityReferencePager>();
    }

    #[test]
    fn gated_operation_without_capability_is_unsupported() {
        let manager = manager(MockManager::new().minimal());
        let err = manager
            .resolve_one::<Exception>(
                &mock_reference("cat"),
                &trait_set(["animal"]),
                ResolveAccess::Read,
                &Context::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AssetIoError::CapabilityUnsupported {
                capability: Capability::Resolution,
                ..
            }
        ));
    }

    #[test]
    fn create_entity_reference_rejects_foreign_strings() {
        let manager = manager(MockManager::new());
        assert!(manager.create_entity_reference_if_valid("file:///tmp/x").is_none());
        assert_eq!(
            manager.create_entity_reference("mock:///cat").unwrap(),
            EntityReference::new("mock:///cat")
        );
        assert!(matches!(
            manager.create_entity_reference("file:///tmp/x").unwrap_err(),
            AssetIoError::InputValidation(_)
        ));
    }
}
