// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition of several implementation factories into one.

use std::collections::BTreeSet;
use std::sync::Arc;

use assetio_core::{AssetIoError, ManagerInterface};

use crate::factory::ManagerImplementationFactory;
use crate::registry::Origin;

/// Combines child factories with first-match-wins precedence by list order.
///
/// The composite owns its children; callers may drop their own references.
pub struct HybridFactory {
    children: Vec<Arc<dyn ManagerImplementationFactory>>,
}

impl HybridFactory {
    pub fn new(children: Vec<Arc<dyn ManagerImplementationFactory>>) -> Result<Self, AssetIoError> {
        if children.is_empty() {
            return Err(AssetIoError::InputValidation(
                "HybridFactory requires at least one child factory".to_string(),
            ));
        }
        Ok(Self { children })
    }

    pub fn children(&self) -> &[Arc<dyn ManagerImplementationFactory>] {
        &self.children
    }

    /// The first child reporting `identifier`, in list order.
    fn owner(
        &self,
        identifier: &str,
    ) -> Result<Option<&Arc<dyn ManagerImplementationFactory>>, AssetIoError> {
        for child in &self.children {
            if child.identifiers()?.iter().any(|id| id == identifier) {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }
}

impl ManagerImplementationFactory for HybridFactory {
    /// The sorted union of every child's identifiers.
    fn identifiers(&self) -> Result<Vec<String>, AssetIoError> {
        let mut all = BTreeSet::new();
        for child in &self.children {
            all.extend(child.identifiers()?);
        }
        Ok(all.into_iter().collect())
    }

    fn instantiate(&self, identifier: &str) -> Result<Box<dyn ManagerInterface>, AssetIoError> {
        match self.owner(identifier)? {
            Some(child) => child.instantiate(identifier),
            None => Err(AssetIoError::plugin_not_found(identifier)),
        }
    }

    fn origin(&self, identifier: &str) -> Option<Origin> {
        self.owner(identifier).ok().flatten()?.origin(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubProvider;
    use assetio_core::PluginProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A fixed set of identifiers, each producing a manager tagged `tag`.
    struct FixedFactory {
        ids: Vec<&'static str>,
        tag: &'static str,
        instantiations: AtomicUsize,
    }

    impl FixedFactory {
        fn new(ids: Vec<&'static str>, tag: &'static str) -> Arc<Self> {
            Arc::new(Self {
                ids,
                tag,
                instantiations: AtomicUsize::new(0),
            })
        }
    }

    impl ManagerImplementationFactory for FixedFactory {
        fn identifiers(&self) -> Result<Vec<String>, AssetIoError> {
            Ok(self.ids.iter().map(|s| s.to_string()).collect())
        }

        fn instantiate(&self, identifier: &str) -> Result<Box<dyn ManagerInterface>, AssetIoError> {
            if !self.ids.iter().any(|id| *id == identifier) {
                return Err(AssetIoError::plugin_not_found(identifier));
            }
            self.instantiations.fetch_add(1, Ordering::SeqCst);
            StubProvider::new(identifier, self.tag).create_manager()
        }

        fn origin(&self, _identifier: &str) -> Option<Origin> {
            Some(Origin::Static(self.tag.to_string()))
        }
    }

    #[test]
    fn empty_child_list_is_rejected() {
        let err = HybridFactory::new(Vec::new()).err().unwrap();
        assert!(matches!(err, AssetIoError::InputValidation(_)));
    }

    #[test]
    fn identifiers_are_sorted_union_without_duplicates() {
        let hybrid = HybridFactory::new(vec![
            FixedFactory::new(vec!["org.z", "org.shared"], "first"),
            FixedFactory::new(vec!["org.shared", "org.a"], "second"),
        ])
        .unwrap();
        assert_eq!(hybrid.identifiers().unwrap(), vec!["org.a", "org.shared", "org.z"]);
    }

    #[test]
    fn first_child_wins_and_later_children_are_not_instantiated() {
        let first = FixedFactory::new(vec!["org.shared"], "first");
        let second = FixedFactory::new(vec!["org.shared", "org.only_second"], "second");
        let hybrid = HybridFactory::new(vec![first.clone(), second.clone()]).unwrap();

        let manager = hybrid.instantiate("org.shared").unwrap();
        assert_eq!(manager.display_name(), "first");
        assert_eq!(second.instantiations.load(Ordering::SeqCst), 0);
        assert_eq!(hybrid.origin("org.shared"), Some(Origin::Static("first".into())));

        let manager = hybrid.instantiate("org.only_second").unwrap();
        assert_eq!(manager.display_name(), "second");
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let hybrid = HybridFactory::new(vec![FixedFactory::new(vec!["org.a"], "a")]).unwrap();
        let err = hybrid.instantiate("org.missing").err().unwrap();
        assert!(matches!(err, AssetIoError::NotFound { .. }));
        assert!(hybrid.origin("org.missing").is_none());
    }

    #[test]
    fn children_are_retained_after_caller_drops_them() {
        let child = FixedFactory::new(vec!["org.a"], "a");
        let hybrid = HybridFactory::new(vec![child.clone()]).unwrap();
        drop(child);
        assert_eq!(hybrid.children().len(), 1);
        assert!(hybrid.instantiate("org.a").is_ok());
    }
}
