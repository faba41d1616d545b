// SPDX-FileCopyrightText: 2026 AssetIO Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host entry point for discovering and instantiating managers.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use assetio_config::{
    ConfigError, ManagerConfig, PluginsConfig, load_default_manager,
    load_default_manager_from_env, model::{NATIVE_SOURCE, PACKAGE_SOURCE},
};
use assetio_core::{AssetIoError, HostInterface, HostSession, InfoDictionary};
use assetio_plugin::{
    HybridFactory, ManagerImplementationFactory, NativeSourceLoader, Origin, PackageSourceLoader,
    PluginImplementationFactory, SearchPaths,
};

use crate::manager::Manager;

/// Identity of a manager available to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerDetail {
    pub identifier: String,
    pub display_name: String,
    pub info: InfoDictionary,
}

/// Creates [`Manager`]s for one host from a set of plugin sources.
#[derive(Clone)]
pub struct ManagerFactory {
    host: HostSession,
    implementations: Arc<dyn ManagerImplementationFactory>,
}

fn config_errors(errors: Vec<ConfigError>) -> AssetIoError {
    AssetIoError::Config(
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    )
}

impl ManagerFactory {
    pub fn new(
        host: Arc<dyn HostInterface>,
        implementations: Arc<dyn ManagerImplementationFactory>,
    ) -> Self {
        Self {
            host: HostSession::new(host),
            implementations,
        }
    }

    /// Builds the configured plugin sources, in precedence order.
    pub fn from_config(
        host: Arc<dyn HostInterface>,
        config: &PluginsConfig,
    ) -> Result<Self, AssetIoError> {
        let search_paths = if config.search_paths.is_empty() {
            SearchPaths::EnvVar(config.search_path_var.clone())
        } else {
            SearchPaths::Explicit(config.search_paths.clone())
        };

        let mut children: Vec<Arc<dyn ManagerImplementationFactory>> = Vec::new();
        for source in &config.sources {
            match source.as_str() {
                NATIVE_SOURCE => children.push(Arc::new(PluginImplementationFactory::new(
                    NativeSourceLoader::new(),
                    search_paths.clone(),
                ))),
                PACKAGE_SOURCE => {
                    let loader = PackageSourceLoader::new()
                        .with_entry_points(config.entry_points)
                        .with_entry_point_group(config.entry_point_group.clone())
                        .with_disable_var(config.entry_points_disable_var.clone());
                    children.push(Arc::new(PluginImplementationFactory::new(
                        loader,
                        search_paths.clone(),
                    )));
                }
                other => {
                    return Err(AssetIoError::Config(format!(
                        "unknown plugin source '{other}'"
                    )));
                }
            }
        }
        tracing::debug!(sources = ?config.sources, search_paths = ?search_paths, "configured plugin sources");

        Ok(Self::new(host, Arc::new(HybridFactory::new(children)?)))
    }

    pub fn host_session(&self) -> &HostSession {
        &self.host
    }

    /// Sorted identifiers of every discoverable manager.
    pub fn identifiers(&self) -> Result<Vec<String>, AssetIoError> {
        self.implementations.identifiers()
    }

    pub fn origin(&self, identifier: &str) -> Option<Origin> {
        self.implementations.origin(identifier)
    }

    /// Instantiates each discoverable manager to read its identity.
    /// Managers that fail to instantiate are logged and left out.
    pub fn available_managers(&self) -> Result<BTreeMap<String, ManagerDetail>, AssetIoError> {
        let mut details = BTreeMap::new();
        for identifier in self.identifiers()? {
            match self.implementations.instantiate(&identifier) {
                Ok(interface) => {
                    details.insert(
                        identifier.clone(),
                        ManagerDetail {
                            identifier,
                            display_name: interface.display_name(),
                            info: interface.info(),
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!(identifier = %identifier, error = %e, "skipping manager that failed to instantiate");
                }
            }
        }
        Ok(details)
    }

    /// An uninitialized manager for `identifier`.
    pub fn create_manager(&self, identifier: &str) -> Result<Manager, AssetIoError> {
        let interface = self.implementations.instantiate(identifier)?;
        tracing::debug!(identifier = %identifier, origin = ?self.origin(identifier), "created manager");
        Ok(Manager::new(interface, self.host.clone()))
    }

    /// Creates and initializes the manager described by `config`.
    pub fn manager_from_config(&self, config: &ManagerConfig) -> Result<Manager, AssetIoError> {
        let manager = self.create_manager(&config.identifier)?;
        manager.initialize(config.settings.clone())?;
        Ok(manager)
    }

    /// The manager named by a default manager file.
    pub fn default_manager_for_interface(&self, path: &Path) -> Result<Manager, AssetIoError> {
        let config = load_default_manager(path).map_err(config_errors)?;
        self.manager_from_config(&config)
    }

    /// The manager named by the file in `ASSETIO_DEFAULT_CONFIG`, or `None`
    /// when the variable is not set.
    pub fn default_manager_from_env(&self) -> Result<Option<Manager>, AssetIoError> {
        match load_default_manager_from_env() {
            None => Ok(None),
            Some(config) => {
                let config = config.map_err(config_errors)?;
                self.manager_from_config(&config).map(Some)
            }
        }
    }
}

impl std::fmt::Debug for ManagerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerFactory")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetio_config::model::KNOWN_SOURCES;
    use assetio_test_utils::{
        MOCK_MANAGER_IDENTIFIER, MockProvider, MockSourceLoader, mock_host,
    };

    fn factory() -> ManagerFactory {
        let loader = MockSourceLoader::new().with_path(
            "/mock",
            vec![
                MockProvider::new(MOCK_MANAGER_IDENTIFIER, "Mock").into_arc(),
                MockProvider::new("org.example.second", "Second").into_arc(),
            ],
        );
        let implementations =
            PluginImplementationFactory::new(loader, SearchPaths::Explicit(vec!["/mock".into()]));
        ManagerFactory::new(mock_host(), Arc::new(implementations))
    }

    #[test]
    fn identifiers_are_sorted() {
        assert_eq!(
            factory().identifiers().unwrap(),
            vec![MOCK_MANAGER_IDENTIFIER.to_string(), "org.example.second".to_string()]
        );
    }

    #[test]
    fn available_managers_carry_display_names() {
        let managers = factory().available_managers().unwrap();
        assert_eq!(managers.len(), 2);
        assert_eq!(managers["org.example.second"].display_name, "Second");
        assert_eq!(managers[MOCK_MANAGER_IDENTIFIER].identifier, MOCK_MANAGER_IDENTIFIER);
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let err = factory().create_manager("org.example.missing").unwrap_err();
        assert!(matches!(err, AssetIoError::NotFound { .. }));
    }

    #[test]
    fn manager_from_config_initializes() {
        let config = ManagerConfig {
            identifier: MOCK_MANAGER_IDENTIFIER.to_string(),
            settings: Default::default(),
        };
        let manager = factory().manager_from_config(&config).unwrap();
        assert_eq!(manager.identifier(), MOCK_MANAGER_IDENTIFIER);
    }

    #[test]
    fn from_config_accepts_every_known_source() {
        let config = PluginsConfig {
            search_paths: vec!["/nonexistent/assetio".into()],
            entry_points: false,
            sources: KNOWN_SOURCES.iter().map(ToString::to_string).collect(),
            ..PluginsConfig::default()
        };
        let factory = ManagerFactory::from_config(mock_host(), &config).unwrap();
        assert!(factory.identifiers().unwrap().is_empty());
    }

    #[test]
    fn from_config_rejects_unknown_source() {
        let config = PluginsConfig {
            sources: vec!["bogus".to_string()],
            ..PluginsConfig::default()
        };
        let err = ManagerFactory::from_config(mock_host(), &config).unwrap_err();
        assert!(matches!(err, AssetIoError::Config(_)));
    }
}
