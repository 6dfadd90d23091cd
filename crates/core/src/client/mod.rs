//! Cluster API access.
//!
//! Command handlers depend on [`UserIdentityMappingInterface`] and obtain an
//! implementation through a [`ClientFactory`], so the REST transport can be
//! replaced in tests.

pub mod rest;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{ClientConfig, ConfigOverrides};
use crate::errors::{ApiError, ConfigError};
use crate::models::UserIdentityMapping;

pub use rest::RestClient;

/// Operations on the `useridentitymappings` resource.
#[async_trait]
pub trait UserIdentityMappingInterface: Send + Sync {
    /// Persist `mapping` and return the object as stored by the server.
    async fn create(&self, mapping: &UserIdentityMapping)
        -> Result<UserIdentityMapping, ApiError>;
}

/// Builds API clients from the ambient connection settings.
pub trait ClientFactory {
    type Client: UserIdentityMappingInterface;

    fn user_identity_mappings(&self) -> Result<Self::Client, ConfigError>;
}

/// Factory resolving a [`ClientConfig`] from file, environment and flags,
/// then building a [`RestClient`] from it.
#[derive(Debug, Clone)]
pub struct ConfigClientFactory {
    config_path: PathBuf,
    overrides: ConfigOverrides,
}

impl ConfigClientFactory {
    pub fn new(config_path: impl Into<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self {
            config_path: config_path.into(),
            overrides,
        }
    }

    /// The fully resolved and validated connection settings.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::resolve(&self.config_path, &self.overrides)
    }
}

impl ClientFactory for ConfigClientFactory {
    type Client = RestClient;

    fn user_identity_mappings(&self) -> Result<RestClient, ConfigError> {
        let config = self.client_config()?;
        debug!(server = %config.cluster.server, "building REST client");
        RestClient::from_config(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_missing_server() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[auth]\ntoken_env = \"TEST_FACTORY_UNSET_TOKEN\"\n").unwrap();

        // USERMAP_SERVER in the test environment would mask the failure.
        if std::env::var(crate::config::SERVER_ENV).is_ok() {
            return;
        }

        let factory = ConfigClientFactory::new(&path, ConfigOverrides::default());
        assert!(matches!(
            factory.user_identity_mappings(),
            Err(ConfigError::MissingServer)
        ));
    }

    #[test]
    fn test_factory_builds_client_from_overrides() {
        let factory = ConfigClientFactory::new(
            "/nonexistent/usermap.toml",
            ConfigOverrides {
                server: Some("http://127.0.0.1:6443/".into()),
                token: Some("t0ken".into()),
                insecure_skip_tls_verify: false,
            },
        );
        let client = factory.user_identity_mappings().unwrap();
        assert_eq!(client.server(), "http://127.0.0.1:6443");
    }
}
