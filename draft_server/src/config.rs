//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use draft_engine::{
    ManagerConfig, StaticCatalog, StoreConfig, analysis::CatalogError, suggestion::GatewayConfig,
};
use std::{net::SocketAddr, path::PathBuf};

/// Default server bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Variables reported when the draft manager rejects its settings
const MANAGER_SETTINGS: &str = "SESSION_LOCK_TIMEOUT_MS/SUBSCRIBER_CAPACITY/MAX_SUGGESTIONS";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Champion catalog file, bundled sample when unset
    pub catalog_path: Option<PathBuf>,
    /// Session store and suggestion settings
    pub manager: ManagerConfig,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `catalog_override` - Optional catalog path override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but malformed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        catalog_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr(
                "SERVER_BIND",
                &std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            )?,
        };

        let catalog_path = catalog_override.or_else(|| {
            std::env::var("CHAMPION_CATALOG")
                .ok()
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
        });

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(addr) if !addr.is_empty() => Some(parse_addr("METRICS_BIND", &addr)?),
            _ => None,
        };

        let defaults = ManagerConfig::default();
        let manager = ManagerConfig {
            store: StoreConfig {
                lock_timeout_ms: parse_env_or(
                    "SESSION_LOCK_TIMEOUT_MS",
                    defaults.store.lock_timeout_ms,
                ),
                subscriber_capacity: parse_env_or(
                    "SUBSCRIBER_CAPACITY",
                    defaults.store.subscriber_capacity,
                ),
            },
            gateway: GatewayConfig {
                max_suggestions: parse_env_or(
                    "MAX_SUGGESTIONS",
                    defaults.gateway.max_suggestions,
                ),
            },
        };

        Ok(ServerConfig {
            bind,
            catalog_path,
            manager,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.manager
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: MANAGER_SETTINGS.to_string(),
                reason,
            })?;

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }

    /// Load the configured champion catalog
    ///
    /// # Errors
    ///
    /// Returns error if the catalog file cannot be read or is invalid
    pub fn load_catalog(&self) -> Result<StaticCatalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => StaticCatalog::from_path(path).map_err(|source| ConfigError::Catalog {
                path: path.display().to_string(),
                source,
            }),
            None => StaticCatalog::sample().map_err(|source| ConfigError::Catalog {
                path: "<bundled sample>".to_string(),
                source,
            }),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Failed to load champion catalog from {path}: {source}")]
    Catalog {
        path: String,
        #[source]
        source: CatalogError,
    },
}

fn parse_addr(var: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        var: var.to_string(),
        reason: format!("'{value}' is not a valid IP:PORT address"),
    })
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
