use crate::config::ServerConfig;
use crate::services::Services;
use anyhow::{Context, Result};
use database_layer::{DatabasePool, Repositories};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct HospitalServer {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// PostgreSQL pool; `None` when running on the in-memory store
    pub database: Option<DatabasePool>,
    /// Repositories backing the services
    pub repositories: Repositories,
    /// Business services
    pub services: Services,
}

impl HospitalServer {
    /// Connect to PostgreSQL when a URL is configured, otherwise fall back
    /// to the in-memory store.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let Some(url) = config.database.url.clone() else {
            warn!("No database URL configured, using the in-memory store");
            return Ok(Self::with_repositories(config, Repositories::in_memory()));
        };

        let database = DatabasePool::new(&url, &config.pool_settings())
            .await
            .context("Failed to connect to the database")?;
        if config.database.run_migrations {
            database
                .migrate()
                .await
                .context("Failed to run database migrations")?;
        }
        info!(
            max_connections = config.database.max_connections,
            "Connected to PostgreSQL"
        );

        let repositories = Repositories::postgres(&database);
        Ok(Self {
            config: Arc::new(config),
            database: Some(database),
            services: Services::new(repositories.clone()),
            repositories,
        })
    }

    /// Build the state over an existing set of repositories
    pub fn with_repositories(config: ServerConfig, repositories: Repositories) -> Self {
        Self {
            config: Arc::new(config),
            database: None,
            services: Services::new(repositories.clone()),
            repositories,
        }
    }

    /// Name of the active store, as reported by the health check
    pub fn store_kind(&self) -> &'static str {
        if self.database.is_some() {
            "postgres"
        } else {
            "in-memory"
        }
    }

    /// Whether the store can serve queries
    pub async fn store_healthy(&self) -> bool {
        match &self.database {
            Some(database) => database.is_healthy().await,
            None => true,
        }
    }
}
