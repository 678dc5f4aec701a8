//! Server configuration
//!
//! Settings are layered: built-in defaults, then an optional YAML/TOML file,
//! then `HOSPITAL__SECTION__KEY` environment variables, then `DATABASE_URL`.

use config::{Config, ConfigError, Environment, File};
use database_layer::{seed::SeedOptions, PoolSettings};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up next to the binary
pub const DEFAULT_CONFIG_FILE: &str = "hospital-server.yaml";

const ENV_PREFIX: &str = "HOSPITAL";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Postgres connection string; the in-memory store is used when absent
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSettings {
    pub enabled: bool,
    /// Directory holding `specialties.csv` and `medicaments.csv`
    pub data_dir: PathBuf,
    pub demo_data: bool,
}

impl ServerConfig {
    /// Load the layered configuration. A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("seed.enabled", true)?
            .set_default("seed.data_dir", "data")?
            .set_default("seed.demo_data", true)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.database.max_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
        }
    }

    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            data_dir: self.seed.data_dir.clone(),
            demo_data: self.seed.demo_data,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseSettings {
                url: None,
                max_connections: 10,
                acquire_timeout_secs: 30,
                run_migrations: true,
            },
            seed: SeedSettings {
                enabled: true,
                data_dir: PathBuf::from("data"),
                demo_data: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ServerConfig::load("does-not-exist/hospital-server.yaml").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.seed.enabled);
        assert_eq!(config.seed.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!(
            "hospital-server-config-{}.yaml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "server:\n  port: 9090\nseed:\n  demo_data: false\n  data_dir: /srv/hospital\n",
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.seed.demo_data);
        assert_eq!(config.seed_options().data_dir, PathBuf::from("/srv/hospital"));
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_pool_settings() {
        let settings = ServerConfig::default().pool_settings();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(30));
    }
}
