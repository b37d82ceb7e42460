//! Configuration manager for carta.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::Deserialize;
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Domain name of current instance.
    pub url: String,
    /// Port to listen on. `PORT` environment variable takes precedence.
    pub port: Option<u16>,
    /// Storage backend selection.
    #[serde(default)]
    pub driver: Driver,
    #[serde(skip)]
    pub(crate) path: PathBuf,
    /// Related to JsonWebToken configuration.
    pub token: Option<Token>,
    /// Related to PostgreSQL configuration.
    pub postgres: Option<Postgres>,
    /// Related to Argon2 configuration.
    pub argon2: Option<Argon2>,
    /// Related to product catalog seeding.
    pub catalog: Option<Catalog>,
}

/// Storage backend driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Postgres,
    Memory,
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

/// Json Web Token configuration.
#[derive(Debug, Default, PartialEq, Clone, Deserialize)]
pub struct Token {
    /// HS256 signing secret. `TOKEN_SECRET` environment variable takes
    /// precedence.
    pub secret: Option<String>,
    /// Seconds a session token stays valid.
    pub ttl: Option<u64>,
}

/// Product catalog configuration.
#[derive(Debug, Default, PartialEq, Clone, Deserialize)]
pub struct Catalog {
    /// YAML file with products inserted when the catalog is empty.
    pub seed: Option<PathBuf>,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Ok(Arc::new(self.error(err)));
                        },
                    };

                // normalize URL.
                config.url = self.normalize_url(&config.url)?;

                Ok(Arc::new(config))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        let config = Configuration::default();

        assert_eq!(
            config.normalize_url("shop.example.com").unwrap(),
            "https://shop.example.com/"
        );
        assert_eq!(
            config.normalize_url("http://localhost:5000").unwrap(),
            "http://localhost:5000/"
        );
        assert!(config.normalize_url("http://").is_err());
    }

    #[test]
    fn test_driver_parsing() {
        let config: Configuration =
            serde_yaml::from_str("name: carta\nurl: example.com\ndriver: memory")
                .unwrap();
        assert_eq!(config.driver, Driver::Memory);

        let config: Configuration =
            serde_yaml::from_str("name: carta\nurl: example.com").unwrap();
        assert_eq!(config.driver, Driver::Postgres);
    }
}
