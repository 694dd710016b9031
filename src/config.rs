//! Configuration types and loading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default port for the web UI.
pub const DEFAULT_PORT: u16 = 8080;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taskboard.yaml";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server configuration: storage location and listen address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file (default: taskboard.db).
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address to bind (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (default: 8080).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("taskboard.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Load configuration from the given file, or from `taskboard.yaml` in
    /// the working directory when present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        match candidate {
            Some(p) => {
                let contents = std::fs::read_to_string(&p)
                    .with_context(|| format!("failed to read config file {}", p.display()))?;
                let config: Config = serde_yaml::from_str(&contents)
                    .with_context(|| format!("failed to parse config file {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    /// Ensure the database file's parent directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
