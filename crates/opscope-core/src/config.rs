use crate::error::{OpscopeError, Result};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    4150
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project configuration stored at `.opscope/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Database file name under `.opscope/`.
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

fn default_version() -> u32 {
    1
}

fn default_db_file() -> String {
    "telemetry.redb".to_string()
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            project: ProjectConfig { name: name.into() },
            server: ServerConfig::default(),
            db_file: default_db_file(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(OpscopeError::NotInitialized);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(root), yaml.as_bytes())
    }

    /// Absolute path of the telemetry database for this project.
    pub fn db_path(&self, root: &Path) -> std::path::PathBuf {
        paths::db_path(root, &self.db_file)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
