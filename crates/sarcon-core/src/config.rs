//! Configuration for sarcon
//!
//! Values are resolved in order, later sources overriding earlier ones:
//! built-in defaults, `~/.sarcon/config.toml`, `./sarcon.toml`, then the
//! `SARCON_ADDR`, `SARCON_MODEL_DIR` and `SARCON_REVISION` environment
//! variables.
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:8501"
//!
//! [models]
//! dir = "models"
//! revision = "v3-onehot"
//! require_all = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::RevisionId;

/// Project-local config file name
pub const PROJECT_CONFIG_FILE: &str = "sarcon.toml";

/// System-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SarconConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8501".to_string(),
        }
    }
}

/// Model artifact settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory holding `minor.json`, `major.json`, `ssi.json`, `id.json`, `seroma.json`
    pub dir: PathBuf,
    /// Schema revision the artifacts were trained for
    pub revision: String,
    /// Fail startup when an artifact is missing
    pub require_all: bool,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            revision: RevisionId::default().name().to_string(),
            require_all: true,
        }
    }
}

/// Partial config as read from one file; absent keys leave values untouched.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    server: ServerLayer,
    #[serde(default)]
    models: ModelsLayer,
}

#[derive(Debug, Default, Deserialize)]
struct ServerLayer {
    addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelsLayer {
    dir: Option<PathBuf>,
    revision: Option<String>,
    require_all: Option<bool>,
}

impl SarconConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string, on top of the defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge_toml(toml_str)?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from standard locations and the environment
    pub fn load_standard(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_file = home.join(".sarcon").join("config.toml");
            config.merge_file(&user_file)?;
        }

        if let Some(root) = project_root {
            config.merge_file(&root.join(PROJECT_CONFIG_FILE))?;
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Merge a TOML file if it exists
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Ok(());
        }
        let text = std::fs::read_to_string(path)?;
        self.merge_toml(&text)?;
        tracing::debug!("Merged config from {:?}", path);
        Ok(())
    }

    fn merge_toml(&mut self, toml_str: &str) -> Result<(), ConfigError> {
        let layer: ConfigLayer = toml::from_str(toml_str)?;
        if let Some(addr) = layer.server.addr {
            self.server.addr = addr;
        }
        if let Some(dir) = layer.models.dir {
            self.models.dir = dir;
        }
        if let Some(revision) = layer.models.revision {
            self.models.revision = revision;
        }
        if let Some(require_all) = layer.models.require_all {
            self.models.require_all = require_all;
        }
        Ok(())
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("SARCON_ADDR") {
            self.server.addr = addr;
        }
        if let Some(dir) = lookup("SARCON_MODEL_DIR") {
            self.models.dir = PathBuf::from(dir);
        }
        if let Some(revision) = lookup("SARCON_REVISION") {
            self.models.revision = revision;
        }
    }

    /// Parsed schema revision
    pub fn revision(&self) -> Result<RevisionId, ConfigError> {
        self.models
            .revision
            .parse()
            .map_err(|e: crate::error::SchemaError| ConfigError::Invalid(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "server.addr must not be empty".to_string(),
            ));
        }
        if self.models.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "models.dir must not be empty".to_string(),
            ));
        }
        self.revision()?;
        Ok(())
    }
}
