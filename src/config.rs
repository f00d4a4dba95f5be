use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entrypoint::EntrypointKind;
use crate::error::ConfigError;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7878";
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_owned()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_owned()
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub entrypoint: Option<EntrypointKind>,
    pub model_path: Option<PathBuf>,
    pub listen_addr: Option<String>,
    pub log_level: Option<String>,
}

/// Service configuration, read from a JSON file.
///
/// Only `entrypoint` is required. `parameters` is pushed through
/// `update_parameters` once the entrypoint is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub entrypoint: EntrypointKind,
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub parameters: Option<Value>,
}

impl ServiceConfig {
    pub fn new(entrypoint: EntrypointKind) -> Self {
        ServiceConfig {
            entrypoint,
            model_path: None,
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
            parameters: None,
        }
    }

    /// Relative model paths resolve against the config file's directory.
    pub fn load_json(path: impl AsRef<Path>) -> Result<ServiceConfig, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut config: ServiceConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        if let (Some(model), Some(dir)) = (config.model_path.as_mut(), path.parent()) {
            if model.is_relative() {
                *model = dir.join(&*model);
            }
        }
        Ok(config)
    }

    /// Loads `path` when given, else starts from the overridden entrypoint,
    /// then applies every override that is set.
    pub fn resolve(
        path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<ServiceConfig, ConfigError> {
        let mut config = match (path, overrides.entrypoint) {
            (Some(path), _) => ServiceConfig::load_json(path)?,
            (None, Some(kind)) => ServiceConfig::new(kind),
            (None, None) => return Err(ConfigError::MissingEntrypoint),
        };
        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(kind) = overrides.entrypoint {
            self.entrypoint = kind;
        }
        if overrides.model_path.is_some() {
            self.model_path = overrides.model_path;
        }
        if let Some(addr) = overrides.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}
