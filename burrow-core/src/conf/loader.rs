use crate::conf::error::ConfigError;
use crate::conf::types::ServerOptions;
use std::path::Path;

impl ServerOptions {
    /// Load options from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

        Self::from_toml_str(&raw).map_err(|e| ConfigError::parse(path, e))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
