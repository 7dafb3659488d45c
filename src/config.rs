//! Configuration for the engine bridge.
//!
//! One [`EngineConfig`] is built at process start (from a JSON file,
//! environment variables, or code) and handed to
//! [`SessionRegistry::new`](crate::session::SessionRegistry::new). Nothing
//! here is global: collaborators receive the registry handle, not ambient
//! configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default engine host when none is configured.
pub const DEFAULT_ENGINE_HOST: &str = "127.0.0.1";

/// Default engine port when none is configured.
pub const DEFAULT_ENGINE_PORT: u16 = 14000;

/// Process-wide configuration of the target engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine host to dial for every session connection.
    #[serde(default = "default_host")]
    pub engine_host: String,
    /// Engine TCP port.
    #[serde(default = "default_port")]
    pub engine_port: u16,
    /// Script run by the bootstrap launcher to start the engine.
    #[serde(default)]
    pub start_script: Option<PathBuf>,
    /// Script run by the bootstrap launcher to stop the engine.
    #[serde(default)]
    pub stop_script: Option<PathBuf>,
}

fn default_host() -> String {
    DEFAULT_ENGINE_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_ENGINE_PORT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_host: default_host(),
            engine_port: default_port(),
            start_script: None,
            stop_script: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration for the given engine address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            engine_host: host.into(),
            engine_port: port,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Build configuration from `ENGINEWIRE_HOST` / `ENGINEWIRE_PORT`
    /// environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let engine_host =
            std::env::var("ENGINEWIRE_HOST").unwrap_or_else(|_| default_host());
        let engine_port = std::env::var("ENGINEWIRE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_ENGINE_PORT);

        Self {
            engine_host,
            engine_port,
            ..Self::default()
        }
    }

    /// The `host:port` address string used to dial the engine.
    pub fn engine_addr(&self) -> String {
        format!("{}:{}", self.engine_host, self.engine_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.engine_host, DEFAULT_ENGINE_HOST);
        assert_eq!(config.engine_port, DEFAULT_ENGINE_PORT);
        assert!(config.start_script.is_none());
    }

    #[test]
    fn test_engine_addr() {
        let config = EngineConfig::new("engine.local", 14100);
        assert_eq!(config.engine_addr(), "engine.local:14100");
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig::new("10.0.0.5", 15000);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.engine_host, "10.0.0.5");
        assert_eq!(parsed.engine_port, 15000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: EngineConfig = serde_json::from_str(r#"{"engine_port": 9000}"#).unwrap();
        assert_eq!(parsed.engine_host, DEFAULT_ENGINE_HOST);
        assert_eq!(parsed.engine_port, 9000);
    }
}
