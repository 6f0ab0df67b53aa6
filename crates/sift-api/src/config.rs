//! Host configuration.

use serde::Deserialize;
use sift_engine::EngineConfig;

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Engine TOML file. When unset the engine reads its environment variables.
    #[serde(default)]
    pub engine_config: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl ApiConfig {
    /// Load config from `SIFT_HOST`, `SIFT_PORT` and `SIFT_CONFIG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(host) = get("SIFT_HOST") {
            config.host = host;
        }
        if let Some(port) = get("SIFT_PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config.engine_config = get("SIFT_CONFIG");
        config
    }

    /// Engine settings from the configured file, or from the environment.
    pub fn load_engine_config(&self) -> anyhow::Result<EngineConfig> {
        match &self.engine_config {
            Some(path) => EngineConfig::from_file(path),
            None => Ok(EngineConfig::from_env()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            engine_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
        assert!(config.engine_config.is_none());
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SIFT_HOST", "127.0.0.1"),
            ("SIFT_PORT", "9090"),
            ("SIFT_CONFIG", "/etc/sift/engine.toml"),
        ]
        .into_iter()
        .collect();
        let config = ApiConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.addr(), "127.0.0.1:9090");
        assert_eq!(config.engine_config.as_deref(), Some("/etc/sift/engine.toml"));
    }

    #[test]
    fn bad_port_keeps_default() {
        let config = ApiConfig::from_lookup(|k| (k == "SIFT_PORT").then(|| "http".to_string()));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn engine_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(
            &path,
            "[llm]\nbase_url = \"http://localhost:11434\"\n\n[cache]\nflush_every = 3\n",
        )
        .unwrap();

        let config = ApiConfig {
            engine_config: Some(path.display().to_string()),
            ..ApiConfig::default()
        };
        let engine = config.load_engine_config().unwrap();
        assert_eq!(engine.llm.base_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(engine.cache.flush_every, 3);
    }

    #[test]
    fn missing_engine_file_is_an_error() {
        let config = ApiConfig {
            engine_config: Some("/nonexistent/engine.toml".into()),
            ..ApiConfig::default()
        };
        assert!(config.load_engine_config().is_err());
    }
}
