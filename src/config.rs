use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::fetcher::BankOfIsraelFetcher;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: BankOfIsraelFetcher::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    /// Loads the config from the default path, falling back to built-in
    /// defaults when no file exists so the server runs out of the box.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("il", "boi", "boi-exchange")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  bind: "0.0.0.0:9090"
upstream:
  base_url: "http://example.com/PublicApi"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.bind, "0.0.0.0:9090");
        assert_eq!(config.upstream.base_url, "http://example.com/PublicApi");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml_str = r#"
server:
  bind: "0.0.0.0:9090"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.bind, "0.0.0.0:9090");
        assert_eq!(
            config.upstream.base_url,
            BankOfIsraelFetcher::DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_load_from_file() {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        fs::write(
            config_file.path(),
            "upstream:\n  base_url: \"http://localhost:1234\"\n",
        )
        .expect("Failed to write config file");

        let config = AppConfig::load_from_path(config_file.path()).expect("Failed to load");
        assert_eq!(config.upstream.base_url, "http://localhost:1234");
        assert_eq!(config.server.bind, ServerConfig::default().bind);
    }
}
