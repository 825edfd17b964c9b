//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "ONIONVOICE_CONFIG";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Proxy URL for outgoing requests. `"none"` connects directly.
    pub proxy: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// openssl binary used for PKCS#12 export.
    pub openssl_path: Option<String>,

    /// Default client directory. `~` is expanded.
    pub client_dir: Option<String>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("org", "onionvoice", "onionvoice")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Set `key` from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "proxy" => self.proxy = Some(value.to_string()),
            "timeout_secs" | "timeout" => self.timeout_secs = Some(value.parse()?),
            "openssl_path" | "openssl" => self.openssl_path = Some(value.to_string()),
            "client_dir" | "dir" => self.client_dir = Some(value.to_string()),
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            _ => anyhow::bail!(
                "Unknown config key: {key}\n\n\
                 Available keys:\n  \
                 proxy          - Proxy URL, or \"none\" for direct connections\n  \
                 timeout_secs   - Request timeout in seconds\n  \
                 openssl_path   - openssl binary for PKCS#12 export\n  \
                 client_dir     - Default client directory\n  \
                 output_format  - Default output format (pretty, json)"
            ),
        }
        Ok(())
    }

    /// Configured client directory with `~` and variables expanded.
    pub fn client_dir(&self) -> Result<Option<PathBuf>> {
        self.client_dir
            .as_deref()
            .map(|dir| {
                shellexpand::full(dir)
                    .map(|expanded| PathBuf::from(expanded.as_ref()))
                    .with_context(|| format!("Could not expand client_dir {dir}"))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_keys() {
        let mut config = Config::default();
        config.set("proxy", "socks5h://127.0.0.1:9150").unwrap();
        config.set("timeout", "30").unwrap();
        config.set("openssl", "/usr/local/bin/openssl").unwrap();
        config.set("output", "json").unwrap();

        assert_eq!(config.proxy.as_deref(), Some("socks5h://127.0.0.1:9150"));
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.openssl_path.as_deref(), Some("/usr/local/bin/openssl"));
        assert_eq!(config.output_format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("timeout", "soon").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.set("dir", "/opt/mumble").unwrap();
        config.set("timeout", "90").unwrap();

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("client_dir = \"/opt/mumble\""));
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
    }

    #[test]
    fn test_client_dir_expands_home() {
        let config = Config {
            client_dir: Some("~/mumble".to_string()),
            ..Config::default()
        };
        let dir = config.client_dir().unwrap().unwrap();
        assert!(!dir.starts_with("~"));
        assert!(dir.ends_with("mumble"));
    }
}
