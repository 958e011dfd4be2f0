//! Configuration for the catalog console
//!
//! An optional TOML file supplies defaults; command-line flags and their
//! environment variables override it.
//!
//! ```toml
//! log_level = "debug"
//!
//! [catalog]
//! base_url = "https://catalog.example.com/api"
//! timeout_secs = 10
//! api_token = "..."
//! ```

use crate::error::{ConsoleError, Result};
use catalog_client::CatalogConfig;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Base URL of the catalog REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer credential
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_token: None,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogSection::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    CatalogConfig::default().base_url
}
fn default_timeout_secs() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }

impl ConsoleConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConsoleError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let url = &self.catalog.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConsoleError::Config(format!(
                "catalog.base_url must be an http(s) URL, got {:?}",
                url
            )));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(ConsoleError::Config(
                "catalog.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self
            .catalog
            .api_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(ConsoleError::Config(
                "catalog.api_token must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the HTTP gateway
    pub fn client_config(&self) -> CatalogConfig {
        CatalogConfig {
            base_url: self.catalog.base_url.clone(),
            api_token: self.catalog.api_token.clone(),
            timeout_secs: self.catalog.timeout_secs,
        }
    }
}

/// Connection flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Path to a TOML config file
    #[arg(long, env = "CATALOG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Catalog REST API base URL
    #[arg(long, env = "CATALOG_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer credential for the catalog store
    #[arg(long, env = "CATALOG_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "CATALOG_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", global = true)]
    pub log_level: Option<String>,
}

impl ConnectionArgs {
    /// Read the config file (if any), apply overrides and validate
    pub fn resolve(&self) -> Result<ConsoleConfig> {
        let mut config = match &self.config {
            Some(path) => ConsoleConfig::from_file(path)?,
            None => ConsoleConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.catalog.base_url = base_url.clone();
        }
        if let Some(token) = &self.api_token {
            config.catalog.api_token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout_secs {
            config.catalog.timeout_secs = timeout;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::from_toml("").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.catalog.base_url, "http://localhost:8080/api");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert_eq!(config.log_level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file() {
        let config = ConsoleConfig::from_toml(
            r#"
            [catalog]
            base_url = "https://catalog.example.com/api"
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog.base_url, "https://catalog.example.com/api");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert!(config.catalog.api_token.is_none());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = ConsoleConfig::from_toml("[catalog\nbase_url = ").unwrap_err();
        assert!(matches!(err, ConsoleError::Config(_)));
    }

    #[test]
    fn test_validate() {
        let mut config = ConsoleConfig::default();
        config.catalog.base_url = "catalog.example.com".into();
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.catalog.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.catalog.api_token = Some("  ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\n[catalog]\nbase_url = \"https://file.example/api\"\ntimeout_secs = 5\napi_token = \"from-file\""
        )
        .unwrap();

        let args = ConnectionArgs {
            config: Some(file.path().to_path_buf()),
            api_token: Some("from-flag".into()),
            ..Default::default()
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.catalog.base_url, "https://file.example/api");
        assert_eq!(config.catalog.timeout_secs, 5);
        assert_eq!(config.catalog.api_token.as_deref(), Some("from-flag"));
        assert_eq!(config.log_level, "debug");

        let client = config.client_config();
        assert_eq!(client.api_token.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = ConnectionArgs {
            config: Some(dir.path().join("absent.toml")),
            ..Default::default()
        };
        assert!(matches!(args.resolve(), Err(ConsoleError::Config(_))));
    }
}
