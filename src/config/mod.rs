//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file with environment
//! overrides for the secrets (`GEMINI_API_KEY`) and the listen port
//! (`PORT`). Every field has a default, so the service starts with no file
//! at all; without a credential the extraction endpoint reports a
//! configuration error per request instead of refusing to boot.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Vision model gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Absent means extraction requests fail with a configuration error
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

/// One bearer token and the user it authenticates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: Uuid,
}

/// Static session configuration for the bundled token provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("failed to parse config")?;
        Ok(config)
    }

    /// Apply environment overrides: `GEMINI_API_KEY` and `PORT`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.extraction.api_key = Some(key);
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        self
    }

    /// File if present, defaults otherwise, env on top
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.extraction.model, "gemini-1.5-flash");
        assert!(config.extraction.api_key.is_none());
        assert!(config.auth.tokens.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = AppConfig::from_yaml_str(
            r#"
            server:
              port: 3000
            extraction:
              api_key: "secret-key"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.extraction.api_key.as_deref(), Some("secret-key"));
        assert_eq!(
            config.extraction.endpoint,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_auth_tokens_parse() {
        let user = Uuid::new_v4();
        let yaml = format!(
            r#"
            auth:
              tokens:
                - token: "tok-1"
                  user_id: "{}"
            "#,
            user
        );

        let config = AppConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.auth.tokens.len(), 1);
        assert_eq!(config.auth.tokens[0].token, "tok-1");
        assert_eq!(config.auth.tokens[0].user_id, user);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(AppConfig::from_yaml_str("server: [not a map").is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9999").unwrap();

        let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::from_yaml_file("/definitely/not/here.yaml").is_err());
    }
}
