//! Configuration for the collector, the form server and the embedding client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding a service-account key path
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Environment variable holding a ready-made OAuth2 access token
pub const ACCESS_TOKEN_ENV: &str = "VERTEX_ACCESS_TOKEN";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Form server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Document collector configuration
    #[serde(default)]
    pub collector: CollectorConfig,
    /// Embedding client configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Override fields from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from a key lookup (the environment in production)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("INGEST_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("INGEST_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid INGEST_PORT '{}': {}", port, e)))?;
        }
        if let Some(dir) = lookup("INGEST_TEMP_DIR") {
            self.collector.temp_dir = Some(PathBuf::from(dir));
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(project) = lookup("GCP_PROJECT") {
            self.embedding.project = project;
        }
        if let Some(location) = lookup("GCP_LOCATION") {
            self.embedding.location = location;
        }
        if let Some(path) = lookup(CREDENTIALS_ENV) {
            self.embedding.credentials.service_account_key_path = Some(PathBuf::from(path));
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV) {
            self.embedding.credentials.access_token = Some(token);
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum submission size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024,
        }
    }
}

/// Document collector configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Directory for staging uploads (default: system temp dir)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// Embedding client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g. "textembedding-gecko@003")
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// GCP project ID
    #[serde(default)]
    pub project: String,
    /// GCP region (e.g. "us-central1")
    #[serde(default = "default_location")]
    pub location: String,
    /// Override for the Vertex AI base URL (tests, private endpoints)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Instances per predict request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

fn default_embedding_model() -> String {
    "textembedding-gecko@003".to_string()
}

fn default_location() -> String {
    "us-central1".to_string()
}

fn default_max_batch_size() -> usize {
    250
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            project: String::new(),
            location: default_location(),
            endpoint: None,
            max_batch_size: default_max_batch_size(),
            timeout_secs: default_timeout_secs(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl EmbeddingConfig {
    /// Config for the three required parameters, credentials from the environment
    pub fn new(
        model: impl Into<String>,
        project: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            project: project.into(),
            location: location.into(),
            credentials: CredentialsConfig::from_env(),
            ..Self::default()
        }
    }

    /// Check the required parameters are present
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("model", &self.model),
            ("project", &self.project),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("Embedding {} must not be empty", name)));
            }
        }
        if self.max_batch_size == 0 {
            return Err(Error::Config("max_batch_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Where the embedding client gets its credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Path to a service account JSON key file
    #[serde(default)]
    pub service_account_key_path: Option<PathBuf>,
    /// Pre-issued OAuth2 access token; takes precedence over the key file
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

impl CredentialsConfig {
    /// Read credentials from `VERTEX_ACCESS_TOKEN` / `GOOGLE_APPLICATION_CREDENTIALS`
    pub fn from_env() -> Self {
        Self {
            service_account_key_path: std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from),
            access_token: std::env::var(ACCESS_TOKEN_ENV).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_toml_with_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            enable_cors = false
            max_upload_size = 1024

            [embedding]
            project = "assignments-dev"
            location = "us-east4"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.embedding.model, "textembedding-gecko@003");
        assert_eq!(config.embedding.project, "assignments-dev");
        assert_eq!(config.embedding.max_batch_size, 250);
        assert!(config.collector.temp_dir.is_none());
        assert!(config.embedding.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("INGEST_PORT", "7000"),
            ("INGEST_TEMP_DIR", "/var/tmp/uploads"),
            ("GCP_PROJECT", "p"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/key.json"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.collector.temp_dir, Some(PathBuf::from("/var/tmp/uploads")));
        assert_eq!(config.embedding.project, "p");
        assert_eq!(
            config.embedding.credentials.service_account_key_path,
            Some(PathBuf::from("/secrets/key.json"))
        );
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == "INGEST_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty_project() {
        let config = EmbeddingConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
