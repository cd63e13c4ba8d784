use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfigFile {
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    pub endpoint: String,
    pub bucket_name: String,
    pub region: Option<String>,
    pub path_style: Option<bool>,
    // Optional environment variable names for customization
    pub env_access_key: Option<String>,
    pub env_secret_key: Option<String>,
}

/// Blob-store connection settings. Endpoint and bucket come from TOML,
/// credentials only ever from the environment.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket_name: String,
    pub region: Option<String>,
    pub path_style: Option<bool>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub env_access_key: Option<String>,
    pub env_secret_key: Option<String>,
}

impl StorageConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read storage config file: {}", path))?;

        let config_file: StorageConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse storage config file: {}", path))?;

        let mut config = Self::from_section(config_file.storage);
        config.load_credentials()?;
        Ok(config)
    }

    fn from_section(section: StorageSection) -> Self {
        Self {
            endpoint: section.endpoint,
            bucket_name: section.bucket_name,
            region: section.region,
            path_style: section.path_style,
            access_key: None,
            secret_key: None,
            env_access_key: section.env_access_key,
            env_secret_key: section.env_secret_key,
        }
    }

    pub fn load_credentials(&mut self) -> Result<()> {
        let access_key_var = self
            .env_access_key
            .as_deref()
            .unwrap_or("STORAGE_ACCESS_KEY");
        let secret_key_var = self
            .env_secret_key
            .as_deref()
            .unwrap_or("STORAGE_SECRET_KEY");

        self.access_key = env::var(access_key_var)
            .with_context(|| format!("Missing environment variable: {}", access_key_var))?
            .into();

        self.secret_key = env::var(secret_key_var)
            .with_context(|| format!("Missing environment variable: {}", secret_key_var))?
            .into();

        Ok(())
    }

    pub fn get_access_key(&self) -> Result<&str> {
        self.access_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Access key not loaded"))
    }

    pub fn get_secret_key(&self) -> Result<&str> {
        self.secret_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Secret key not loaded"))
    }

    pub fn is_path_style(&self) -> bool {
        self.path_style.unwrap_or(true)
    }

    pub fn get_region(&self) -> &str {
        self.region.as_deref().unwrap_or("us-east-1")
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(anyhow::anyhow!("Storage endpoint cannot be empty"));
        }
        if self.bucket_name.is_empty() {
            return Err(anyhow::anyhow!("Storage bucket name cannot be empty"));
        }
        if self.access_key.is_none() {
            return Err(anyhow::anyhow!("Storage access key not loaded"));
        }
        if self.secret_key.is_none() {
            return Err(anyhow::anyhow!("Storage secret key not loaded"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            bucket_name: "sales-uploads".to_string(),
            region: Some("us-east-1".to_string()),
            path_style: Some(true),
            access_key: None,
            secret_key: None,
            env_access_key: None,
            env_secret_key: None,
        }
    }
}
