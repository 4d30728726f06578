use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_backup_blob_name")]
    pub backup_blob_name: String,

    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,

    pub news_api_key: Option<String>,
    pub completion_api_key: Option<String>,
    pub gemini_api_key: Option<String>,

    /// Bearer token required by the job trigger endpoints.
    pub job_token: Option<String>,
}

fn default_db_path() -> String {
    // DATA_DIR points at the persistent volume in hosted deployments
    let data_dir = std::env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsstand")
    });
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("content.db").to_string_lossy().to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:5001".to_string()
}

fn default_site_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_bucket() -> String {
    "newsstand-backup-vault".to_string()
}

fn default_backup_blob_name() -> String {
    "content_backup.db".to_string()
}

fn default_credentials_file() -> String {
    "google_credentials.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_address: default_bind_address(),
            site_url: default_site_url(),
            page_size: default_page_size(),
            bucket: default_bucket(),
            backup_blob_name: default_backup_blob_name(),
            credentials_file: default_credentials_file(),
            news_api_key: None,
            completion_api_key: None,
            gemini_api_key: None,
            job_token: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsstand")
            .join("config.toml")
    }
}
