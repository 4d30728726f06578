use std::path::Path;
use std::time::Duration;

use reqwest::Client;

use super::{Vault, VaultError};

const STORAGE_API_URL: &str = "https://storage.googleapis.com/storage/v1";
const UPLOAD_API_URL: &str = "https://storage.googleapis.com/upload/storage/v1";

/// Google Cloud Storage vault, driven through the JSON API with a bearer
/// token read from the credential file. Producing that token (service
/// account OAuth exchange) happens outside this process.
pub struct GcsVault {
    client: Client,
    bucket: String,
    token: String,
}

impl GcsVault {
    pub fn from_token_file(credentials_file: &Path, bucket: String) -> std::io::Result<Self> {
        let token = std::fs::read_to_string(credentials_file)?.trim().to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");
        Ok(Self {
            client,
            bucket,
            token,
        })
    }

    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/b/{}/o/{}",
            STORAGE_API_URL,
            self.bucket,
            urlencoding::encode(name)
        )
    }
}

#[async_trait::async_trait]
impl Vault for GcsVault {
    async fn exists(&self, name: &str) -> Result<bool, VaultError> {
        let response = self
            .client
            .get(self.object_url(name))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VaultError::Api(format!("{status}: {error_text}")));
        }
        Ok(true)
    }

    async fn upload(&self, local_path: &Path, name: &str) -> Result<(), VaultError> {
        let bytes = tokio::fs::read(local_path).await?;

        let response = self
            .client
            .post(format!("{}/b/{}/o", UPLOAD_API_URL, self.bucket))
            .query(&[("uploadType", "media"), ("name", name)])
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VaultError::Api(format!("{status}: {error_text}")));
        }
        Ok(())
    }

    async fn download(&self, name: &str, local_path: &Path) -> Result<(), VaultError> {
        let response = self
            .client
            .get(self.object_url(name))
            .query(&[("alt", "media")])
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VaultError::Api(format!("{status}: {error_text}")));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(local_path, &bytes).await?;
        Ok(())
    }
}
