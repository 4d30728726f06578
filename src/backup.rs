use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{BackupError, RestoreError};
use crate::vault::{GcsVault, Vault};

/// Backup and restore of the store file against the vault's single blob.
/// Built from explicit configuration so tests can swap in a fake vault.
pub struct BackupService {
    vault: Option<Arc<dyn Vault>>,
    blob_name: String,
    db_path: PathBuf,
}

impl BackupService {
    pub fn new(vault: Option<Arc<dyn Vault>>, blob_name: String, db_path: PathBuf) -> Self {
        Self {
            vault,
            blob_name,
            db_path,
        }
    }

    /// A missing credential file leaves the vault unset; backup and restore
    /// then fail locally without attempting network access.
    pub fn from_config(config: &Config) -> Self {
        let credentials_file = PathBuf::from(&config.credentials_file);
        let vault: Option<Arc<dyn Vault>> = if credentials_file.exists() {
            match GcsVault::from_token_file(&credentials_file, config.bucket.clone()) {
                Ok(vault) => Some(Arc::new(vault)),
                Err(e) => {
                    tracing::warn!("Failed to read vault credentials: {}", e);
                    None
                }
            }
        } else {
            tracing::warn!(
                "Vault credentials not found at {}, backup and restore disabled",
                credentials_file.display()
            );
            None
        };
        Self::new(
            vault,
            config.backup_blob_name.clone(),
            PathBuf::from(&config.db_path),
        )
    }

    /// Download the backup blob to the store path. Writes to a sibling
    /// temporary file and renames it into place, so a failed transfer never
    /// leaves a partial file where the store is expected.
    ///
    /// Safe to call when the store already exists (it is overwritten). Two
    /// processes racing this check-then-fetch may both download, last writer
    /// wins; accepted for the single-process deployment model.
    pub async fn restore(&self) -> Result<(), RestoreError> {
        let vault = self
            .vault
            .as_ref()
            .ok_or(RestoreError::MissingCredentials)?;

        let present = vault
            .exists(&self.blob_name)
            .await
            .map_err(|e| RestoreError::Transfer(e.to_string()))?;
        if !present {
            return Err(RestoreError::NoBackup);
        }

        tracing::info!(
            "Downloading backup blob '{}' to {}",
            self.blob_name,
            self.db_path.display()
        );
        let partial = self.db_path.with_extension("db.partial");
        match vault.download(&self.blob_name, &partial).await {
            Ok(()) => {
                tokio::fs::rename(&partial, &self.db_path)
                    .await
                    .map_err(|e| RestoreError::Transfer(e.to_string()))?;
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(RestoreError::Transfer(e.to_string()))
            }
        }
    }

    /// Upload the store file, overwriting the previous blob generation.
    /// Failures are logged and swallowed; a missing store file is a logged
    /// no-op, never an empty backup.
    pub async fn backup(&self) {
        match self.try_backup().await {
            Ok(true) => tracing::info!("Backup uploaded as blob '{}'", self.blob_name),
            Ok(false) => {}
            Err(e) => tracing::error!("Backup failed: {}", e),
        }
    }

    async fn try_backup(&self) -> Result<bool, BackupError> {
        if !self.db_path.exists() {
            tracing::warn!(
                "Store file not found at {}, skipping backup",
                self.db_path.display()
            );
            return Ok(false);
        }

        let vault = self
            .vault
            .as_ref()
            .ok_or(BackupError::MissingCredentials)?;
        vault
            .upload(&self.db_path, &self.blob_name)
            .await
            .map_err(|e| BackupError::Upload(e.to_string()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::memory::MemoryVault;

    const BLOB: &str = "content_backup.db";

    fn service(vault: Option<Arc<MemoryVault>>, db_path: PathBuf) -> BackupService {
        let vault = vault.map(|v| v as Arc<dyn Vault>);
        BackupService::new(vault, BLOB.to_string(), db_path)
    }

    #[tokio::test]
    async fn backup_overwrites_previous_blob() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("content.db");
        let vault = Arc::new(MemoryVault::new());
        let service = service(Some(vault.clone()), db_path.clone());

        std::fs::write(&db_path, b"generation one").unwrap();
        service.backup().await;
        std::fs::write(&db_path, b"generation two").unwrap();
        service.backup().await;

        assert_eq!(vault.get(BLOB).unwrap(), b"generation two");
        assert_eq!(vault.upload_count(), 2);
    }

    #[tokio::test]
    async fn backup_skips_when_store_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Arc::new(MemoryVault::new());
        let service = service(Some(vault.clone()), dir.path().join("content.db"));

        service.backup().await;

        assert!(vault.get(BLOB).is_none());
        assert_eq!(vault.upload_count(), 0);
    }

    #[tokio::test]
    async fn restore_without_credentials_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("content.db");
        let service = service(None, db_path.clone());

        let err = service.restore().await.unwrap_err();
        assert!(matches!(err, RestoreError::MissingCredentials));
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn restore_without_blob_reports_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("content.db");
        let service = service(Some(Arc::new(MemoryVault::new())), db_path.clone());

        let err = service.restore().await.unwrap_err();
        assert!(matches!(err, RestoreError::NoBackup));
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn restore_places_blob_at_store_path() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("content.db");
        let vault = Arc::new(MemoryVault::new());
        vault.put(BLOB, b"backed up bytes".to_vec());
        let service = service(Some(vault), db_path.clone());

        service.restore().await.unwrap();

        assert_eq!(std::fs::read(&db_path).unwrap(), b"backed up bytes");
        assert!(!db_path.with_extension("db.partial").exists());
    }
}
