use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

mod gcs;

pub use gcs::GcsVault;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object storage API error: {0}")]
    Api(String),
}

/// Object storage holding the single backup blob. Kept behind a trait so
/// backup and restore can run against an in-memory fake in tests.
#[async_trait]
pub trait Vault: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, VaultError>;

    /// Upload a local file, overwriting any blob already stored under `name`.
    async fn upload(&self, local_path: &Path, name: &str) -> Result<(), VaultError>;

    /// Download the blob `name` to `local_path`.
    async fn download(&self, name: &str, local_path: &Path) -> Result<(), VaultError>;
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{Vault, VaultError};

    /// In-memory vault fake recording traffic counts.
    #[derive(Default)]
    pub struct MemoryVault {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
        downloads: AtomicUsize,
        uploads: AtomicUsize,
    }

    impl MemoryVault {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn put(&self, name: &str, bytes: Vec<u8>) {
            self.blobs.lock().unwrap().insert(name.to_string(), bytes);
        }

        pub fn get(&self, name: &str) -> Option<Vec<u8>> {
            self.blobs.lock().unwrap().get(name).cloned()
        }

        pub fn download_count(&self) -> usize {
            self.downloads.load(Ordering::SeqCst)
        }

        pub fn upload_count(&self) -> usize {
            self.uploads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Vault for MemoryVault {
        async fn exists(&self, name: &str) -> Result<bool, VaultError> {
            Ok(self.blobs.lock().unwrap().contains_key(name))
        }

        async fn upload(&self, local_path: &Path, name: &str) -> Result<(), VaultError> {
            let bytes = std::fs::read(local_path)?;
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.blobs.lock().unwrap().insert(name.to_string(), bytes);
            Ok(())
        }

        async fn download(&self, name: &str, local_path: &Path) -> Result<(), VaultError> {
            let bytes = self
                .get(name)
                .ok_or_else(|| VaultError::Api(format!("no such blob: {name}")))?;
            self.downloads.fetch_add(1, Ordering::SeqCst);
            std::fs::write(local_path, bytes)?;
            Ok(())
        }
    }
}
