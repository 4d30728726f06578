use std::path::PathBuf;
use std::sync::Arc;

use crate::backup::BackupService;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{Article, ArticleNavigation, NewArticle};

/// Article store with the restore-on-miss guard in front of every access.
/// Read operations degrade to empty results when the store cannot be
/// recovered or read; `append` propagates its failures.
pub struct ArticleStore {
    db_path: PathBuf,
    backup: Arc<BackupService>,
}

impl ArticleStore {
    pub fn new(db_path: PathBuf, backup: Arc<BackupService>) -> Self {
        Self { db_path, backup }
    }

    /// If the store file is absent, attempt one restore from the vault
    /// before anything touches the database. The existence check keeps the
    /// restore from re-running on every access once the file is in place.
    async fn ensure_local_store(&self) -> bool {
        if self.db_path.exists() {
            return true;
        }
        tracing::warn!(
            "Store file missing at {}, attempting restore from backup",
            self.db_path.display()
        );
        match self.backup.restore().await {
            Ok(()) => {
                tracing::info!("Store recovered from vault backup");
                true
            }
            Err(e) => {
                tracing::warn!("Restore failed: {}", e);
                false
            }
        }
    }

    async fn open(&self) -> Result<Repository> {
        Repository::open(&self.db_path)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    /// Up to `limit` articles, most recent first. Never fails: an absent
    /// store that cannot be restored, or an unreadable file, yields an
    /// empty listing.
    pub async fn list_recent(&self, limit: u32) -> Vec<Article> {
        if !self.ensure_local_store().await {
            return Vec::new();
        }
        match self.read_recent(limit).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("Store read failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn read_recent(&self, limit: u32) -> Result<Vec<Article>> {
        self.open().await?.list_recent(limit).await
    }

    /// The full catalog, most recent first, with the same degradation as
    /// `list_recent`.
    pub async fn list_all(&self) -> Vec<Article> {
        if !self.ensure_local_store().await {
            return Vec::new();
        }
        match self.read_all().await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("Store read failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn read_all(&self) -> Result<Vec<Article>> {
        self.open().await?.list_all().await
    }

    /// The article plus its prev/next neighbors. `NotFound` covers both a
    /// missing row and a store that has no data to offer.
    pub async fn get_with_neighbors(&self, id: i64) -> Result<ArticleNavigation> {
        if !self.ensure_local_store().await {
            return Err(AppError::NotFound);
        }
        let repository = self.open().await?;
        repository
            .get_with_neighbors(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Insert one article. A missing store file is restored when possible;
    /// otherwise the write starts a fresh store rather than failing.
    /// Failures (unavailable store, duplicate slug) propagate to the caller.
    pub async fn append(&self, article: NewArticle) -> Result<Article> {
        self.ensure_local_store().await;
        let repository = self.open().await?;
        repository.insert_article(article).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::memory::MemoryVault;
    use crate::vault::Vault;

    const BLOB: &str = "content_backup.db";

    fn store_at(dir: &tempfile::TempDir, vault: Option<Arc<MemoryVault>>) -> ArticleStore {
        let db_path = dir.path().join("content.db");
        let backup = BackupService::new(
            vault.map(|v| v as Arc<dyn Vault>),
            BLOB.to_string(),
            db_path.clone(),
        );
        ArticleStore::new(db_path, Arc::new(backup))
    }

    fn new_article(headline: &str) -> NewArticle {
        NewArticle {
            headline: headline.to_string(),
            commentary: "Commentary.".to_string(),
            ..NewArticle::default()
        }
    }

    /// Builds a database elsewhere and serves its bytes as the vault blob.
    async fn seed_vault(vault: &MemoryVault, headlines: &[&str]) {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("seed.db");
        let repository = Repository::open(&seed_path).await.unwrap();
        for headline in headlines {
            repository.insert_article(new_article(headline)).await.unwrap();
        }
        drop(repository);
        vault.put(BLOB, std::fs::read(&seed_path).unwrap());
    }

    #[tokio::test]
    async fn missing_store_is_restored_once_then_served() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Arc::new(MemoryVault::new());
        seed_vault(&vault, &["restored headline"]).await;
        let store = store_at(&dir, Some(vault.clone()));

        let articles = store.list_recent(10).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].headline, "restored headline");
        assert_eq!(vault.download_count(), 1);

        // Second read finds the file in place, no second download
        store.list_recent(10).await;
        assert_eq!(vault.download_count(), 1);
    }

    #[tokio::test]
    async fn empty_vault_yields_empty_listing_and_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Arc::new(MemoryVault::new());
        let store = store_at(&dir, Some(vault));

        assert!(store.list_recent(10).await.is_empty());
        assert!(!dir.path().join("content.db").exists());
    }

    #[tokio::test]
    async fn missing_credentials_yield_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir, None);

        assert!(store.list_recent(10).await.is_empty());
        assert!(store.list_all().await.is_empty());
        assert!(!dir.path().join("content.db").exists());
    }

    #[tokio::test]
    async fn append_then_navigate_matches_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir, None);

        let mut ids = Vec::new();
        for headline in ["one", "two", "three"] {
            ids.push(store.append(new_article(headline)).await.unwrap().id);
        }

        let recent = store.list_recent(2).await;
        assert_eq!(recent[0].id, ids[2]);
        assert_eq!(recent[1].id, ids[1]);

        let navigation = store.get_with_neighbors(ids[1]).await.unwrap();
        assert_eq!(navigation.previous.as_ref().unwrap().id, ids[2]);
        assert_eq!(navigation.next.as_ref().unwrap().id, ids[0]);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir, None);
        store.append(new_article("only")).await.unwrap();

        let err = store.get_with_neighbors(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
