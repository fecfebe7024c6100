// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::errors::StorageError;
use crate::domain::models::favorite::FavoriteRecord;
use crate::domain::models::novel::NovelRecord;
use crate::domain::repositories::favorites_repository::FavoritesRepository;

/// 基于JSON文件的收藏列表存储
///
/// 写操作持锁做读-改-写，避免并发请求互相覆盖。
pub struct FileFavoritesRepo {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileFavoritesRepo {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<FavoriteRecord>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StorageError::Serde(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn write_all(&self, favorites: &[FavoriteRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(favorites)
            .map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[async_trait]
impl FavoritesRepository for FileFavoritesRepo {
    async fn list(&self) -> Result<Vec<FavoriteRecord>, StorageError> {
        self.read_all().await
    }

    async fn add(&self, novel: NovelRecord) -> Result<FavoriteRecord, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut favorites = self.read_all().await?;
        let record = FavoriteRecord::new(novel);
        favorites.push(record.clone());
        self.write_all(&favorites).await?;
        Ok(record)
    }

    async fn remove(&self, id: Uuid) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut favorites = self.read_all().await?;
        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        if favorites.len() == before {
            return Err(StorageError::NotFound);
        }
        self.write_all(&favorites).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novel(title: &str) -> NovelRecord {
        NovelRecord {
            title: title.to_string(),
            author: "天蚕土豆".to_string(),
            cover: String::new(),
            description: String::new(),
            link: "https://www.10000txt.com/book/1".to_string(),
            source: "万书网".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileFavoritesRepo::new(dir.path().join("favorites.json"));

        assert!(repo.list().await.unwrap().is_empty());

        let added = repo.add(novel("斗破苍穹")).await.unwrap();
        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].novel.title, "斗破苍穹");

        repo.remove(added.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileFavoritesRepo::new(dir.path().join("favorites.json"));

        let result = repo.remove(Uuid::new_v4()).await;
        assert!(matches!(result, Err(StorageError::NotFound)));
    }
}
