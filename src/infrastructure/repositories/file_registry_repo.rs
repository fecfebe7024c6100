// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::errors::StorageError;
use crate::domain::models::source::SourceDefinition;
use crate::domain::repositories::registry_repository::RegistryRepository;

/// 基于JSON文件的注册表存储
///
/// 整表序列化为一个JSON文件，文件不存在视为空注册表。
pub struct FileRegistryRepo {
    path: PathBuf,
}

impl FileRegistryRepo {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RegistryRepository for FileRegistryRepo {
    async fn load(&self) -> Result<Vec<SourceDefinition>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StorageError::Serde(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn save(&self, sources: &[SourceDefinition]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(sources)
            .map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::source::{SelectorMap, SourceDefinition};

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRegistryRepo::new(dir.path().join("sources.json"));

        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRegistryRepo::new(dir.path().join("nested/sources.json"));

        let sources = vec![SourceDefinition::new(
            "万书网",
            "https://www.10000txt.com",
            "/s?q={keyword}",
            SelectorMap::default(),
        )];
        repo.save(&sources).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "万书网");
        assert_eq!(loaded[0].selectors, SelectorMap::default());
    }
}
