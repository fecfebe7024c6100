// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::StorageError;
use crate::domain::models::favorite::FavoriteRecord;
use crate::domain::models::novel::NovelRecord;

/// 收藏列表持久化接口
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<FavoriteRecord>, StorageError>;

    async fn add(&self, novel: NovelRecord) -> Result<FavoriteRecord, StorageError>;

    /// 按ID移除，条目不存在时返回 `NotFound`
    async fn remove(&self, id: Uuid) -> Result<(), StorageError>;
}
