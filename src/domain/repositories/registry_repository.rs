// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::errors::StorageError;
use crate::domain::models::source::SourceDefinition;

/// 书源注册表持久化接口
///
/// 注册表在每次变更后整体落盘，重启后恢复。
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// 装载全部书源定义，存储为空时返回空集合
    async fn load(&self) -> Result<Vec<SourceDefinition>, StorageError>;

    /// 覆盖写入全部书源定义
    async fn save(&self, sources: &[SourceDefinition]) -> Result<(), StorageError>;
}
