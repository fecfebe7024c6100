// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::novel::NovelRecord;

/// 收藏条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub novel: NovelRecord,
}

impl FavoriteRecord {
    pub fn new(novel: NovelRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            novel,
        }
    }
}
