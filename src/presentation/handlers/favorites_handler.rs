// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::favorite::FavoriteRecord;
use crate::domain::models::novel::NovelRecord;
use crate::domain::repositories::favorites_repository::FavoritesRepository;
use crate::presentation::errors::AppError;

/// 收藏请求体，前端以 `{ novel: {...} }` 包裹提交
#[derive(Debug, Deserialize)]
pub struct AddFavoriteDto {
    pub novel: NovelRecord,
}

pub async fn list_favorites(
    Extension(repo): Extension<Arc<dyn FavoritesRepository>>,
) -> Result<Json<Vec<FavoriteRecord>>, AppError> {
    Ok(Json(repo.list().await?))
}

pub async fn add_favorite(
    Extension(repo): Extension<Arc<dyn FavoritesRepository>>,
    Json(payload): Json<AddFavoriteDto>,
) -> Result<(StatusCode, Json<FavoriteRecord>), AppError> {
    let record = repo.add(payload.novel).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn remove_favorite(
    Extension(repo): Extension<Arc<dyn FavoritesRepository>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    repo.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
