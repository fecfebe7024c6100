// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::search_orchestrator::SearchOrchestrator;
use crate::domain::errors::OrchestratorError;
use crate::domain::models::novel::{NovelRecord, SearchQuery};
use crate::presentation::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// 处理搜索请求
///
/// # 参数
///
/// * `orchestrator` - 搜索编排器实例
/// * `params` - 关键词与可选书源限定
///
/// # 返回值
///
/// 搜索结果数组；关键词为空返回400，回退链耗尽返回503，
/// 两种错误响应都携带 `availableSources`
pub async fn search(
    Extension(orchestrator): Extension<Arc<SearchOrchestrator>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<NovelRecord>>, AppError> {
    let query = SearchQuery::new(params.keyword, params.source);
    match orchestrator.search(&query).await {
        Ok(records) => Ok(Json(records)),
        Err(e @ OrchestratorError::InvalidQuery) => {
            let names = orchestrator.registry().names().await;
            Err(AppError::with_sources(e, names))
        }
        Err(e) => Err(e.into()),
    }
}
