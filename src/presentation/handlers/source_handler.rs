// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::search_orchestrator::SearchOrchestrator;
use crate::domain::models::source::{SelectorMap, SourceDefinition};
use crate::presentation::errors::AppError;

/// 书源注册请求体
///
/// 选择器映射可省略，缺省使用常见小说站布局。
#[derive(Debug, Deserialize)]
pub struct RegisterSourceDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub search_path: Option<String>,
    #[serde(default)]
    pub selectors: Option<SelectorMap>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub render_delay_ms: Option<u64>,
}

/// 列出书源名称，供前端填充书源选择器
pub async fn list_sources(
    Extension(orchestrator): Extension<Arc<SearchOrchestrator>>,
) -> Json<Vec<String>> {
    Json(orchestrator.registry().names().await)
}

/// 注册新书源
///
/// # 返回值
///
/// 201 注册成功；400 名称或URL缺失；409 URL已存在
pub async fn register_source(
    Extension(orchestrator): Extension<Arc<SearchOrchestrator>>,
    Json(payload): Json<RegisterSourceDto>,
) -> Result<StatusCode, AppError> {
    let mut def = SourceDefinition::new(
        &payload.name,
        &payload.url,
        payload.search_path.as_deref().unwrap_or("/s?q={keyword}"),
        payload.selectors.unwrap_or_default(),
    );
    if let Some(headers) = payload.headers {
        def.headers.extend(headers);
    }
    if let Some(delay) = payload.render_delay_ms {
        def.render_delay_ms = delay;
    }

    orchestrator.registry().register(def).await?;
    Ok(StatusCode::CREATED)
}
