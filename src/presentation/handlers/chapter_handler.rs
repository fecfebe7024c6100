// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Query},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::application::chapter_assembler::ChapterAssembler;
use crate::application::search_orchestrator::SearchOrchestrator;
use crate::domain::models::novel::ChapterRef;
use crate::presentation::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct ChapterParams {
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentParams {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    /// 文档标题，缺省时以目录页URL代替
    #[serde(default)]
    pub title: Option<String>,
}

/// 获取书籍目录
pub async fn chapters(
    Extension(orchestrator): Extension<Arc<SearchOrchestrator>>,
    Query(params): Query<ChapterParams>,
) -> Result<Json<Vec<ChapterRef>>, AppError> {
    let chapters = orchestrator
        .fetch_chapters(&params.url, params.source.as_deref())
        .await?;
    Ok(Json(chapters))
}

/// 获取单章正文
pub async fn content(
    Extension(orchestrator): Extension<Arc<SearchOrchestrator>>,
    Query(params): Query<ContentParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let content = orchestrator.fetch_content(&params.url).await?;
    Ok(Json(json!({ "content": content })))
}

/// 全本下载
///
/// 取目录后逐章组装为纯文本，单章失败以占位文本内联，不中止整体。
pub async fn download(
    Extension(orchestrator): Extension<Arc<SearchOrchestrator>>,
    Extension(assembler): Extension<Arc<ChapterAssembler>>,
    Query(params): Query<DownloadParams>,
) -> Result<impl IntoResponse, AppError> {
    let chapters = orchestrator
        .fetch_chapters(&params.url, params.source.as_deref())
        .await?;
    let title = params.title.unwrap_or_else(|| params.url.clone());
    let document = assembler.assemble(&title, &chapters).await;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        document.to_text(),
    ))
}
