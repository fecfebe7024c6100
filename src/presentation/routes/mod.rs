// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::Extension,
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::chapter_assembler::ChapterAssembler;
use crate::application::search_orchestrator::SearchOrchestrator;
use crate::domain::repositories::favorites_repository::FavoritesRepository;
use crate::presentation::handlers::{
    chapter_handler, favorites_handler, search_handler, source_handler,
};

/// 创建应用路由
///
/// # 参数
///
/// * `orchestrator` - 搜索编排器
/// * `assembler` - 章节组装器
/// * `favorites` - 收藏存储
///
/// # 返回值
///
/// 返回配置好的路由
pub fn build_router(
    orchestrator: Arc<SearchOrchestrator>,
    assembler: Arc<ChapterAssembler>,
    favorites: Arc<dyn FavoritesRepository>,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/stats", get(stats))
        .route("/search", get(search_handler::search))
        .route("/chapters", get(chapter_handler::chapters))
        .route("/content", get(chapter_handler::content))
        .route("/download", get(chapter_handler::download))
        .route(
            "/sources",
            get(source_handler::list_sources).post(source_handler::register_source),
        )
        .route(
            "/favorites",
            get(favorites_handler::list_favorites).post(favorites_handler::add_favorite),
        )
        .route("/favorites/{id}", delete(favorites_handler::remove_favorite))
        .layer(Extension(orchestrator))
        .layer(Extension(assembler))
        .layer(Extension(favorites))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 运行时统计端点
///
/// # 返回值
///
/// 返回缓存命中/未命中/写入计数
pub async fn stats(
    Extension(orchestrator): Extension<Arc<SearchOrchestrator>>,
) -> Json<serde_json::Value> {
    Json(json!({ "cache": orchestrator.cache_stats() }))
}
