// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use novelrs::application::chapter_assembler::ChapterAssembler;
use novelrs::application::search_orchestrator::SearchOrchestrator;
use novelrs::config::settings::Settings;
use novelrs::domain::models::source::default_sources;
use novelrs::domain::repositories::favorites_repository::FavoritesRepository;
use novelrs::domain::services::source_registry::SourceRegistry;
use novelrs::engines::browser_pool::BrowserPool;
use novelrs::engines::fetcher::ResilientFetcher;
use novelrs::infrastructure::cache::result_cache::ResultCache;
use novelrs::infrastructure::repositories::file_favorites_repo::FileFavoritesRepo;
use novelrs::infrastructure::repositories::file_registry_repo::FileRegistryRepo;
use novelrs::presentation::routes;
use novelrs::utils::telemetry;
use novelrs::workers::health_worker::HealthWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting novelrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Load source registry from durable store
    let registry_repo = Arc::new(FileRegistryRepo::new(&settings.storage.registry_path));
    let registry = Arc::new(
        SourceRegistry::load(
            registry_repo,
            default_sources(),
            settings.sources.order_by_latency,
        )
        .await?,
    );
    let source_names = registry.names().await;
    info!(sources = source_names.len(), "Source registry loaded");

    // 4. Initialize browser pool and fetcher
    let pool = Arc::new(BrowserPool::new(settings.fetcher.launch_retries));
    let fetcher = Arc::new(ResilientFetcher::new(
        pool.clone(),
        settings.fetcher.max_retries,
    ));

    // 5. Initialize cache and core services
    let cache = Arc::new(ResultCache::new(Duration::from_secs(
        settings.cache.ttl_seconds,
    )));
    let orchestrator = Arc::new(SearchOrchestrator::new(
        registry.clone(),
        fetcher,
        cache,
        Duration::from_secs(settings.fetcher.timeout_secs),
    ));
    let assembler = Arc::new(ChapterAssembler::new(orchestrator.clone()));
    let favorites: Arc<dyn FavoritesRepository> =
        Arc::new(FileFavoritesRepo::new(&settings.storage.favorites_path));

    // 6. Start health worker (initial pass runs inside)
    let health_worker = Arc::new(HealthWorker::new(
        registry,
        Duration::from_secs(settings.health.check_interval_secs),
        Duration::from_secs(settings.health.probe_timeout_secs),
    ));
    tokio::spawn(health_worker.run());

    // 7. Start HTTP server
    let app = routes::build_router(orchestrator, assembler, favorites);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 8. Release the shared browser exactly once
    pool.shutdown().await;
    info!("novelrs stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install ctrl-c handler");
    }
}
