// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::errors::OrchestratorError;
use crate::domain::models::novel::{ChapterRef, NovelRecord, SearchQuery};
use crate::domain::models::source::SourceDefinition;
use crate::domain::services::extractor;
use crate::domain::services::source_registry::SourceRegistry;
use crate::engines::fetcher::{FetchOptions, Fetcher};
use crate::infrastructure::cache::result_cache::{CacheStats, ResultCache};

/// 搜索编排器
///
/// 查询流程：校验 → 查缓存 → 按注册表给出的优先顺序逐个尝试书源，
/// 抓取加抽取产出非空结果即回写缓存并返回；抓取失败或抽取为空都
/// 只记录原因并换下一个书源。书源严格串行尝试，不并行，既限制对
/// 单个外部站点的压力，也让行为对测试可确定。
pub struct SearchOrchestrator {
    registry: Arc<SourceRegistry>,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<ResultCache>,
    fetch_timeout: Duration,
}

impl SearchOrchestrator {
    pub fn new(
        registry: Arc<SourceRegistry>,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<ResultCache>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            fetcher,
            cache,
            fetch_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 执行一次搜索
    ///
    /// # 错误
    ///
    /// * `InvalidQuery` - 关键词为空
    /// * `AllSourcesUnavailable` - 回退链耗尽，携带已尝试的书源
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<NovelRecord>, OrchestratorError> {
        let keyword = query.normalized_keyword()?;
        let signature = ResultCache::signature(keyword, query.source.as_deref());

        if let Some(cached) = self.cache.get(&signature) {
            debug!(keyword, "cache hit");
            return Ok(cached);
        }

        let candidates: Vec<SourceDefinition> = self
            .registry
            .list(true)
            .await
            .into_iter()
            .filter(|s| query.source.as_deref().is_none_or(|name| s.name == name))
            .collect();

        let mut tried = Vec::new();
        for source in candidates {
            match self.try_source(&source, keyword).await {
                Ok(records) if !records.is_empty() => {
                    info!(keyword, source = %source.name, count = records.len(), "search succeeded");
                    self.cache.put(&signature, records.clone());
                    return Ok(records);
                }
                Ok(_) => {
                    // 抽取为空是软失败，继续回退链
                    debug!(keyword, source = %source.name, "no results extracted, trying next source");
                }
                Err(e) => {
                    warn!(keyword, source = %source.name, error = %e, "source attempt failed");
                }
            }
            tried.push(source.name.clone());
        }

        Err(OrchestratorError::AllSourcesUnavailable { tried })
    }

    /// 获取书籍目录
    ///
    /// 书源按名称指定；缺省时按目录页URL的主机名反查。
    pub async fn fetch_chapters(
        &self,
        url: &str,
        source: Option<&str>,
    ) -> Result<Vec<ChapterRef>, OrchestratorError> {
        let source = self.resolve_source(url, source).await?;
        let html = self
            .fetcher
            .fetch_html(url, &self.options_for(&source))
            .await?;
        // 章节相对链接以目录页自身为基准解析
        let base = Self::parse_base(url)?;
        Ok(extractor::extract_chapters(&html, &source.selectors, &base))
    }

    /// 获取单章正文
    pub async fn fetch_content(&self, url: &str) -> Result<String, OrchestratorError> {
        let source = self.resolve_source(url, None).await?;
        let html = self
            .fetcher
            .fetch_html(url, &self.options_for(&source))
            .await?;
        Ok(extractor::extract_content(&html, &source.selectors))
    }

    async fn try_source(
        &self,
        source: &SourceDefinition,
        keyword: &str,
    ) -> Result<Vec<NovelRecord>, OrchestratorError> {
        let base = Self::parse_base(&source.url)?;
        let search_url = source.search_url(keyword);
        let html = self
            .fetcher
            .fetch_html(&search_url, &self.options_for(source))
            .await?;
        Ok(extractor::extract_list(
            &html,
            &source.selectors,
            &base,
            &source.name,
        ))
    }

    async fn resolve_source(
        &self,
        url: &str,
        name: Option<&str>,
    ) -> Result<SourceDefinition, OrchestratorError> {
        match name {
            Some(name) => self.registry.get(name).await.ok_or_else(|| {
                OrchestratorError::InvalidSource(format!("unknown source: {}", name))
            }),
            None => self.registry.find_by_url(url).await.ok_or_else(|| {
                OrchestratorError::InvalidSource(format!("no registered source matches {}", url))
            }),
        }
    }

    fn options_for(&self, source: &SourceDefinition) -> FetchOptions {
        let mut options = FetchOptions {
            timeout: self.fetch_timeout,
            delay: Duration::from_millis(source.render_delay_ms),
            ..FetchOptions::default()
        };
        options.headers.extend(source.headers.clone());
        options
    }

    fn parse_base(url: &str) -> Result<Url, OrchestratorError> {
        Url::parse(url)
            .map_err(|e| OrchestratorError::InvalidSource(format!("invalid url {}: {}", url, e)))
    }
}
