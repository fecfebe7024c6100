// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

use crate::domain::errors::OrchestratorError;
use crate::domain::models::source::SourceDefinition;
use crate::domain::repositories::registry_repository::RegistryRepository;

/// 书源注册表
///
/// 持有全部书源定义及其健康/延迟状态。注册顺序保留在内部向量中；
/// `list` 的返回顺序默认为启用书源按延迟升序（未探测的排最后），
/// 相同延迟按注册顺序，可通过配置退回纯注册顺序。
/// 每次变更都会整体持久化，进程重启后状态得以恢复。
pub struct SourceRegistry {
    sources: RwLock<Vec<SourceDefinition>>,
    repo: Arc<dyn RegistryRepository>,
    order_by_latency: bool,
}

impl SourceRegistry {
    /// 从持久化存储装载注册表；存储为空时写入缺省书源
    pub async fn load(
        repo: Arc<dyn RegistryRepository>,
        defaults: Vec<SourceDefinition>,
        order_by_latency: bool,
    ) -> Result<Self, OrchestratorError> {
        let mut sources = repo.load().await?;
        if sources.is_empty() {
            info!(count = defaults.len(), "registry empty, seeding default sources");
            sources = defaults;
            repo.save(&sources).await?;
        }

        Ok(Self {
            sources: RwLock::new(sources),
            repo,
            order_by_latency,
        })
    }

    /// 列出书源
    ///
    /// # 参数
    ///
    /// * `enabled_only` - 仅返回启用的书源
    pub async fn list(&self, enabled_only: bool) -> Vec<SourceDefinition> {
        let mut sources: Vec<SourceDefinition> = self
            .sources
            .read()
            .await
            .iter()
            .filter(|s| !enabled_only || s.enabled)
            .cloned()
            .collect();

        if self.order_by_latency {
            // 稳定排序，延迟相同退化为注册顺序
            sources.sort_by_key(|s| s.latency_ms.unwrap_or(u64::MAX));
        }

        sources
    }

    /// 全部书源名称，按注册顺序
    pub async fn names(&self) -> Vec<String> {
        self.sources.read().await.iter().map(|s| s.name.clone()).collect()
    }

    pub async fn get(&self, name: &str) -> Option<SourceDefinition> {
        self.sources
            .read()
            .await
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    /// 按页面URL反查所属书源（主机名匹配）
    pub async fn find_by_url(&self, url: &str) -> Option<SourceDefinition> {
        let host = Url::parse(url).ok()?.host_str()?.to_string();
        self.sources
            .read()
            .await
            .iter()
            .find(|s| {
                Url::parse(&s.url)
                    .ok()
                    .and_then(|u| u.host_str().map(|h| h == host))
                    .unwrap_or(false)
            })
            .cloned()
    }

    /// 注册新书源
    ///
    /// # 错误
    ///
    /// * `InvalidSource` - 名称或URL为空
    /// * `DuplicateSource` - URL已被占用
    pub async fn register(&self, def: SourceDefinition) -> Result<(), OrchestratorError> {
        if def.name.trim().is_empty() || def.url.trim().is_empty() {
            return Err(OrchestratorError::InvalidSource(
                "source name and url are required".to_string(),
            ));
        }

        let mut sources = self.sources.write().await;
        if sources.iter().any(|s| s.url == def.url) {
            return Err(OrchestratorError::DuplicateSource(def.url));
        }

        info!(name = %def.name, url = %def.url, "registering source");
        sources.push(def);
        self.repo.save(&sources).await?;
        Ok(())
    }

    /// 回写探活结果
    ///
    /// 成功时 `enabled=true` 并更新延迟；失败时 `enabled=false`，
    /// 两种情况都会刷新 `last_checked`。持久化失败只告警，
    /// 不让健康回写中断调用方。
    pub async fn update_health(&self, name: &str, ok: bool, latency: Option<Duration>) {
        let mut sources = self.sources.write().await;
        let Some(source) = sources.iter_mut().find(|s| s.name == name) else {
            warn!(name, "health report for unknown source");
            return;
        };

        source.enabled = ok;
        source.last_checked = Some(Utc::now());
        if ok {
            source.latency_ms = latency.map(|d| d.as_millis() as u64);
        }

        if let Err(e) = self.repo.save(&sources).await {
            warn!(error = %e, "failed to persist registry after health update");
        }
    }
}
