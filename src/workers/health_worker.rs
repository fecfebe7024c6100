// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::domain::services::source_registry::SourceRegistry;

/// 书源健康监控
///
/// 与查询流量无关地按固定周期运行。每轮对所有已注册书源发起
/// 轻量 HEAD 探活（不取内容），单个探活受短超时约束；一轮内
/// 的探活并发发出并等待全部落定，慢源不会拖延其它源的回写。
/// 进程启动时先跑一轮，再进入周期调度。
pub struct HealthWorker {
    registry: Arc<SourceRegistry>,
    client: reqwest::Client,
    check_interval: Duration,
    probe_timeout: Duration,
}

impl HealthWorker {
    pub fn new(
        registry: Arc<SourceRegistry>,
        check_interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            client: reqwest::Client::new(),
            check_interval,
            probe_timeout,
        }
    }

    /// 周期运行，永不返回
    pub async fn run(self: Arc<Self>) {
        info!(interval = ?self.check_interval, "health worker started");
        self.run_cycle().await;

        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // 第一个 tick 立即完成，对应上面已执行的启动轮
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// 执行一轮探活并回写注册表
    pub async fn run_cycle(&self) {
        let sources = self.registry.list(false).await;
        if sources.is_empty() {
            return;
        }

        let probes = sources.iter().map(|source| {
            let name = source.name.clone();
            let url = source.url.clone();
            async move {
                let result = self.probe(&url).await;
                (name, result)
            }
        });

        for (name, result) in join_all(probes).await {
            match result {
                Ok(latency) => {
                    debug!(source = %name, latency_ms = latency.as_millis() as u64, "probe ok");
                    self.registry.update_health(&name, true, Some(latency)).await;
                }
                Err(reason) => {
                    warn!(source = %name, reason, "probe failed, disabling source");
                    self.registry.update_health(&name, false, None).await;
                }
            }
        }
    }

    async fn probe(&self, url: &str) -> Result<Duration, String> {
        let started = Instant::now();
        let response = self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_server_error() {
            return Err(format!("server error: {}", response.status()));
        }
        Ok(started.elapsed())
    }
}
