// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::errors::OrchestratorError;
use crate::domain::models::source::DEFAULT_USER_AGENT;
use crate::engines::browser_pool::BrowserPool;

/// 单次抓取选项
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    /// 导航完成后的固定等待，用于客户端渲染内容
    pub delay: Duration,
    /// 整次尝试（导航+等待+取HTML）的超时上限
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
        Self {
            headers,
            delay: Duration::ZERO,
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTML 抓取接口
///
/// 编排层只依赖该接口，浏览器实现可在测试中替换。
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_html(&self, url: &str, options: &FetchOptions)
        -> Result<String, OrchestratorError>;
}

/// 单次导航的执行接口，`ResilientFetcher` 的重试循环建立在其上
#[async_trait]
pub trait PageNavigator: Send + Sync {
    async fn navigate(&self, url: &str, options: &FetchOptions)
        -> Result<String, OrchestratorError>;
}

/// 浏览器导航实现
///
/// 从池中租借全新页面，设置UA与调用方给定的额外请求头，导航并等待
/// 加载完成与可选的渲染延迟，最后取回渲染后的HTML。整段流程受
/// `options.timeout` 约束，超时后该次尝试被放弃，页面由池强制关闭，
/// 不会泄漏。
pub struct BrowserNavigator {
    pool: Arc<BrowserPool>,
}

/// 构造 User-Agent 之外的请求头注入参数，无额外头时为 `None`
///
/// UA 走专门的 override 通道，其余头（Referer、Cookie 等）经
/// `Network.setExtraHTTPHeaders` 附着到该页面的所有出站请求上。
fn extra_header_params(options: &FetchOptions) -> Option<SetExtraHttpHeadersParams> {
    let extra: serde_json::Map<String, serde_json::Value> = options
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("User-Agent"))
        .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
        .collect();

    if extra.is_empty() {
        return None;
    }
    Some(SetExtraHttpHeadersParams::new(Headers::new(
        serde_json::Value::Object(extra),
    )))
}

#[async_trait]
impl PageNavigator for BrowserNavigator {
    async fn navigate(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<String, OrchestratorError> {
        let url = url.to_string();
        let options = options.clone();

        self.pool
            .with_page(move |page| async move {
                tokio::time::timeout(options.timeout, async {
                    if let Some(user_agent) = options.headers.get("User-Agent") {
                        page.set_user_agent(user_agent.as_str())
                            .await
                            .map_err(|e| OrchestratorError::FetchFailed(e.to_string()))?;
                    }
                    if let Some(params) = extra_header_params(&options) {
                        page.execute(params)
                            .await
                            .map_err(|e| OrchestratorError::FetchFailed(e.to_string()))?;
                    }

                    page.goto(url.as_str())
                        .await
                        .map_err(|e| OrchestratorError::FetchFailed(e.to_string()))?;
                    page.wait_for_navigation()
                        .await
                        .map_err(|e| OrchestratorError::FetchFailed(e.to_string()))?;

                    if !options.delay.is_zero() {
                        tokio::time::sleep(options.delay).await;
                    }

                    page.content()
                        .await
                        .map_err(|e| OrchestratorError::FetchFailed(e.to_string()))
                })
                .await
                .map_err(|_| {
                    OrchestratorError::FetchFailed(format!(
                        "navigation timed out after {:?}",
                        options.timeout
                    ))
                })?
            })
            .await
    }
}

/// 带重试的抓取器
///
/// 每次尝试都经由 `PageNavigator` 取得全新会话；任何失败（超时、
/// 导航错误、池不可用）都会整体重试，重试间不退避，总尝试次数为
/// `max_retries + 1`，耗尽后以 `FetchFailed` 浮出最后的原因。
pub struct ResilientFetcher {
    navigator: Arc<dyn PageNavigator>,
    max_retries: u32,
}

impl ResilientFetcher {
    pub fn new(pool: Arc<BrowserPool>, max_retries: u32) -> Self {
        Self {
            navigator: Arc::new(BrowserNavigator { pool }),
            max_retries,
        }
    }

    pub fn with_navigator(navigator: Arc<dyn PageNavigator>, max_retries: u32) -> Self {
        Self {
            navigator,
            max_retries,
        }
    }
}

#[async_trait]
impl Fetcher for ResilientFetcher {
    async fn fetch_html(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<String, OrchestratorError> {
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            match self.navigator.navigate(url, options).await {
                Ok(html) => return Ok(html),
                Err(e) => {
                    warn!(url, attempt, error = %e, "fetch attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(OrchestratorError::FetchFailed(format!(
            "{} ({} attempts): {}",
            url,
            self.max_retries + 1,
            last_error
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingNavigator {
        calls: Arc<AtomicU32>,
        succeed_on: Option<u32>,
    }

    #[async_trait]
    impl PageNavigator for CountingNavigator {
        async fn navigate(
            &self,
            _url: &str,
            _options: &FetchOptions,
        ) -> Result<String, OrchestratorError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.succeed_on {
                Some(n) if call >= n => Ok("<html></html>".to_string()),
                _ => Err(OrchestratorError::FetchFailed("connection reset".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_retry_bound_is_exactly_three_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = ResilientFetcher::with_navigator(
            Arc::new(CountingNavigator {
                calls: calls.clone(),
                succeed_on: None,
            }),
            2,
        );

        let result = fetcher
            .fetch_html("https://unreachable.example", &FetchOptions::default())
            .await;

        assert!(matches!(result, Err(OrchestratorError::FetchFailed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_succeeds_on_second_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = ResilientFetcher::with_navigator(
            Arc::new(CountingNavigator {
                calls: calls.clone(),
                succeed_on: Some(2),
            }),
            2,
        );

        let html = fetcher
            .fetch_html("https://flaky.example", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(html, "<html></html>");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_extra_headers_injected_without_user_agent() {
        let mut options = FetchOptions::default();
        assert!(extra_header_params(&options).is_none());

        options
            .headers
            .insert("Referer".to_string(), "https://a.com/".to_string());
        options
            .headers
            .insert("Cookie".to_string(), "session=abc".to_string());

        let params = extra_header_params(&options).unwrap();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["headers"]["Referer"], "https://a.com/");
        assert_eq!(json["headers"]["Cookie"], "session=abc");
        // UA 走 override 通道，不重复注入
        assert!(json["headers"].get("User-Agent").is_none());
    }

    #[test]
    fn test_default_options() {
        let options = FetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert!(options.delay.is_zero());
        assert!(options.headers.contains_key("User-Agent"));
    }
}
