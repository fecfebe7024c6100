// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::domain::errors::OrchestratorError;

/// 浏览器自动化池
///
/// 最多维持一个存活的浏览器进程，首次使用时惰性创建。
/// 创建经由 `OnceCell` 单飞：并发的首批调用方不会拉起第二个浏览器，
/// 后到者阻塞在进行中的创建上并复用其结果。页面会话通过
/// `with_page` 租借，无论成功、出错还是超时都保证关闭。
pub struct BrowserPool {
    browser: OnceCell<Mutex<Browser>>,
    launch_retries: u32,
    closed: AtomicBool,
}

impl BrowserPool {
    pub fn new(launch_retries: u32) -> Self {
        Self {
            browser: OnceCell::new(),
            launch_retries,
            closed: AtomicBool::new(false),
        }
    }

    /// 租借一个页面会话执行 `f`
    ///
    /// 页面为调用方独占，`f` 返回后页面在所有退出路径上关闭。
    /// `f` 的错误原样透传给调用方。
    pub async fn with_page<T, F, Fut>(&self, f: F) -> Result<T, OrchestratorError>
    where
        F: FnOnce(Page) -> Fut,
        Fut: Future<Output = Result<T, OrchestratorError>>,
    {
        let browser = self.browser().await?;
        let page = {
            let guard = browser.lock().await;
            guard
                .new_page("about:blank")
                .await
                .map_err(|e| OrchestratorError::FetchFailed(format!("failed to open page: {}", e)))?
        };

        let result = f(page.clone()).await;

        if let Err(e) = page.close().await {
            debug!(error = %e, "page close failed");
        }

        result
    }

    /// 关闭浏览器进程，幂等，仅首次调用生效
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(browser) = self.browser.get() {
            let mut guard = browser.lock().await;
            if let Err(e) = guard.close().await {
                warn!(error = %e, "browser close failed");
            } else {
                info!("browser closed");
            }
        }
    }

    async fn browser(&self) -> Result<&Mutex<Browser>, OrchestratorError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(OrchestratorError::PoolUnavailable(
                "pool is shut down".to_string(),
            ));
        }

        self.browser
            .get_or_try_init(|| async {
                let mut last_error = String::new();
                for attempt in 0..=self.launch_retries {
                    match Self::launch().await {
                        Ok(browser) => {
                            info!("browser launched");
                            return Ok(Mutex::new(browser));
                        }
                        Err(e) => {
                            warn!(attempt, error = %e, "browser launch failed");
                            last_error = e;
                        }
                    }
                }
                Err(OrchestratorError::PoolUnavailable(last_error))
            })
            .await
    }

    async fn launch() -> Result<Browser, String> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(30))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| e.to_string())?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| e.to_string())?;

        // 事件处理任务随浏览器进程存亡
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }
}
