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

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器、抓取器、缓存、健康探活、书源与存储等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取器配置
    pub fetcher: FetcherSettings,
    /// 结果缓存配置
    pub cache: CacheSettings,
    /// 健康探活配置
    pub health: HealthSettings,
    /// 书源配置
    pub sources: SourceSettings,
    /// 存储配置
    pub storage: StorageSettings,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取器配置设置
#[derive(Debug, Deserialize)]
pub struct FetcherSettings {
    /// 单次导航超时（秒）
    pub timeout_secs: u64,
    /// 失败后的重试次数（总尝试次数 = 重试次数 + 1）
    pub max_retries: u32,
    /// 浏览器启动的内部重试次数
    pub launch_retries: u32,
}

/// 结果缓存配置设置
#[derive(Debug, Deserialize)]
pub struct CacheSettings {
    /// 缓存条目存活时间（秒）
    pub ttl_seconds: u64,
}

/// 健康探活配置设置
#[derive(Debug, Deserialize)]
pub struct HealthSettings {
    /// 探活周期（秒）
    pub check_interval_secs: u64,
    /// 单次探活超时（秒）
    pub probe_timeout_secs: u64,
}

/// 书源配置设置
#[derive(Debug, Deserialize)]
pub struct SourceSettings {
    /// 按探活延迟升序排列书源；关闭后退回注册顺序
    pub order_by_latency: bool,
}

/// 存储配置设置
#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// 书源注册表文件路径
    pub registry_path: String,
    /// 收藏列表文件路径
    pub favorites_path: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件与环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("NOVELRS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 写入全部内置默认值，不读取文件与环境变量
    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default fetcher settings
            .set_default("fetcher.timeout_secs", 30)?
            .set_default("fetcher.max_retries", 2)?
            .set_default("fetcher.launch_retries", 2)?
            // Default cache settings
            .set_default("cache.ttl_seconds", 3600)?
            // Default health settings
            .set_default("health.check_interval_secs", 1800)?
            .set_default("health.probe_timeout_secs", 5)?
            // Default source settings
            .set_default("sources.order_by_latency", true)?
            // Default storage settings
            .set_default("storage.registry_path", "data/sources.json")?
            .set_default("storage.favorites_path", "data/favorites.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 只经过默认值层构建，不受配置文件与环境变量影响
    #[test]
    fn test_defaults_match_contract() {
        let settings: Settings = Settings::with_defaults(Config::builder())
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.fetcher.timeout_secs, 30);
        assert_eq!(settings.fetcher.max_retries, 2);
        assert_eq!(settings.cache.ttl_seconds, 3600);
        assert_eq!(settings.health.check_interval_secs, 1800);
        assert_eq!(settings.health.probe_timeout_secs, 5);
        assert!(settings.sources.order_by_latency);
    }
}
