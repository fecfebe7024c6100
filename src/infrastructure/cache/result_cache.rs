// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::models::novel::NovelRecord;

/// 缓存条目，写入后不可变，过期时刻为绝对时间
struct CacheEntry {
    payload: Vec<NovelRecord>,
    expires_at: Instant,
}

/// 缓存统计，经 `/stats` 对外暴露
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
}

/// 查询结果缓存
///
/// 按规范化查询签名对搜索结果做TTL记忆化。过期在读取时惰性判定：
/// 过期的读取表现为未命中并移除旧条目，后续写入覆盖。
/// 缓存是建议性的，进程内实现没有可失败的后端。
pub struct ResultCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

impl ResultCache {
    /// 默认TTL 3600 秒
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
        }
    }

    /// 查询签名：小写去空白的关键词 + 书源限定
    ///
    /// 包含书源参数，避免跨书源的结果串染。
    pub fn signature(keyword: &str, source: Option<&str>) -> String {
        format!(
            "{}|{}",
            keyword.trim().to_lowercase(),
            source.unwrap_or_default()
        )
    }

    pub fn get(&self, signature: &str) -> Option<Vec<NovelRecord>> {
        if let Some(entry) = self.entries.get(signature) {
            if entry.expires_at > Instant::now() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.payload.clone());
            }
        }

        // 过期条目视为未命中并即时清除
        self.entries
            .remove_if(signature, |_, entry| entry.expires_at <= Instant::now());
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn put(&self, signature: &str, payload: Vec<NovelRecord>) {
        debug!(signature, count = payload.len(), "caching search results");
        self.entries.insert(
            signature.to_string(),
            CacheEntry {
                payload,
                expires_at: Instant::now() + self.ttl,
            },
        );
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> NovelRecord {
        NovelRecord {
            title: title.to_string(),
            author: String::new(),
            cover: String::new(),
            description: String::new(),
            link: "https://example.com/1".to_string(),
            source: "万书网".to_string(),
        }
    }

    #[test]
    fn test_signature_normalization() {
        assert_eq!(
            ResultCache::signature("  Dragon ", None),
            ResultCache::signature("dragon", None)
        );
        assert_ne!(
            ResultCache::signature("dragon", Some("万书网")),
            ResultCache::signature("dragon", None)
        );
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResultCache::new(Duration::from_secs(3600));
        let sig = ResultCache::signature("dragon", None);

        assert!(cache.get(&sig).is_none());
        cache.put(&sig, vec![record("龙族")]);

        let hit = cache.get(&sig).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].title, "龙族");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.stores, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_behaves_as_miss() {
        let cache = ResultCache::new(Duration::from_millis(10));
        let sig = ResultCache::signature("dragon", None);
        cache.put(&sig, vec![record("龙族")]);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get(&sig).is_none());

        // 过期后的覆盖写入重新生效
        cache.put(&sig, vec![record("龙王传说")]);
        assert_eq!(cache.get(&sig).unwrap()[0].title, "龙王传说");
    }
}
