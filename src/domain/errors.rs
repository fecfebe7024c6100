// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 编排核心错误分类
///
/// 调用方输入错误（InvalidQuery/InvalidSource/DuplicateSource）不会被重试；
/// FetchFailed 在抓取器内部按固定上限重试后才会浮出；
/// PoolUnavailable 对当前请求致命、对进程非致命，下一个请求会惰性重试启动；
/// AllSourcesUnavailable 为请求级终态，携带已尝试的书源列表。
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("search keyword must not be empty")]
    InvalidQuery,

    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("source already registered: {0}")]
    DuplicateSource(String),

    #[error("fetch failed: {0}")]
    FetchFailed(String),

    #[error("browser pool unavailable: {0}")]
    PoolUnavailable(String),

    #[error("all sources unavailable (tried: {})", tried.join(", "))]
    AllSourcesUnavailable { tried: Vec<String> },

    #[error("storage failure: {0}")]
    Storage(String),
}

/// 持久化存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("not found")]
    NotFound,
}

impl From<StorageError> for OrchestratorError {
    fn from(err: StorageError) -> Self {
        OrchestratorError::Storage(err.to_string())
    }
}
