// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::errors::{OrchestratorError, StorageError};

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口。
/// 对外只返回可读的错误消息，内部原因走日志。
#[derive(Debug)]
pub struct AppError {
    error: anyhow::Error,
    available_sources: Option<Vec<String>>,
}

impl AppError {
    /// 附带可用书源列表的错误响应，搜索校验失败时使用
    pub fn with_sources(err: impl Into<anyhow::Error>, sources: Vec<String>) -> Self {
        Self {
            error: err.into(),
            available_sources: Some(sources),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_message = self.error.to_string();

        if let Some(err) = self.error.downcast_ref::<OrchestratorError>() {
            let status = match err {
                OrchestratorError::InvalidQuery | OrchestratorError::InvalidSource(_) => {
                    StatusCode::BAD_REQUEST
                }
                OrchestratorError::DuplicateSource(_) => StatusCode::CONFLICT,
                OrchestratorError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
                OrchestratorError::PoolUnavailable(_)
                | OrchestratorError::AllSourcesUnavailable { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                OrchestratorError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };

            // 回退链耗尽时附带已尝试的书源，校验失败时附带可用书源，供前端提示
            let body = match (err, &self.available_sources) {
                (OrchestratorError::AllSourcesUnavailable { tried }, _) => {
                    json!({ "error": error_message, "availableSources": tried })
                }
                (_, Some(sources)) => {
                    json!({ "error": error_message, "availableSources": sources })
                }
                _ => json!({ "error": error_message }),
            };
            return (status, Json(body)).into_response();
        }

        let status = match self.error.downcast_ref::<StorageError>() {
            Some(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            error: err.into(),
            available_sources: None,
        }
    }
}
