//! 중앙화된 에러 처리 모듈.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-wide error type.
///
/// All errors in the application should be converted to this type
/// for consistent error handling and reporting.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Feed could not be understood
    #[error("Feed error: {0}")]
    Feed(String),

    /// Bot API answered with `ok: false`
    #[error("Telegram API error: {0}")]
    Telegram(String),

    /// Bot API asked the bot to slow down
    #[error("Telegram API rate limit on {method}, retry after {retry_after_secs}s")]
    RateLimited {
        method: String,
        retry_after_secs: u64,
    },

    /// Malformed XML document
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Redis error
    #[error("Storage error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    /// Redis pool error
    #[error("Storage pool error: {0}")]
    RedisPool(#[from] deadpool_redis::PoolError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error (feed and Bot API)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppError {
    /// Whether the error comes from an unreachable or misbehaving remote.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::HttpClient(_) | Self::RedisPool(_) | Self::Redis(_) | Self::RateLimited { .. }
        )
    }

    /// How long the Bot API asked to wait before the next call, if it did.
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after_secs, ..
            } => Some(Duration::from_secs(*retry_after_secs)),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::Config(msg) | Self::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            Self::Feed(_)
            | Self::Telegram(_)
            | Self::RateLimited { .. }
            | Self::Xml(_)
            | Self::HttpClient(_) => {
                tracing::warn!("Upstream error: {self:?}");
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            Self::Redis(e) => {
                tracing::error!("Redis error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error occurred".to_string(),
                )
            }
            Self::RedisPool(e) => {
                tracing::error!("Redis pool error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage connection error occurred".to_string(),
                )
            }
            Self::Json(e) => {
                tracing::error!("JSON error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("JSON error: {e}"),
                )
            }
        };

        // Report error to Sentry for server errors
        if status.is_server_error() {
            sentry::capture_error(&self);
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_config_display() {
        let error = AppError::Config("BOT_TOKEN is not set".to_string());
        assert_eq!(error.to_string(), "Configuration error: BOT_TOKEN is not set");
    }

    #[test]
    fn test_app_error_telegram_display() {
        let error = AppError::Telegram("Bad Request: chat not found".to_string());
        assert_eq!(
            error.to_string(),
            "Telegram API error: Bad Request: chat not found"
        );
    }

    #[test]
    fn test_app_error_feed_display() {
        let error = AppError::Feed("unknown root element <html>".to_string());
        assert!(error.to_string().starts_with("Feed error:"));
    }

    #[test]
    fn test_xml_error_from() {
        let xml_err = roxmltree::Document::parse("<rss>").unwrap_err();
        let app_err: AppError = xml_err.into();
        assert!(matches!(app_err, AppError::Xml(_)));
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Json(_)));
        assert!(app_err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_is_transient() {
        assert!(!AppError::Config("x".to_string()).is_transient());
        assert!(!AppError::Telegram("x".to_string()).is_transient());
    }

    #[test]
    fn test_rate_limited_retry_after() {
        let error = AppError::RateLimited {
            method: "sendMessage".to_string(),
            retry_after_secs: 14,
        };
        assert!(error.is_transient());
        assert_eq!(error.retry_after(), Some(Duration::from_secs(14)));
        assert_eq!(
            error.to_string(),
            "Telegram API rate limit on sendMessage, retry after 14s"
        );
        assert_eq!(AppError::Telegram("x".to_string()).retry_after(), None);
    }

    // ============ IntoResponse 테스트 ============

    #[tokio::test]
    async fn test_config_into_response() {
        let response = AppError::Config("CHAT_ID is not set".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_telegram_into_response_is_bad_gateway() {
        let response = AppError::Telegram("down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_internal_into_response() {
        let response = AppError::Internal("서버 오류".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_response_is_json() {
        use axum::body::to_bytes;

        let response = AppError::Internal("storage unavailable".to_string()).into_response();
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed["error"], "storage unavailable");
    }
}
