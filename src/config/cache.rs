//! Redis 연결 설정 모듈.

use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use once_cell::sync::OnceCell;

use crate::config::env::AppConfig;
use crate::error::{AppError, AppResult};

static CACHE_POOL: OnceCell<Pool> = OnceCell::new();

/// Builds the Redis connection URL from the configuration.
pub fn redis_url(config: &AppConfig) -> String {
    let host = &config.redis_host;
    let port = config.redis_port;
    let db = config.redis_db;

    if config.redis_password.is_empty() {
        format!("redis://{host}:{port}/{db}")
    } else {
        format!("redis://:{}@{host}:{port}/{db}", config.redis_password)
    }
}

/// Initializes the Redis connection pool.
///
/// The pool is stored in a global `OnceCell`; subsequent calls return a clone
/// of the same pool.
///
/// # Errors
///
/// Returns an error if the Redis connection cannot be established
pub async fn init_cache(config: &AppConfig) -> AppResult<Pool> {
    if let Some(pool) = CACHE_POOL.get() {
        return Ok(pool.clone());
    }

    let mut cfg = Config::from_url(redis_url(config));
    cfg.pool = Some(PoolConfig {
        max_size: config.redis_max_connections,
        ..PoolConfig::default()
    });

    let pool = cfg
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| AppError::Internal(format!("Redis pool error: {e}")))?;

    // Test connection
    let conn = pool
        .get()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection test failed: {e}")))?;
    drop(conn);

    CACHE_POOL.set(pool.clone()).ok();
    tracing::info!(
        host = %config.redis_host,
        db = config.redis_db,
        max_connections = config.redis_max_connections,
        "Redis connection pool established"
    );

    Ok(pool)
}

/// Closes the Redis connection pool.
///
/// Note: The pool handles cleanup automatically when dropped.
pub fn close_cache() {
    if let Some(pool) = CACHE_POOL.get() {
        pool.close();
    }
    tracing::info!("Redis connection pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_url_without_password() {
        let mut config = AppConfig::from_env();
        config.redis_host = "redis".to_string();
        config.redis_port = 6379;
        config.redis_db = 3;
        config.redis_password = String::new();
        assert_eq!(redis_url(&config), "redis://redis:6379/3");
    }

    #[test]
    fn test_redis_url_with_password() {
        let mut config = AppConfig::from_env();
        config.redis_host = "localhost".to_string();
        config.redis_port = 6380;
        config.redis_db = 0;
        config.redis_password = "s3cret".to_string();
        assert_eq!(redis_url(&config), "redis://:s3cret@localhost:6380/0");
    }
}
