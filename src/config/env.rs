//! Environment variable configuration module.
//!
//! Provides environment variable loading and the global `APP_CONFIG` instance.

use std::env;
use std::sync::Once;

use once_cell::sync::Lazy;

use crate::error::{AppError, AppResult};

static INIT: Once = Once::new();

/// Initializes the environment by loading the .env file.
/// This is called automatically when `get_env` is first used.
fn init_env() {
    INIT.call_once(|| {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
    });
}

/// Retrieves an environment variable by key.
///
/// If the variable is not set, returns the provided default value.
/// If no default is provided and the variable is not set, returns an empty string.
pub fn get_env(key: &str, default: Option<&str>) -> String {
    init_env();
    env::var(key).unwrap_or_else(|_| default.unwrap_or("").to_string())
}

/// Retrieves an environment variable as a parsed type.
pub fn get_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    init_env();
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a comma separated list, dropping blank items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    // Redis settings
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u32,
    pub redis_password: String,
    pub redis_max_connections: usize,

    // Feed settings
    pub feed_title: String,
    pub feed_url: String,

    // Telegram settings
    pub bot_token: String,
    pub bot_proxy: String,
    pub chat_id: String,
    pub telegram_api_url: String,
    pub open_button_text: String,

    // Schedule: runs at first_update_at_hour, then every update_every_hours until midnight
    pub first_update_at_hour: u32,
    pub update_every_hours: u32,

    // Filtering
    pub blacklist_words: Vec<String>,
    pub blacklist_urls: Vec<String>,

    // Networking
    pub http_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub poll_retry_secs: u64,

    // Health server
    pub server_port: u16,

    // Sentry settings
    pub sentry_dsn: String,
    pub sentry_traces_sample_rate: f32,
}

impl AppConfig {
    /// Creates a new `AppConfig` from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_host: get_env("REDIS_HOST", Some("redis")),
            redis_port: get_env_parsed("REDIS_PORT", 6379),
            redis_db: get_env_parsed("REDIS_DB", 0),
            redis_password: get_env("REDIS_PASSWORD", None),
            redis_max_connections: get_env_parsed("REDIS_MAX_CONNECTIONS", 8),

            feed_title: get_env("FEED_TITLE", Some("Planet Python")),
            feed_url: get_env("FEED_URL", Some("https://planetpython.org/rss20.xml")),

            bot_token: get_env("BOT_TOKEN", None),
            bot_proxy: get_env("BOT_PROXY", None),
            chat_id: get_env("CHAT_ID", None),
            telegram_api_url: get_env("TELEGRAM_API_URL", Some("https://api.telegram.org")),
            open_button_text: get_env("OPEN_BUTTON_TEXT", Some("Открыть")),

            first_update_at_hour: get_env_parsed("FIRST_UPDATE_AT_HOUR", 2),
            update_every_hours: get_env_parsed("UPDATE_EVERY_HOURS", 8),

            blacklist_words: parse_list(&get_env("BLACKLIST_WORDS", None)),
            blacklist_urls: parse_list(&get_env("BLACKLIST_URLS", None)),

            http_timeout_secs: get_env_parsed("HTTP_TIMEOUT_SECS", 30),
            poll_timeout_secs: get_env_parsed("POLL_TIMEOUT_SECS", 30),
            poll_retry_secs: get_env_parsed("POLL_RETRY_SECS", 5),

            server_port: get_env_parsed("SERVER_PORT", 8080),

            sentry_dsn: get_env("SENTRY_DSN", None),
            sentry_traces_sample_rate: get_env_parsed("SENTRY_TRACES_SAMPLE_RATE", 0.1),
        }
    }

    /// Checks the settings required to talk to Telegram and build the schedule.
    pub fn validate(&self) -> AppResult<()> {
        if self.bot_token.trim().is_empty() {
            return Err(AppError::Config("BOT_TOKEN is not set".to_string()));
        }
        if self.chat_id.trim().is_empty() {
            return Err(AppError::Config("CHAT_ID is not set".to_string()));
        }
        if self.first_update_at_hour >= 24 {
            return Err(AppError::Config(format!(
                "FIRST_UPDATE_AT_HOUR must be below 24, got {}",
                self.first_update_at_hour
            )));
        }
        if self.update_every_hours == 0 {
            return Err(AppError::Config(
                "UPDATE_EVERY_HOURS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Masks the `user:password@` part of a URL.
pub fn redact_credentials(raw: &str) -> String {
    match reqwest::Url::parse(raw) {
        Ok(mut url) if !url.username().is_empty() || url.password().is_some() => {
            if url.set_username("***").is_err() || url.set_password(None).is_err() {
                return "<redacted>".to_string();
            }
            url.to_string()
        }
        // Anything else with an `@` may still hold a secret
        _ if raw.contains('@') => "<redacted>".to_string(),
        _ => raw.to_string(),
    }
}

// The bot token is a credential, keep it out of debug output.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("redis_host", &self.redis_host)
            .field("redis_port", &self.redis_port)
            .field("redis_db", &self.redis_db)
            .field("redis_max_connections", &self.redis_max_connections)
            .field("feed_title", &self.feed_title)
            .field("feed_url", &self.feed_url)
            .field("bot_token", &"<redacted>")
            .field("bot_proxy", &redact_credentials(&self.bot_proxy))
            .field("chat_id", &self.chat_id)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("open_button_text", &self.open_button_text)
            .field("first_update_at_hour", &self.first_update_at_hour)
            .field("update_every_hours", &self.update_every_hours)
            .field("blacklist_words", &self.blacklist_words)
            .field("blacklist_urls", &self.blacklist_urls)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("poll_retry_secs", &self.poll_retry_secs)
            .field("server_port", &self.server_port)
            .finish_non_exhaustive()
    }
}

/// Global application configuration instance.
pub static APP_CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
