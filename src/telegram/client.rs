//! Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};
use crate::telegram::types::{
    AnswerCallbackQuery, ApiResponse, EditMessageReplyMarkup, GetUpdates, InlineKeyboardMarkup,
    Message, SendMessage, Update,
};

/// Updates the bot subscribes to when polling.
const ALLOWED_UPDATES: &[&str] = &["callback_query"];

/// Extra time granted to a long poll on top of its server-side timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// The chat operations the bot needs.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends an HTML formatted message with an inline keyboard.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        markup: &InlineKeyboardMarkup,
    ) -> AppResult<Message>;

    async fn edit_message_reply_markup(
        &self,
        chat_id: &str,
        message_id: i64,
        markup: &InlineKeyboardMarkup,
    ) -> AppResult<()>;

    async fn answer_callback_query(&self, callback_query_id: &str) -> AppResult<()>;

    /// Long-polls for callback queries newer than `offset`.
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> AppResult<Vec<Update>>;
}

/// `ChatClient` speaking the HTTPS Bot API.
pub struct TelegramClient {
    client: reqwest::Client,
    /// `{api_url}/bot{token}`; contains the token, never log it.
    endpoint: String,
}

impl TelegramClient {
    /// Creates a client, routing all calls through `proxy` when given.
    pub fn new(
        api_url: &str,
        token: &str,
        proxy: Option<&str>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(proxy) = proxy.filter(|p| !p.is_empty()) {
            builder = builder.proxy(reqwest::Proxy::all(proxy).map_err(reqwest::Error::without_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    async fn call<P, T>(&self, method: &str, params: &P, timeout: Option<Duration>) -> AppResult<T>
    where
        P: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(format!("{}/{method}", self.endpoint))
            .json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // reqwest errors carry the request URL, which embeds the token
        let response = request.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        match body.result {
            Some(result) if body.ok => Ok(result),
            _ => {
                let description = body
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
                if let Some(retry_after_secs) = body.parameters.and_then(|p| p.retry_after) {
                    tracing::warn!(method, retry_after_secs, "Bot API rate limit hit");
                    return Err(AppError::RateLimited {
                        method: method.to_string(),
                        retry_after_secs,
                    });
                }
                tracing::debug!(method, error_code = ?body.error_code, "Bot API call failed");
                Err(AppError::Telegram(format!("{method}: {description}")))
            }
        }
    }
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        markup: &InlineKeyboardMarkup,
    ) -> AppResult<Message> {
        let params = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
            reply_markup: markup,
        };
        self.call("sendMessage", &params, None).await
    }

    async fn edit_message_reply_markup(
        &self,
        chat_id: &str,
        message_id: i64,
        markup: &InlineKeyboardMarkup,
    ) -> AppResult<()> {
        let params = EditMessageReplyMarkup {
            chat_id,
            message_id,
            reply_markup: markup,
        };

        // Result is the edited message, or `true` for inline messages
        match self
            .call::<_, serde_json::Value>("editMessageReplyMarkup", &params, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(AppError::Telegram(msg)) if msg.contains("message is not modified") => {
                tracing::debug!(message_id, "Keyboard already up to date");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> AppResult<()> {
        let params = AnswerCallbackQuery { callback_query_id };
        let _: bool = self.call("answerCallbackQuery", &params, None).await?;
        Ok(())
    }

    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> AppResult<Vec<Update>> {
        let params = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: ALLOWED_UPDATES,
        };
        let timeout = Duration::from_secs(timeout_secs) + POLL_GRACE;
        self.call("getUpdates", &params, Some(timeout)).await
    }
}
