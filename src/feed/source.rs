//! Feed sources.

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::error::AppResult;
use crate::feed::parser::parse_feed;
use crate::models::FeedEntry;

/// Somewhere feed entries come from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human readable location, used in logs.
    fn location(&self) -> &str;

    async fn fetch(&self) -> AppResult<Vec<FeedEntry>>;
}

/// Downloads a feed over HTTP(S) and parses it.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.8",
            ),
        );
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("rssbot/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> AppResult<Vec<FeedEntry>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.bytes().await?;

        parse_feed(&decode_body(&body, content_type.as_deref()))
    }
}

/// Decodes a feed body to text.
///
/// A byte order mark wins, then the `charset` of the Content-Type header,
/// then the encoding named in the XML declaration. UTF-8 otherwise.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| encoding_from_declaration(body))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::warn!(
            encoding = used.name(),
            "Feed contains bytes that are invalid in its encoding"
        );
    }
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Reads `encoding="..."` from the `<?xml ...?>` declaration.
fn encoding_from_declaration(body: &[u8]) -> Option<&'static Encoding> {
    // The declaration itself is ASCII in any encoding it can name
    let head = String::from_utf8_lossy(&body[..body.len().min(256)]);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    let declaration = head.strip_prefix("<?xml")?.split("?>").next()?;

    let after = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let value = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = value.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let label = value[1..].split(quote).next()?;

    Encoding::for_label(label.trim().as_bytes())
}
