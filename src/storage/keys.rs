//! Redis key layout.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::Reaction;
use crate::utils::hash_url;

pub const KEY_PREFIX: &str = "rssbot";

pub const LAST_POST_TIME_KEY: &str = "rssbot:lastposttime";

pub const ENTRY_BY_URL_PATTERN: &str = "rssbot:entry_by_url:*";

/// Every key written for posted entries and their reactions.
pub const ENTRY_PATTERNS: [&str; 4] = [
    ENTRY_BY_URL_PATTERN,
    "rssbot:entry_by_message_id:*",
    "rssbot:entry_user_likes:*",
    "rssbot:entry_user_dislikes:*",
];

pub fn entry_by_url(url: &str) -> String {
    format!("{KEY_PREFIX}:entry_by_url:{}", hash_url(url))
}

pub fn entry_by_message_id(message_id: i64) -> String {
    format!("{KEY_PREFIX}:entry_by_message_id:{message_id}")
}

/// Set of user ids holding the given reaction on an entry.
pub fn reaction_users(url: &str, reaction: Reaction) -> String {
    let kind = match reaction {
        Reaction::Like => "entry_user_likes",
        Reaction::Dislike => "entry_user_dislikes",
    };
    format!("{KEY_PREFIX}:{kind}:{}", hash_url(url))
}

/// Parses a stored post time.
///
/// Accepts RFC 3339 and naive ISO 8601 timestamps; the latter are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};

    use super::*;

    #[test]
    fn test_entry_by_url_key() {
        let key = entry_by_url("https://example.com/");
        assert!(key.starts_with("rssbot:entry_by_url:"));
        assert_eq!(key.len(), "rssbot:entry_by_url:".len() + 64);
    }

    #[test]
    fn test_entry_by_message_id_key() {
        assert_eq!(entry_by_message_id(1337), "rssbot:entry_by_message_id:1337");
    }

    #[test]
    fn test_reaction_keys_share_hash() {
        let url = "https://example.com/post";
        let likes = reaction_users(url, Reaction::Like);
        let dislikes = reaction_users(url, Reaction::Dislike);
        assert_eq!(likes, format!("rssbot:entry_user_likes:{}", hash_url(url)));
        assert_eq!(dislikes, format!("rssbot:entry_user_dislikes:{}", hash_url(url)));
    }

    #[test]
    fn test_patterns_cover_generated_keys() {
        let url = "https://example.com/post";
        let keys = [
            entry_by_url(url),
            entry_by_message_id(1),
            reaction_users(url, Reaction::Like),
            reaction_users(url, Reaction::Dislike),
        ];
        for (key, pattern) in keys.iter().zip(ENTRY_PATTERNS) {
            assert!(key.starts_with(pattern.trim_end_matches('*')));
        }
    }

    // ============ parse_timestamp 테스트 ============

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let parsed = parse_timestamp("2024-03-01T10:00:00+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_naive_with_micros() {
        let parsed = parse_timestamp("2019-05-20T18:00:03.123456").unwrap();
        assert_eq!(parsed.year(), 2019);
        assert_eq!(parsed.hour(), 18);
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_timestamp_naive_without_fraction() {
        let parsed = parse_timestamp("2019-05-20T18:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 5, 20, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
