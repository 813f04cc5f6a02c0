//! Entry model module.
//!
//! Contains feed items, records of posted entries and reaction counters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single item read from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// An entry that has been posted to the chat.
///
/// Serialized as `{"url": .., "message_id": .., "message_text": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedEntry {
    pub url: String,
    pub message_id: i64,
    pub message_text: String,
}

/// A reader's reaction to a posted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    /// Callback data attached to the keyboard button.
    pub const fn callback_data(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }

    /// The reaction that excludes this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Like => Self::Dislike,
            Self::Dislike => Self::Like,
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.callback_data())
    }
}

impl FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(format!("unknown reaction: {other}")),
        }
    }
}

/// Like/dislike counters of a posted entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Reactions {
    pub likes: u64,
    pub dislikes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_posted_entry() -> PostedEntry {
        PostedEntry {
            url: "https://example.com/post".to_string(),
            message_id: 4242,
            message_text: "<b>[Planet Python]</b>\n<a href=\"https://example.com/post\">Post</a>"
                .to_string(),
        }
    }

    // ============ PostedEntry 테스트 ============

    #[test]
    fn test_posted_entry_json_shape() {
        let json = serde_json::to_value(create_posted_entry()).unwrap();
        assert_eq!(json["url"], "https://example.com/post");
        assert_eq!(json["message_id"], 4242);
        assert!(json["message_text"].as_str().unwrap().contains("Planet Python"));
    }

    #[test]
    fn test_posted_entry_reads_stored_json() {
        // Records written by earlier deployments look exactly like this.
        let stored = r#"{"url": "https://example.com/x", "message_id": 17, "message_text": "hi"}"#;
        let entry: PostedEntry = serde_json::from_str(stored).unwrap();
        assert_eq!(entry.url, "https://example.com/x");
        assert_eq!(entry.message_id, 17);
    }

    #[test]
    fn test_posted_entry_rejects_missing_url() {
        let stored = r#"{"message_id": 17, "message_text": "hi"}"#;
        assert!(serde_json::from_str::<PostedEntry>(stored).is_err());
    }

    // ============ Reaction 테스트 ============

    #[test]
    fn test_reaction_from_str() {
        assert_eq!("like".parse::<Reaction>(), Ok(Reaction::Like));
        assert_eq!("dislike".parse::<Reaction>(), Ok(Reaction::Dislike));
        assert!("Like".parse::<Reaction>().is_err());
        assert!("likes".parse::<Reaction>().is_err());
        assert!("".parse::<Reaction>().is_err());
    }

    #[test]
    fn test_reaction_opposite() {
        assert_eq!(Reaction::Like.opposite(), Reaction::Dislike);
        assert_eq!(Reaction::Dislike.opposite(), Reaction::Like);
    }

    #[test]
    fn test_reaction_display_matches_callback_data() {
        assert_eq!(Reaction::Like.to_string(), "like");
        assert_eq!(Reaction::Dislike.to_string(), Reaction::Dislike.callback_data());
    }

    #[test]
    fn test_reactions_default_zero() {
        let reactions = Reactions::default();
        assert_eq!(reactions.likes, 0);
        assert_eq!(reactions.dislikes, 0);
    }

    #[test]
    fn test_feed_entry_new() {
        let entry = FeedEntry::new("Title", String::from("https://example.com"));
        assert_eq!(entry.title, "Title");
        assert_eq!(entry.link, "https://example.com");
    }
}
