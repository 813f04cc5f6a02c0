//! Inline keyboard attached to every posted entry.

use crate::models::{Reaction, Reactions};
use crate::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Builds the entry keyboard: an "open" button on the first row and the
/// like/dislike counters on the second.
pub fn entry_keyboard(open_text: &str, url: &str, reactions: Reactions) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::url(open_text, url)],
            vec![
                InlineKeyboardButton::callback(
                    format!("👍 {}", reactions.likes),
                    Reaction::Like.callback_data(),
                ),
                InlineKeyboardButton::callback(
                    format!("👎 {}", reactions.dislikes),
                    Reaction::Dislike.callback_data(),
                ),
            ],
        ],
    }
}
