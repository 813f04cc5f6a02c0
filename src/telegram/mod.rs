//! Telegram Bot API module.

pub mod client;
pub mod keyboard;
pub mod types;

pub use client::{ChatClient, TelegramClient};
pub use keyboard::entry_keyboard;
pub use types::*;
