//! RSS bot library.
//!
//! Reads a feed on a daily schedule, posts new entries to a Telegram chat and
//! counts reader reactions in Redis.

pub mod api;
pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod storage;
pub mod telegram;
pub mod utils;
