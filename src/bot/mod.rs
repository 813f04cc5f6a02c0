//! Bot module.
//!
//! Posting feed entries, handling reactions, and the loops that drive both.

pub mod poller;
pub mod scheduler;
pub mod service;

pub use poller::{next_offset, run_polling, PollSettings};
pub use scheduler::{run_schedule, run_update, Schedule};
pub use service::{format_entry_message, BotSettings, RssBot, UpdateOutcome};
