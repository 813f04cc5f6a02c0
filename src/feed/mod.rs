//! Feed module.
//!
//! Fetching and parsing RSS/Atom feeds, plus entry blacklists.

pub mod filter;
pub mod parser;
pub mod source;

pub use filter::Blacklist;
pub use parser::parse_feed;
pub use source::{FeedSource, HttpFeedSource};
