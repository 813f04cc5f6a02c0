//! Model module.
//!
//! Contains feed entries, posted entries and reaction types.

pub mod entry;

pub use entry::*;
