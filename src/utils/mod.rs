//! 유틸리티 모듈.

pub mod hash;
pub mod html;

pub use hash::hash_url;
pub use html::{escape_attr, escape_html};
