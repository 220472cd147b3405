//! Data models for wizz-lists
//!
//! All models are created fresh per request and dropped once the response
//! is sent.

pub mod list_item;
pub mod list_result;
pub mod sort_key;
pub mod sort_request;
pub mod suggestion;

pub use list_item::{ListItem, Tier};
pub use list_result::{ListMeta, ListResult, PROTOCOL_VERSION};
pub use sort_key::SortKey;
pub use sort_request::{clamp_length, SortRequest, DEFAULT_LENGTH, MAX_LENGTH};
pub use suggestion::{ExpectedType, SortSuggestion};
