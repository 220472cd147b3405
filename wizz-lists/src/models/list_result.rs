//! Final list payload

use serde::{Deserialize, Serialize};

use super::ListItem;

/// Fixed protocol tag carried in every response
pub const PROTOCOL_VERSION: &str = "v1";

/// Response metadata
///
/// Only the response normalizer builds this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMeta {
    pub subject: String,
    pub sort_requested: String,
    pub sort_used: String,
    /// Number of items actually returned
    pub length: usize,
    /// Contributing resolvers in first-use order ("structured", "generative")
    pub sources: Vec<String>,
    /// Diagnostics accumulated along the pipeline
    pub notes: Vec<String>,
    pub version: String,
}

/// Ranked list with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub items: Vec<ListItem>,
    pub meta: ListMeta,
}
