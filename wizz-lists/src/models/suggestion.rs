//! Sort suggestion returned by `/api/suggest-sort`

use serde::Serialize;

/// Value type a suggested sort key is expected to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSuggestion {
    /// Human label shown on the chip
    pub label: &'static str,
    /// Sort key sent back as the criterion
    pub key: &'static str,
    pub expected_type: ExpectedType,
    pub rationale: &'static str,
}
