//! Canonical sort key

use serde::{Serialize, Serializer};
use std::fmt;

/// Canonical sort key produced by the sort key normalizer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortKey {
    Random,
    Alphabetical,
    /// Passthrough: items keep resolver order
    Chronological,
    /// Attribute name, lowercased and trimmed, never empty
    Custom(String),
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Random => "random",
            SortKey::Alphabetical => "alphabetical",
            SortKey::Chronological => "chronological",
            SortKey::Custom(key) => key,
        }
    }

    /// Basic keys produce names-only output
    pub fn is_basic(&self) -> bool {
        !matches!(self, SortKey::Custom(_))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
