//! Sort key normalization
//!
//! Maps any raw criterion onto a canonical [`SortKey`]. Basic keys are
//! recognized through a priority-ordered synonym table; anything else is a
//! custom attribute name.

use crate::models::SortKey;

/// Basic key synonyms, checked in order; the first rule with a match wins
///
/// Each canonical name is listed as its own synonym so normalization is
/// idempotent.
const BASIC_KEY_RULES: &[(&[&str], BasicKey)] = &[
    (
        &["random", "randomize", "randomise", "randomly", "shuffle", "shuffled", "mix", "mixed"],
        BasicKey::Random,
    ),
    (
        &["alphabetical", "alphabetic", "alphabetically", "a-z", "az", "abc", "name", "names"],
        BasicKey::Alphabetical,
    ),
    (
        &["chronological", "chronologically", "date", "dates", "time", "year", "years"],
        BasicKey::Chronological,
    ),
];

#[derive(Debug, Clone, Copy)]
enum BasicKey {
    Random,
    Alphabetical,
    Chronological,
}

impl From<BasicKey> for SortKey {
    fn from(key: BasicKey) -> Self {
        match key {
            BasicKey::Random => SortKey::Random,
            BasicKey::Alphabetical => SortKey::Alphabetical,
            BasicKey::Chronological => SortKey::Chronological,
        }
    }
}

/// Normalize a raw criterion
///
/// Total and idempotent. Empty or blank input means alphabetical. A rule
/// matches when the lowercased, trimmed criterion equals one of its
/// synonyms or contains one as a whitespace-separated word.
pub fn normalize_sort_key(raw: &str) -> SortKey {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return SortKey::Alphabetical;
    }

    for (synonyms, key) in BASIC_KEY_RULES {
        let matched = synonyms.iter().any(|synonym| {
            lowered == *synonym || lowered.split_whitespace().any(|word| word == *synonym)
        });
        if matched {
            return (*key).into();
        }
    }

    SortKey::Custom(lowered)
}
