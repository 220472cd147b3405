//! Fallback fabricator
//!
//! Last stage of the resolver chain. Cannot fail: always yields exactly `n`
//! placeholder items named "{subject} {i}".

use crate::models::{ListItem, SortKey, Tier};

/// Confidence attached to fabricated placeholder attributes
const FALLBACK_CONFIDENCE: f64 = 0.2;

/// Placeholder list plus the diagnostic note explaining why it was used
#[derive(Debug, Clone, PartialEq)]
pub struct FabricatedList {
    pub items: Vec<ListItem>,
    pub note: String,
}

/// Fabricate `n` placeholder items
///
/// `unavailable` names the upstream stage that could not produce a list
/// (e.g., "generative model not configured").
pub fn fabricate(subject: &str, sort_key: &SortKey, n: usize, unavailable: &str) -> FabricatedList {
    let items = (0..n)
        .map(|i| {
            let item = ListItem::named(format!("{} {}", subject, i + 1));
            if sort_key.is_basic() {
                item
            } else {
                item.with_attribute(
                    format!("{} (fallback)", sort_key),
                    Tier::Fabricated,
                    FALLBACK_CONFIDENCE,
                )
            }
        })
        .collect();

    FabricatedList {
        items,
        note: format!("Fallback list used: {}.", unavailable),
    }
}
