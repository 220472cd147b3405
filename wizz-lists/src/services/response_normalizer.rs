//! Response normalizer
//!
//! Sole builder of [`ListMeta`]. Whatever resolver produced the items, the
//! payload leaving here has the same shape.

use crate::models::{ListItem, ListMeta, ListResult, SortKey, PROTOCOL_VERSION};

/// Build the final payload
///
/// Truncates to `n` items, repairs partial attribute triples, removes
/// attributes entirely for basic keys, and collapses duplicate source names
/// keeping first occurrence.
pub fn normalize_response(
    subject: &str,
    sort_key: &SortKey,
    n: usize,
    mut items: Vec<ListItem>,
    sources: Vec<String>,
    notes: Vec<String>,
) -> ListResult {
    items.truncate(n);
    for item in items.iter_mut() {
        if sort_key.is_basic() {
            item.clear_attribute();
        } else {
            item.complete_attribute();
        }
    }

    let mut unique_sources: Vec<String> = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique_sources.contains(&source) {
            unique_sources.push(source);
        }
    }

    ListResult {
        meta: ListMeta {
            subject: subject.to_string(),
            sort_requested: sort_key.to_string(),
            sort_used: sort_key.to_string(),
            length: items.len(),
            sources: unique_sources,
            notes,
            version: PROTOCOL_VERSION.to_string(),
        },
        items,
    }
}
