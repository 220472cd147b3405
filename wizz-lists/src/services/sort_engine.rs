//! Attribute sort engine
//!
//! Final ordering of whichever item set reached the end of the resolver
//! chain:
//! - `alphabetical`: ascending by name, ignoring case and accents
//! - `random`: seeded Fisher-Yates shuffle (same seed, same permutation)
//! - `chronological`: passthrough, items keep resolver order. There is no
//!   date comparator; resolvers are expected to deliver chronological order
//!   themselves.
//! - custom attribute: descending by the first number found in `attr`,
//!   items without a number last
//!
//! All orderings are stable.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{ListItem, SortKey};

/// Note appended when attributes are removed for a basic sort
pub const BASIC_SORT_NOTE: &str = "Attribute omitted for basic sort.";

/// First numeric token: thousands-grouped or plain, optional sign and decimals
static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-?\d{1,3}(?:,\d{3})+(?:\.\d+)?|-?\d+(?:\.\d+)?").expect("valid number pattern")
});

// ============================================================================
// Seeded pseudo-random generator
// ============================================================================

/// Small deterministic PRNG (mulberry32) seeded from a seed string
///
/// The string is reduced to 32 bits with xmur3-style multiplicative mixing.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn from_seed_str(seed: &str) -> Self {
        Self {
            state: mix_seed(seed),
        }
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }

    /// Uniform integer in `0..=max`
    pub fn next_in_range(&mut self, max: u32) -> u32 {
        (self.next_f64() * (f64::from(max) + 1.0)).floor() as u32
    }
}

/// Reduce a seed string to 32 bits (xmur3)
fn mix_seed(seed: &str) -> u32 {
    let units: Vec<u16> = seed.encode_utf16().collect();
    let mut h: u32 = 1_779_033_703 ^ units.len() as u32;
    for unit in units {
        h = (h ^ u32::from(unit)).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

/// Fisher-Yates shuffle driven by [`SeededRng`]
pub fn seeded_shuffle<T>(items: &mut [T], seed: &str) {
    let mut rng = SeededRng::from_seed_str(seed);
    for i in (1..items.len()).rev() {
        let j = (rng.next_f64() * (i as f64 + 1.0)).floor() as usize;
        items.swap(i, j.min(i));
    }
}

// ============================================================================
// Ordering
// ============================================================================

/// First numeric token in an attribute string (e.g., "8,848 m" -> 8848.0)
pub fn extract_number(attr: &str) -> Option<f64> {
    NUMBER_TOKEN
        .find(attr)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Accent- and case-folded form of a name used for alphabetical ordering
///
/// Decomposes to NFD and drops combining marks, so "Ängelholm" collates as
/// "angelholm". Letters with no decomposition get a fixed spelling.
pub fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ß' | 'ẞ' => key.push_str("ss"),
            'æ' | 'Æ' => key.push_str("ae"),
            'œ' | 'Œ' => key.push_str("oe"),
            'ø' | 'Ø' => key.push('o'),
            'ł' | 'Ł' => key.push('l'),
            'đ' | 'Đ' => key.push('d'),
            'þ' | 'Þ' => key.push_str("th"),
            _ => key.extend(c.to_lowercase()),
        }
    }
    key
}

/// Compare by collation key; identical keys fall back to the raw strings
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Descending by value; `None` sorts after every number
pub fn compare_values_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order any records by `key`, given accessors for the name and the
/// numeric sort value
pub fn order_by<T, N, V>(items: &mut [T], key: &SortKey, seed: &str, name: N, value: V)
where
    N: Fn(&T) -> &str,
    V: Fn(&T) -> Option<f64>,
{
    match key {
        SortKey::Alphabetical => {
            items.sort_by_cached_key(|item| (collation_key(name(item)), name(item).to_string()))
        }
        SortKey::Random => seeded_shuffle(items, seed),
        SortKey::Chronological => {}
        SortKey::Custom(_) => items.sort_by(|a, b| compare_values_desc(value(a), value(b))),
    }
}

/// Apply the final ordering for `key`
///
/// For basic keys every attribute triple is removed; if any item carried
/// one, [`BASIC_SORT_NOTE`] is appended to `notes`.
pub fn apply_sort(items: &mut [ListItem], key: &SortKey, seed: &str, notes: &mut Vec<String>) {
    order_by(
        items,
        key,
        seed,
        |item| item.name.as_str(),
        |item| item.attr.as_deref().and_then(extract_number),
    );

    if key.is_basic() {
        let mut stripped = false;
        for item in items.iter_mut() {
            stripped |= item.clear_attribute();
        }
        if stripped {
            notes.push(BASIC_SORT_NOTE.to_string());
        }
    }
}
