//! Deterministic request seed
//!
//! 32-bit FNV-1a over `subject|sortKey|length|version`, rendered as a
//! decimal string. The hash runs over UTF-16 code units so that seeds match
//! those computed by browser clients for the same request.

use crate::models::SortKey;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Seed for one request
pub fn compute_seed(subject: &str, sort_key: &SortKey, length: usize, version: &str) -> String {
    let canonical = format!("{}|{}|{}|{}", subject, sort_key, length, version);
    fnv1a_32(&canonical).to_string()
}

fn fnv1a_32(input: &str) -> u32 {
    input.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}
