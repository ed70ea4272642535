//! Key-based deduplicating merge
//!
//! The deterministic merge primitive used to fold locally-extracted credits
//! and projects into the model-produced profile. It is intentionally a
//! "weak" merge: the first item seen for a key wins entirely, later
//! duplicates are dropped without any field-level enrichment. Field-level
//! enrichment is a behavior we ask of the model during the refine pass, not
//! of this layer.

use std::collections::HashSet;

/// Append `new_items` to `existing`, skipping items whose key was already
/// seen (in `existing` or earlier in `new_items`).
///
/// Items with a missing or empty key are always appended: an item that
/// cannot be identified is treated as unique. Insertion order is preserved.
///
/// Keys are compared exactly. The refine prompt asks the model to merge
/// case-insensitively, so "Movie A" from the model and "movie a" from a
/// scrape both survive this layer; that asymmetry is deliberate and pinned
/// by a test below.
pub fn merge_unique_by_key<T, K>(existing: &mut Vec<T>, new_items: Vec<T>, key: K)
where
    K: Fn(&T) -> Option<&str>,
{
    let mut seen: HashSet<String> = existing
        .iter()
        .filter_map(|item| key(item))
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect();

    for item in new_items {
        match key(&item).filter(|k| !k.is_empty()) {
            Some(k) if seen.contains(k) => {}
            Some(k) => {
                seen.insert(k.to_owned());
                existing.push(item);
            }
            None => existing.push(item),
        }
    }
}
