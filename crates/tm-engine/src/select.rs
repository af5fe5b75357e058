//! Weighted random selection.
//!
//! Selection draws a uniform value over the total weight and walks the
//! cumulative intervals. Zero-weight candidates stay in the input but own
//! an empty interval, so they are never picked.

use rand::Rng;
use rand::rngs::StdRng;

use tm_core::TableEntry;

/// Pick one value from parallel slices of values and weights.
///
/// Missing weights count as 1, so a plain value list selects uniformly.
/// Returns `None` only when the values are empty or the total weight is 0.
pub fn pick_weighted<'a, T>(rng: &mut StdRng, values: &'a [T], weights: &[u32]) -> Option<&'a T> {
    if values.is_empty() {
        return None;
    }
    let weight_of = |i: usize| weights.get(i).copied().unwrap_or(1);
    let total: u64 = (0..values.len()).map(|i| u64::from(weight_of(i))).sum();
    if total == 0 {
        return None;
    }
    let draw = rng.random_range(1..=total);
    let mut cumulative = 0u64;
    for (i, value) in values.iter().enumerate() {
        cumulative += u64::from(weight_of(i));
        if draw <= cumulative {
            return Some(value);
        }
    }
    None
}

/// Pick one entry from a subtable's entry list by weight.
pub fn pick_entry<'a>(rng: &mut StdRng, entries: &'a [TableEntry]) -> Option<&'a TableEntry> {
    let weights: Vec<u32> = entries.iter().map(|e| e.weight).collect();
    pick_weighted(rng, entries, &weights)
}
