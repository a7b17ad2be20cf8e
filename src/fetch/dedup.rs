//! First-occurrence deduplication of fetched records.

use std::collections::HashSet;

use crate::models::Identified;

/// Keep the first record seen for each identifier, in original order.
pub fn dedup_by_id<T: Identified>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(records.len());
    records.into_iter().filter(|r| seen.insert(r.id())).collect()
}
