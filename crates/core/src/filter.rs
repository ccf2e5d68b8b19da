//! Free-text filtering over every field of a record.

use crate::candidate::{Candidate, Field};

/// Whether any field's display text contains `query`, ignoring case.
///
/// A blank query matches every record.
pub fn matches(candidate: &Candidate, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    Field::ALL
        .into_iter()
        .any(|field| candidate.text(field).to_lowercase().contains(&needle))
}

/// Records matching `query`, in collection order.
pub fn filter_candidates<'a>(records: &'a [Candidate], query: &str) -> Vec<&'a Candidate> {
    records.iter().filter(|c| matches(c, query)).collect()
}
