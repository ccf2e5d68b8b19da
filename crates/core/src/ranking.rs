//! The derive/rank rule applied after every collection mutation.

use crate::candidate::Candidate;

/// Re-derive every total, sort descending by total, and assign 1-based ranks.
///
/// The sort is stable: records with equal totals keep their relative
/// input order.
pub fn rerank(records: &mut [Candidate]) {
    for record in records.iter_mut() {
        record.derive_total();
    }
    records.sort_by(|a, b| b.total_payments.total_cmp(&a.total_payments));
    for (index, record) in records.iter_mut().enumerate() {
        record.order = index as u32 + 1;
    }
}

/// Check that `records` is in the state [`rerank`] leaves it in.
pub fn is_ranked(records: &[Candidate]) -> bool {
    records.iter().enumerate().all(|(i, r)| {
        r.order == i as u32 + 1
            && r.total_payments == r.first_payment + r.second_payment + r.third_payment
    }) && records
        .windows(2)
        .all(|w| w[0].total_payments >= w[1].total_payments)
}
