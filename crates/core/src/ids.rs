//! Identifier generation for new and imported records.

use rand::Rng;

use crate::types::CandidateId;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random base-36 suffix appended to the timestamp.
pub const SUFFIX_LEN: usize = 9;

/// Generate an id from the current millisecond timestamp plus a random
/// base-36 suffix, so records created within the same millisecond (bulk
/// import) still receive distinct ids.
pub fn generate_id() -> CandidateId {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{millis}{suffix}")
}
