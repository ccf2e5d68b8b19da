/// Candidate identifiers are opaque strings assigned at creation time.
pub type CandidateId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
