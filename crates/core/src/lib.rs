//! Domain layer for the candidate records service.
//!
//! Holds the record model, the derive/rank rule, the in-memory collection,
//! and the codecs used to move records in and out of spreadsheets.

pub mod candidate;
pub mod collection;
pub mod csv;
pub mod error;
pub mod filter;
pub mod ids;
pub mod ranking;
pub mod sheet;
pub mod table;
pub mod types;
pub mod xlsx;
