//! Request extractors guarding the record endpoints.
//!
//! - [`auth::AuthUser`] -- Extracts the signed-in operator from a Bearer token.

pub mod auth;
