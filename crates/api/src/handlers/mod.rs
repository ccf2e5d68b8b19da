//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Record handlers delegate to the shared [`CandidateService`] and map
//! errors via [`AppError`].
//!
//! [`CandidateService`]: candidates_store::CandidateService
//! [`AppError`]: crate::error::AppError

pub mod auth;
pub mod candidates;
pub mod document;
pub mod sheet;
