//! Persistence for candidate records.
//!
//! - [`backend`] -- the [`CandidateBackend`] contract and the [`Backend`]
//!   variant chosen at startup.
//! - [`file`], [`memory`], [`sheets`] -- the three backend implementations.
//! - [`service`] -- [`CandidateService`], the observable owner of the
//!   authoritative collection.

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod service;
pub mod sheets;

pub use backend::{Backend, CandidateBackend};
pub use error::StoreError;
pub use service::{CandidateService, CollectionEvent, EventKind};
