//! Process-local backend with no external I/O.

use async_trait::async_trait;
use candidates_core::candidate::Candidate;
use tokio::sync::RwLock;

use crate::backend::CandidateBackend;
use crate::error::StoreError;

/// Holds the last saved collection for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<Vec<Candidate>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `records` already stored.
    pub fn with_records(records: Vec<Candidate>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl CandidateBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[Candidate]) -> Result<(), StoreError> {
        *self.records.write().await = records.to_vec();
        Ok(())
    }
}
