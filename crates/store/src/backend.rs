//! The persistence contract and the backend variant selected at startup.

use async_trait::async_trait;
use candidates_core::candidate::Candidate;

use crate::error::StoreError;
use crate::file::FileBackend;
use crate::memory::MemoryBackend;
use crate::sheets::SheetsBackend;

/// Whole-collection persistence: read everything, write everything.
#[async_trait]
pub trait CandidateBackend: Send + Sync {
    /// Short backend name used in logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Read every stored record.
    async fn load(&self) -> Result<Vec<Candidate>, StoreError>;

    /// Replace the stored collection with `records`.
    async fn save(&self, records: &[Candidate]) -> Result<(), StoreError>;
}

/// Backend kind named by the `STORAGE_BACKEND` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Sheets,
    Memory,
}

impl BackendKind {
    /// Parse from the configuration value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "sheets" => Some(Self::Sheets),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Configuration value.
    pub fn name(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Sheets => "sheets",
            Self::Memory => "memory",
        }
    }
}

/// The one backend wired into the service. Variants are never combined.
pub enum Backend {
    File(FileBackend),
    Sheets(SheetsBackend),
    Memory(MemoryBackend),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::File(_) => BackendKind::File,
            Self::Sheets(_) => BackendKind::Sheets,
            Self::Memory(_) => BackendKind::Memory,
        }
    }
}

#[async_trait]
impl CandidateBackend for Backend {
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    async fn load(&self) -> Result<Vec<Candidate>, StoreError> {
        match self {
            Self::File(b) => b.load().await,
            Self::Sheets(b) => b.load().await,
            Self::Memory(b) => b.load().await,
        }
    }

    async fn save(&self, records: &[Candidate]) -> Result<(), StoreError> {
        match self {
            Self::File(b) => b.save(records).await,
            Self::Sheets(b) => b.save(records).await,
            Self::Memory(b) => b.save(records).await,
        }
    }
}
