use std::sync::Arc;

use candidates_store::backend::BackendKind;
use candidates_store::file::FileBackend;
use candidates_store::memory::MemoryBackend;
use candidates_store::sheets::SheetsBackend;
use candidates_store::{Backend, CandidateService, StoreError};

use crate::config::{ServerConfig, StorageConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (gate credential, JWT settings).
    pub config: Arc<ServerConfig>,
    /// Owner of the authoritative candidate collection.
    pub candidates: Arc<CandidateService>,
    /// Sheet client used by `/sheet/append`, if a sheet is configured.
    pub sheet: Option<Arc<SheetsBackend>>,
}

impl AppState {
    /// Open the configured backend and assemble the state.
    pub async fn open(config: ServerConfig) -> Result<Self, StoreError> {
        let backend = build_backend(&config.storage)?;
        tracing::info!(backend = backend.kind().name(), "Storage backend selected");

        let sheet = match &config.storage.sheets {
            Some(sheets) => Some(Arc::new(SheetsBackend::new(sheets.clone())?)),
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            candidates: Arc::new(CandidateService::open(backend).await),
            sheet,
        })
    }
}

/// Build the one backend variant named by the storage configuration.
pub fn build_backend(storage: &StorageConfig) -> Result<Backend, StoreError> {
    Ok(match storage.kind {
        BackendKind::File => Backend::File(FileBackend::new(&storage.data_file)),
        BackendKind::Memory => Backend::Memory(MemoryBackend::new()),
        BackendKind::Sheets => {
            let sheets = storage.sheets.clone().ok_or(StoreError::NotConfigured)?;
            Backend::Sheets(SheetsBackend::new(sheets)?)
        }
    })
}
