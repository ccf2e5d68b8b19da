//! Flat-file backend: the whole collection as one JSON document.

use std::path::PathBuf;

use async_trait::async_trait;
use candidates_core::candidate::Candidate;

use crate::backend::CandidateBackend;
use crate::error::StoreError;

/// Reads and overwrites a JSON array of candidates on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling path the document is staged at before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CandidateBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    /// A missing or blank document reads as an empty collection, as does an
    /// unparseable one (logged). Any other I/O failure is a read fault.
    async fn load(&self) -> Result<Vec<Candidate>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Data file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Candidate>>(&text) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Data file is not a JSON array of candidates, starting empty",
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[Candidate]) -> Result<(), StoreError> {
        let document = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, document)
            .await
            .map_err(|source| StoreError::Write {
                path: staging.clone(),
                source,
            })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "Data file written");
        Ok(())
    }
}
