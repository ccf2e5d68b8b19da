//! The observable owner of the candidate collection.
//!
//! [`CandidateService`] serialises every mutation through one async mutex,
//! writes the full collection to the wired backend after each change, and
//! publishes a [`CollectionEvent`] to subscribers.
//!
//! The write runs on its own task holding the lock, so a caller that stops
//! waiting (client disconnect, request timeout) cannot cut a save short.

use std::sync::Arc;

use candidates_core::candidate::{Candidate, CandidateInput};
use candidates_core::collection::CandidateCollection;
use candidates_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::backend::CandidateBackend;
use crate::error::StoreError;

/// Capacity of the change-notification channel. Slow subscribers skip
/// events rather than blocking mutations.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// What kind of change produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Loaded,
    Added,
    Updated,
    Removed,
    Cleared,
    Imported,
    Replaced,
}

/// Notification sent after the collection changed.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionEvent {
    pub kind: EventKind,
    /// Collection size after the change.
    pub count: usize,
    /// Whether the backend accepted the write.
    pub persisted: bool,
    pub timestamp: Timestamp,
}

pub struct CandidateService {
    backend: Arc<dyn CandidateBackend>,
    collection: Arc<Mutex<CandidateCollection>>,
    events: broadcast::Sender<CollectionEvent>,
}

impl CandidateService {
    /// Wire a backend and load its records.
    ///
    /// A failed load is logged and the service starts empty.
    pub async fn open(backend: impl CandidateBackend + 'static) -> Self {
        let service = Self::empty(Arc::new(backend));
        match service.backend.load().await {
            Ok(records) => {
                let collection = CandidateCollection::from_records(records);
                tracing::info!(
                    backend = service.backend.name(),
                    count = collection.len(),
                    "Candidates loaded",
                );
                *service.collection.lock().await = collection;
            }
            Err(e) => {
                tracing::error!(
                    backend = service.backend.name(),
                    error = %e,
                    "Failed to load candidates, starting empty",
                );
            }
        }
        service
    }

    fn empty(backend: Arc<dyn CandidateBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            collection: Arc::new(Mutex::new(CandidateCollection::new())),
            events,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Receive a [`CollectionEvent`] after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Records in rank order, optionally narrowed by a free-text query.
    pub async fn list(&self, query: Option<&str>) -> Vec<Candidate> {
        let collection = self.collection.lock().await;
        match query {
            Some(q) => collection.filter(q),
            None => collection.records().to_vec(),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Candidate> {
        self.collection.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.collection.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.collection.lock().await.is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub async fn add(&self, input: &CandidateInput) -> Candidate {
        let created = self
            .mutate(EventKind::Added, |c| Some(c.add(input)))
            .await;
        created.unwrap_or_default()
    }

    /// Returns `None` without writing when no record has `id`.
    pub async fn update(&self, id: &str, input: &CandidateInput) -> Option<Candidate> {
        self.mutate(EventKind::Updated, |c| c.update(id, input)).await
    }

    /// Returns `None` without writing when no record has `id`.
    pub async fn remove(&self, id: &str) -> Option<Candidate> {
        self.mutate(EventKind::Removed, |c| c.remove(id)).await
    }

    pub async fn remove_all(&self) -> usize {
        self.mutate(EventKind::Cleared, |c| Some(c.remove_all()))
            .await
            .unwrap_or_default()
    }

    pub async fn import_many(&self, rows: &[CandidateInput]) -> usize {
        self.mutate(EventKind::Imported, |c| Some(c.import_many(rows)))
            .await
            .unwrap_or_default()
    }

    /// Replace the whole collection, returning its new size.
    pub async fn replace_all(&self, records: Vec<Candidate>) -> usize {
        self.mutate(EventKind::Replaced, |c| {
            c.replace_all(records);
            Some(c.len())
        })
        .await
        .unwrap_or_default()
    }

    /// Re-read the backend, replacing the in-memory collection.
    ///
    /// On failure the current collection is kept and the error returned.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let mut collection = self.collection.lock().await;
        let records = self.backend.load().await?;
        *collection = CandidateCollection::from_records(records);
        let count = collection.len();
        publish(&self.events, EventKind::Loaded, count, true);
        Ok(count)
    }

    /// Apply `change` under the lock, then write and notify if it took effect.
    async fn mutate<R>(
        &self,
        kind: EventKind,
        change: impl FnOnce(&mut CandidateCollection) -> Option<R>,
    ) -> Option<R> {
        let mut collection = self.collection.clone().lock_owned().await;
        let result = change(&mut collection)?;

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let write = tokio::spawn(async move {
            let persisted = persist(backend.as_ref(), collection.records()).await;
            publish(&events, kind, collection.len(), persisted);
        });
        if let Err(e) = write.await {
            tracing::error!(error = %e, "Persist task failed");
        }
        Some(result)
    }
}

/// Write the full collection. Failures are logged and swallowed: the
/// in-memory collection stays authoritative.
async fn persist(backend: &dyn CandidateBackend, records: &[Candidate]) -> bool {
    match backend.save(records).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                backend = backend.name(),
                count = records.len(),
                error = %e,
                "Failed to persist candidates",
            );
            false
        }
    }
}

fn publish(
    events: &broadcast::Sender<CollectionEvent>,
    kind: EventKind,
    count: usize,
    persisted: bool,
) {
    // No subscribers is not an error.
    let _ = events.send(CollectionEvent {
        kind,
        count,
        persisted,
        timestamp: chrono::Utc::now(),
    });
}
