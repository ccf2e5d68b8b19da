//! Change log for the candidate collection.

use candidates_store::CollectionEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Log every [`CollectionEvent`] until the service is dropped.
///
/// Intended to be spawned as a background task:
///
/// ```ignore
/// tokio::spawn(log_changes(state.candidates.subscribe()));
/// ```
pub async fn log_changes(mut receiver: broadcast::Receiver<CollectionEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) if event.persisted => {
                tracing::info!(kind = ?event.kind, count = event.count, at = %event.timestamp, "Collection changed");
            }
            Ok(event) => {
                tracing::warn!(
                    kind = ?event.kind,
                    count = event.count,
                    at = %event.timestamp,
                    "Collection changed but was not persisted",
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Change log lagged, events skipped");
            }
            Err(RecvError::Closed) => {
                tracing::debug!("Change log stopped");
                break;
            }
        }
    }
}
