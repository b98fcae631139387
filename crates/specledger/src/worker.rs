//! The isolated persistence worker and its client handle.
//!
//! All storage access crosses this boundary: the worker task owns the
//! store, drains its queue strictly FIFO, and finishes each request before
//! dequeuing the next, so the chain invariant is never observable
//! mid-update. The client is an explicitly constructed object handed to
//! whoever needs storage; there is no ambient singleton.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::EngineError;
use crate::protocol::{StoreData, StoreRequest, StoreResponse};
use crate::store::SpecStore;

/// Depth of the request queue; senders briefly back-pressure beyond this.
const REQUEST_QUEUE_DEPTH: usize = 32;

struct Envelope {
    request: StoreRequest,
    reply: oneshot::Sender<StoreResponse>,
}

/// Client handle to a running persistence worker.
pub struct StoreClient {
    tx: mpsc::Sender<Envelope>,
    worker: JoinHandle<()>,
}

impl StoreClient {
    /// Spawn a worker task around a storage backend and open the channel
    /// to it. Must be called within a Tokio runtime.
    pub fn open<S: SpecStore + 'static>(store: S) -> StoreClient {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let worker = tokio::spawn(run_worker(store, rx));
        StoreClient { tx, worker }
    }

    /// Send one request and await its paired response.
    ///
    /// A store-side failure comes back as an `Error` envelope and is
    /// surfaced as [`EngineError::Protocol`]; so is a worker that has gone
    /// away. Neither case panics and neither leaves the caller waiting
    /// forever.
    pub async fn request(&self, request: StoreRequest) -> Result<StoreData, EngineError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply })
            .await
            .map_err(|_| EngineError::Protocol("persistence worker is not running".into()))?;
        match response.await {
            Ok(StoreResponse::Success { data }) => Ok(data),
            Ok(StoreResponse::Error { message }) => Err(EngineError::Protocol(message)),
            Err(_) => Err(EngineError::Protocol(
                "persistence worker dropped the request".into(),
            )),
        }
    }

    /// Close the queue and wait for the worker to drain and exit.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(error) = self.worker.await {
            tracing::warn!(%error, "persistence worker ended abnormally");
        }
    }
}

async fn run_worker<S: SpecStore>(mut store: S, mut rx: mpsc::Receiver<Envelope>) {
    tracing::info!("persistence worker started");
    while let Some(Envelope { request, reply }) = rx.recv().await {
        let response = dispatch(&mut store, request);
        // The requester may have given up; that is its business.
        let _ = reply.send(response);
    }
    tracing::info!("persistence worker stopped");
}

fn dispatch<S: SpecStore>(store: &mut S, request: StoreRequest) -> StoreResponse {
    match request {
        StoreRequest::GetVersions { path } => {
            StoreResponse::success(StoreData::Versions(store.versions(&path)))
        }
        StoreRequest::GetLastVersion { path } => {
            StoreResponse::success(StoreData::Version(store.last_version(&path)))
        }
        StoreRequest::AddVersion { record } => {
            let stored = store.add_version(record);
            tracing::debug!(path = %stored.path, id = stored.id, full = stored.is_full, "version record stored");
            StoreResponse::success(StoreData::Done)
        }
        StoreRequest::DeleteVersion { id } => match store.soft_delete(id) {
            Ok(()) => StoreResponse::success(StoreData::Done),
            Err(e) => StoreResponse::error(e.to_string()),
        },
        StoreRequest::RestoreVersion { id } => match store.restore(id) {
            Ok(()) => StoreResponse::success(StoreData::Done),
            Err(e) => StoreResponse::error(e.to_string()),
        },
        StoreRequest::DeletePermanently { id } => match store.delete_permanently(id) {
            Ok(()) => StoreResponse::success(StoreData::Done),
            Err(e) => StoreResponse::error(e.to_string()),
        },
        StoreRequest::IsNextVersionFull { path } => {
            StoreResponse::success(StoreData::NextFull(store.is_next_version_full(&path)))
        }
        StoreRequest::AddAnchor { anchor } => {
            store.add_anchor(anchor);
            StoreResponse::success(StoreData::Done)
        }
        StoreRequest::GetAnchors { path } => {
            StoreResponse::success(StoreData::Anchors(store.anchors(&path)))
        }
        StoreRequest::DeleteAnchor { anchor } => match store.delete_anchor(&anchor) {
            Ok(()) => StoreResponse::success(StoreData::Done),
            Err(e) => StoreResponse::error(e.to_string()),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewVersionRecord;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn record(path: &str, version: &str) -> NewVersionRecord {
        NewVersionRecord {
            path: path.into(),
            name: version.into(),
            version: version.into(),
            diff: vec![],
            is_full: true,
            created_at: Utc::now(),
            soft_deleted: false,
        }
    }

    #[tokio::test]
    async fn request_response_pairing() {
        let client = StoreClient::open(MemoryStore::default());

        let data = client
            .request(StoreRequest::AddVersion {
                record: record("spec.yaml", "1.0.0"),
            })
            .await
            .unwrap();
        assert!(matches!(data, StoreData::Done));

        let data = client
            .request(StoreRequest::GetLastVersion {
                path: "spec.yaml".into(),
            })
            .await
            .unwrap();
        let StoreData::Version(Some(stored)) = data else {
            panic!("expected the stored record, got {data:?}");
        };
        assert_eq!(stored.version, "1.0.0");
        assert_eq!(stored.id, 1);

        client.close().await;
    }

    #[tokio::test]
    async fn store_failures_become_error_envelopes_not_panics() {
        let client = StoreClient::open(MemoryStore::default());
        let err = client
            .request(StoreRequest::DeleteVersion { id: 404 })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Protocol(_)));
        // The worker survives a failed request.
        let data = client
            .request(StoreRequest::GetVersions {
                path: "spec.yaml".into(),
            })
            .await
            .unwrap();
        assert!(matches!(data, StoreData::Versions(v) if v.is_empty()));
        client.close().await;
    }

    #[tokio::test]
    async fn requests_complete_in_send_order() {
        let client = StoreClient::open(MemoryStore::default());
        for i in 0..5 {
            client
                .request(StoreRequest::AddVersion {
                    record: record("spec.yaml", &format!("1.{i}.0")),
                })
                .await
                .unwrap();
        }
        let StoreData::Versions(history) = client
            .request(StoreRequest::GetVersions {
                path: "spec.yaml".into(),
            })
            .await
            .unwrap()
        else {
            panic!("expected versions");
        };
        let ids: Vec<u64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        client.close().await;
    }
}
