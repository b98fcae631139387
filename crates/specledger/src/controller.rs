//! Version controller: the single orchestration point between callers,
//! the diff engine, the codec, and the persistence worker.
//!
//! The controller never touches storage directly; every effect is a
//! protocol request, awaited one at a time so chain appends land in order.
//! It returns fresh snapshots instead of mutating caller-owned lists.

use chrono::Utc;
use semver::Version;
use serde_json::Value;

use crate::chain;
use crate::codec;
use crate::error::EngineError;
use crate::model::{Anchor, NewVersionRecord, VersionRecord};
use crate::protocol::{StoreData, StoreRequest};
use crate::worker::StoreClient;

pub struct VersionController {
    client: StoreClient,
}

impl VersionController {
    /// Wrap an open client. The client is injected, not reached for
    /// ambiently, so tests and embedders choose the store themselves.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Persist the current document content as a new version of `path`.
    ///
    /// The first record of a path is always a full snapshot. Later saves
    /// diff against the reconstructed latest state, abort on an empty diff,
    /// and let the store's policy decide between delta and rebaseline.
    /// Returns the stored record.
    pub async fn save_version(
        &self,
        path: &str,
        name: &str,
        version: &str,
        content: &Value,
    ) -> Result<VersionRecord, EngineError> {
        let label = Version::parse(version)
            .map_err(|_| EngineError::InvalidVersion(version.to_string()))?;

        let records = self.fetch_versions(path).await?;
        if let Some(current) = max_version(&records) {
            if label <= current {
                return Err(EngineError::VersionOrder {
                    given: version.to_string(),
                    current: current.to_string(),
                });
            }
        }

        let (payload, is_full) = match records.last() {
            None => (codec::encode_full(content)?, true),
            Some(latest) => {
                let previous = chain::reconstruct(&records, latest.id)?;
                let Some(delta) = specledger_diff::diff(&previous, content) else {
                    return Err(EngineError::NoChange);
                };
                if self.next_version_full(path).await? {
                    (codec::encode_full(content)?, true)
                } else {
                    (codec::encode_delta(&delta)?, false)
                }
            }
        };

        let record = NewVersionRecord {
            path: path.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            diff: payload,
            is_full,
            created_at: Utc::now(),
            soft_deleted: false,
        };
        match self
            .client
            .request(StoreRequest::AddVersion { record })
            .await?
        {
            StoreData::Done => {}
            other => return Err(unexpected(other)),
        }

        // The store assigned the id; fetch the row as stored.
        let stored = match self
            .client
            .request(StoreRequest::GetLastVersion {
                path: path.to_string(),
            })
            .await?
        {
            StoreData::Version(Some(record)) => record,
            StoreData::Version(None) => {
                return Err(EngineError::Protocol(
                    "record missing right after insert".into(),
                ))
            }
            other => return Err(unexpected(other)),
        };
        tracing::info!(path, id = stored.id, version, full = is_full, "version saved");
        Ok(stored)
    }

    /// A fresh snapshot of the path's history, ordered by id.
    ///
    /// Soft-deleted records are included and flagged; hiding them from a
    /// listing is presentation, not storage.
    pub async fn versions(&self, path: &str) -> Result<Vec<VersionRecord>, EngineError> {
        self.fetch_versions(path).await
    }

    /// Materialize the content of version `id` of `path`.
    pub async fn content_at(&self, path: &str, id: u64) -> Result<Value, EngineError> {
        let records = self.fetch_versions(path).await?;
        chain::reconstruct(&records, id).inspect_err(|error| {
            tracing::warn!(path, id, %error, "reconstruction failed");
        })
    }

    /// Hide a version from normal listing. The chain is untouched and the
    /// record keeps serving as a diff base.
    pub async fn delete_version(&self, id: u64) -> Result<(), EngineError> {
        self.expect_done(StoreRequest::DeleteVersion { id }).await?;
        tracing::info!(id, "version soft-deleted");
        Ok(())
    }

    /// Undo a soft delete.
    pub async fn restore_version(&self, id: u64) -> Result<(), EngineError> {
        self.expect_done(StoreRequest::RestoreVersion { id }).await?;
        tracing::info!(id, "version restored");
        Ok(())
    }

    /// Remove a version outright.
    ///
    /// Refused while any later record still replays through the candidate;
    /// allowing it would corrupt every dependent reconstruction.
    pub async fn delete_permanently(&self, path: &str, id: u64) -> Result<(), EngineError> {
        let records = self.fetch_versions(path).await?;
        if !records.iter().any(|r| r.id == id) {
            return Err(EngineError::NotFound(id));
        }
        if chain::has_dependents(&records, id) {
            return Err(EngineError::ChainIntegrity(format!(
                "version {id} is the diff base of a later version"
            )));
        }
        self.expect_done(StoreRequest::DeletePermanently { id })
            .await?;
        tracing::info!(path, id, "version permanently deleted");
        Ok(())
    }

    pub async fn add_anchor(&self, anchor: Anchor) -> Result<(), EngineError> {
        self.expect_done(StoreRequest::AddAnchor { anchor }).await
    }

    pub async fn anchors(&self, path: &str) -> Result<Vec<Anchor>, EngineError> {
        match self
            .client
            .request(StoreRequest::GetAnchors {
                path: path.to_string(),
            })
            .await?
        {
            StoreData::Anchors(anchors) => Ok(anchors),
            other => Err(unexpected(other)),
        }
    }

    pub async fn delete_anchor(&self, anchor: Anchor) -> Result<(), EngineError> {
        self.expect_done(StoreRequest::DeleteAnchor { anchor }).await
    }

    /// Shut down the underlying client and its worker.
    pub async fn close(self) {
        self.client.close().await;
    }

    async fn fetch_versions(&self, path: &str) -> Result<Vec<VersionRecord>, EngineError> {
        match self
            .client
            .request(StoreRequest::GetVersions {
                path: path.to_string(),
            })
            .await?
        {
            StoreData::Versions(records) => Ok(records),
            other => Err(unexpected(other)),
        }
    }

    async fn next_version_full(&self, path: &str) -> Result<bool, EngineError> {
        match self
            .client
            .request(StoreRequest::IsNextVersionFull {
                path: path.to_string(),
            })
            .await?
        {
            StoreData::NextFull(full) => Ok(full),
            other => Err(unexpected(other)),
        }
    }

    async fn expect_done(&self, request: StoreRequest) -> Result<(), EngineError> {
        match self.client.request(request).await {
            Ok(StoreData::Done) => Ok(()),
            Ok(other) => Err(unexpected(other)),
            Err(error) => {
                tracing::warn!(%error, "protocol call failed");
                Err(error)
            }
        }
    }
}

/// The path's current maximum version label, ignoring labels that predate
/// the semver policy.
fn max_version(records: &[VersionRecord]) -> Option<Version> {
    records
        .iter()
        .filter_map(|r| Version::parse(&r.version).ok())
        .max()
}

fn unexpected(data: StoreData) -> EngineError {
    EngineError::Protocol(format!("unexpected response data: {data:?}"))
}
