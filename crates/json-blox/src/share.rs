//! Content-addressed share links.
//!
//! A share stores the frozen and live documents in their ordered wire form
//! under the SHA-256 of their tagged text, so sharing the same pair twice
//! yields the same id. Records expire lazily: an expired record reads as
//! absent.

use chrono::{DateTime, Duration, Utc};
use json_blox_ordered::{OrderedJson, StorageBlob};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{ShareError, StoreError};
use crate::store::BlobStore;

pub const DEFAULT_TTL_DAYS: i64 = 90;

/// Upper bound for a configured time to live.
pub const MAX_TTL_DAYS: i64 = 36_500;

/// Stored form of a share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    /// Frozen snapshot; primitive `null` when it equals the live document.
    pub json_data: StorageBlob,
    pub non_freeze_json_data: StorageBlob,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl ShareRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at <= now
    }
}

/// Documents recovered from a share id.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedDocuments {
    pub frozen: Value,
    pub live: Value,
    pub created_at: DateTime<Utc>,
}

/// Hex SHA-256 over the two tagged texts, frozen first.
pub fn share_id(frozen: &OrderedJson, live: &OrderedJson) -> String {
    let mut hasher = Sha256::new();
    hasher.update(frozen.tagged_text().as_bytes());
    hasher.update(live.tagged_text().as_bytes());
    hex::encode(hasher.finalize())
}

pub struct ShareCodec<S> {
    store: S,
    ttl: Duration,
}

impl<S: BlobStore> ShareCodec<S> {
    pub fn new(store: S) -> Self {
        ShareCodec {
            store,
            ttl: Duration::days(DEFAULT_TTL_DAYS),
        }
    }

    /// `ttl` is clamped to `0..=MAX_TTL_DAYS` days.
    pub fn with_ttl(store: S, ttl: Duration) -> Self {
        let ttl = ttl.clamp(Duration::zero(), Duration::days(MAX_TTL_DAYS));
        ShareCodec { store, ttl }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn share(
        &self,
        frozen: Option<&Value>,
        live: &Value,
    ) -> Result<String, ShareError> {
        self.share_at(frozen, live, Utc::now()).await
    }

    pub async fn share_at(
        &self,
        frozen: Option<&Value>,
        live: &Value,
        now: DateTime<Utc>,
    ) -> Result<String, ShareError> {
        let live = OrderedJson::encode(live);
        let frozen = frozen
            .map(OrderedJson::encode)
            .filter(|frozen| frozen.canonical_text() != live.canonical_text())
            .unwrap_or(OrderedJson::Primitive(Value::Null));
        let id = share_id(&frozen, &live);
        let expire_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let record = ShareRecord {
            json_data: frozen.to_storage(),
            non_freeze_json_data: live.to_storage(),
            created_at: now,
            expire_at,
        };
        let blob = serde_json::to_value(&record).map_err(StoreError::from)?;
        self.store.put(&id, blob).await?;
        info!(%id, expire_at = %record.expire_at, "share stored");
        Ok(id)
    }

    pub async fn resolve(&self, id: &str) -> Result<SharedDocuments, ShareError> {
        self.resolve_at(id, Utc::now()).await
    }

    /// Looks up `id` as of `now`. An id no store could have issued reads as
    /// absent, like an unknown or expired one.
    pub async fn resolve_at(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<SharedDocuments, ShareError> {
        let not_found = || ShareError::NotFoundOrExpired { id: id.to_string() };
        let blob = match self.store.get(id).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                warn!(%id, "share not found");
                return Err(not_found());
            }
            Err(StoreError::InvalidId(_)) => {
                warn!(%id, "malformed share id");
                return Err(not_found());
            }
            Err(err) => return Err(err.into()),
        };
        let record: ShareRecord = serde_json::from_value(blob).map_err(|err| {
            warn!(%id, error = %err, "share record unreadable");
            ShareError::Corrupt {
                id: id.to_string(),
                reason: err.to_string(),
            }
        })?;
        if record.is_expired(now) {
            warn!(%id, expire_at = %record.expire_at, "share expired");
            return Err(not_found());
        }

        let live = OrderedJson::from_storage(record.non_freeze_json_data).decode();
        let frozen = match OrderedJson::from_storage(record.json_data) {
            frozen if frozen.is_null() => live.clone(),
            frozen => frozen.decode(),
        };
        info!(%id, "share resolved");
        Ok(SharedDocuments {
            frozen,
            live,
            created_at: record.created_at,
        })
    }
}
