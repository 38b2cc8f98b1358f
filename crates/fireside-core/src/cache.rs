// ── Local offline cache ──
//
// Versioned snapshots of whole collections with sync metadata. Best effort:
// every storage or decode failure is logged and absorbed, so a read that
// fails looks exactly like "nothing cached".

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fireside_api::models::{Account, Transaction};

use crate::storage::KeyValueStorage;

/// Every cache key lives under this prefix so `clear` can find them all.
pub const CACHE_PREFIX: &str = "fireside_cache:";
pub const ACCOUNTS_KEY: &str = "accounts";
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Schema version stamped on every entry. Entries written by another
/// version are treated as absent.
pub const CACHE_VERSION: &str = "1.0.0";

pub const DEFAULT_MAX_AGE_HOURS: u64 = 24;

const MS_PER_HOUR: i64 = 3_600_000;

/// Sync metadata attached to each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// Epoch milliseconds of the write.
    pub last_synced: i64,
    pub version: String,
}

impl CacheMetadata {
    fn now() -> Self {
        Self {
            last_synced: Utc::now().timestamp_millis(),
            version: CACHE_VERSION.to_owned(),
        }
    }

    /// Staleness against an explicit clock (epoch ms).
    pub fn is_stale_at(&self, now_ms: i64, max_age_hours: u64) -> bool {
        let max_age_ms = i64::try_from(max_age_hours)
            .unwrap_or(i64::MAX)
            .saturating_mul(MS_PER_HOUR);
        now_ms.saturating_sub(self.last_synced) > max_age_ms
    }
}

/// `true` once the entry is older than `max_age_hours`. Stale entries are
/// still valid data; staleness only hints that a refetch is due.
pub fn is_cache_stale(metadata: &CacheMetadata, max_age_hours: u64) -> bool {
    metadata.is_stale_at(Utc::now().timestamp_millis(), max_age_hours)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub metadata: CacheMetadata,
}

#[derive(Serialize)]
struct CacheEntryRef<'a, T> {
    data: &'a T,
    metadata: &'a CacheMetadata,
}

/// Persistent snapshot cache over device storage.
#[derive(Clone)]
pub struct LocalCache {
    storage: Arc<dyn KeyValueStorage>,
}

impl LocalCache {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    fn storage_key(key: &str) -> String {
        format!("{CACHE_PREFIX}{key}")
    }

    // ── Generic operations ───────────────────────────────────────────

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.storage.get_item(&Self::storage_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "cache entry could not be decoded");
                return None;
            }
        };

        if entry.metadata.version != CACHE_VERSION {
            debug!(key, version = %entry.metadata.version, "discarding cache entry from another schema version");
            return None;
        }
        Some(entry)
    }

    /// Overwrite the whole entry for `key`. Returns the metadata written, or
    /// `None` when the write failed.
    ///
    /// Only complete collections belong here; a partial fetch written
    /// through `set` would replace the full snapshot.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Option<CacheMetadata> {
        let metadata = CacheMetadata::now();
        let raw = match serde_json::to_string(&CacheEntryRef {
            data: value,
            metadata: &metadata,
        }) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "cache entry could not be encoded");
                return None;
            }
        };

        match self.storage.set_item(&Self::storage_key(key), &raw) {
            Ok(()) => Some(metadata),
            Err(e) => {
                warn!(key, error = %e, "cache write failed");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(&Self::storage_key(key)) {
            warn!(key, error = %e, "cache remove failed");
        }
    }

    /// Remove every entry under [`CACHE_PREFIX`]. Other keys are untouched.
    pub fn clear(&self) {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "cache clear could not list keys");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(CACHE_PREFIX)) {
            if let Err(e) = self.storage.remove_item(key) {
                warn!(key = %key, error = %e, "cache clear failed for key");
            }
        }
        debug!("offline cache cleared");
    }

    // ── Collections ──────────────────────────────────────────────────

    pub fn get_accounts(&self) -> Option<CacheEntry<Vec<Account>>> {
        self.get(ACCOUNTS_KEY)
    }

    pub fn set_accounts(&self, accounts: &[Account]) -> Option<CacheMetadata> {
        self.set(ACCOUNTS_KEY, &accounts)
    }

    pub fn get_transactions(&self) -> Option<CacheEntry<Vec<Transaction>>> {
        self.get(TRANSACTIONS_KEY)
    }

    pub fn set_transactions(&self, transactions: &[Transaction]) -> Option<CacheMetadata> {
        self.set(TRANSACTIONS_KEY, &transactions)
    }
}
