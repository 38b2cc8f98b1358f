// ── Session ──
//
// Composition root for one signed-in user: owns the client handle, the
// reactive store, the offline cache and the secure credential store, and
// sequences them (secure store first, then client, then state).

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use fireside_api::models::{AboutInfo, Account, Transaction, TransactionStore};
use fireside_api::resources::{about, accounts, transactions};
use fireside_api::{
    AccountFilter, ApiClient, ClientHandle, Credentials, DateRange, TransactionFilter,
};
use fireside_api::TransportConfig;

use crate::cache::{CACHE_VERSION, CacheMetadata, LocalCache, is_cache_stale};
use crate::error::CoreError;
use crate::secure::{MemorySecureStore, SecureStore};
use crate::storage::MemoryStorage;
use crate::store::{MirroredCollection, ReactiveStore, SyncTicket};

// ── Results ──────────────────────────────────────────────────────────

/// Where an offline-first read got its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// A full aggregation that just completed.
    Live,
    /// The cache mirror, because the server was unreachable.
    Cached { last_synced: Option<i64> },
}

#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: Arc<Vec<T>>,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    pub fn is_live(&self) -> bool {
        self.source == DataSource::Live
    }
}

/// Freshness of one cached collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStatus {
    /// `None` when nothing has been cached.
    pub items: Option<usize>,
    pub last_synced: Option<DateTime<Utc>>,
    /// Missing data counts as stale.
    pub stale: bool,
}

impl CollectionStatus {
    fn of<T>(mirror: &MirroredCollection<T>, max_age_hours: u64) -> Self {
        let stale = mirror.last_synced.is_none_or(|last_synced| {
            is_cache_stale(
                &CacheMetadata {
                    last_synced,
                    version: CACHE_VERSION.to_owned(),
                },
                max_age_hours,
            )
        });
        Self {
            items: mirror.data.as_ref().map(|d| d.len()),
            last_synced: mirror.last_synced_at(),
            stale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub accounts: CollectionStatus,
    pub transactions: CollectionStatus,
}

// ── Session ──────────────────────────────────────────────────────────

/// Everything a [`Session`] is assembled from.
pub struct SessionParts {
    pub store: Arc<ReactiveStore>,
    pub cache: LocalCache,
    pub secure_store: Arc<dyn SecureStore>,
    pub transport: TransportConfig,
}

/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<ReactiveStore>,
    cache: LocalCache,
    secure_store: Arc<dyn SecureStore>,
    transport: TransportConfig,
    client: ClientHandle,
    /// Serialize write-through per collection so the ticket check, the
    /// durable write and the mirror update happen as one step.
    accounts_write: Mutex<()>,
    transactions_write: Mutex<()>,
}

fn lock(mutex: &Mutex<()>) -> std::sync::MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub fn new(parts: SessionParts) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store: parts.store,
                cache: parts.cache,
                secure_store: parts.secure_store,
                transport: parts.transport,
                client: ClientHandle::new(),
                accounts_write: Mutex::new(()),
                transactions_write: Mutex::new(()),
            }),
        }
    }

    /// A session whose storage and credentials live only in memory.
    pub fn in_memory(transport: TransportConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        Self::new(SessionParts {
            store: Arc::new(ReactiveStore::with_storage(storage.clone())),
            cache: LocalCache::new(storage),
            secure_store: Arc::new(MemorySecureStore::new()),
            transport,
        })
    }

    pub fn store(&self) -> &Arc<ReactiveStore> {
        &self.inner.store
    }

    pub fn cache(&self) -> &LocalCache {
        &self.inner.cache
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.inner.transport
    }

    /// The live client; [`fireside_api::Error::NotInitialized`] before sign-in.
    pub fn client(&self) -> Result<Arc<ApiClient>, CoreError> {
        Ok(self.inner.client.ensure_initialized()?)
    }

    // ── Credential lifecycle ─────────────────────────────────────────

    /// Check that `credentials` reach a server that accepts them, without
    /// touching the live client or any state.
    pub async fn validate_connection(
        &self,
        credentials: &Credentials,
    ) -> Result<AboutInfo, CoreError> {
        let probe = ApiClient::new(credentials, &self.inner.transport)?;
        let info = about::get_about(&probe).await?;
        debug!(version = %info.version, "connection validated");
        Ok(info)
    }

    /// Validate, then persist and activate the credentials.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<AboutInfo, CoreError> {
        let info = self.validate_connection(&credentials).await?;
        self.set_credentials(credentials)?;
        info!(version = %info.version, "signed in");
        Ok(info)
    }

    /// Save to the secure store, then initialize the client and mark the
    /// session authenticated. A failed save changes nothing.
    pub fn set_credentials(&self, credentials: Credentials) -> Result<(), CoreError> {
        self.inner.secure_store.save(&credentials)?;
        self.inner
            .client
            .initialize(&credentials, &self.inner.transport)?;
        self.inner.store.set_auth(credentials);
        Ok(())
    }

    /// Startup path: restore credentials from the secure store. Returns
    /// whether a session was restored. `is_loading` is set for the duration.
    pub fn load_credentials(&self) -> Result<bool, CoreError> {
        let store = &self.inner.store;
        store.set_loading(true);
        let result = self.restore_credentials();
        store.set_loading(false);
        result
    }

    fn restore_credentials(&self) -> Result<bool, CoreError> {
        let Some(credentials) = self.inner.secure_store.load()? else {
            debug!("no stored credentials");
            return Ok(false);
        };
        self.inner
            .client
            .initialize(&credentials, &self.inner.transport)?;
        self.inner.store.set_auth(credentials);
        debug!("credentials restored");
        Ok(true)
    }

    /// Sign out: remove the stored credentials, drop the client, wipe the
    /// offline cache, and reset credentials, mirror and pending queue.
    /// Display preferences survive. Nothing is reset if the secure store
    /// refuses the removal.
    pub fn clear_credentials(&self) -> Result<(), CoreError> {
        self.inner.secure_store.clear()?;
        self.inner.client.reset();

        let _accounts = lock(&self.inner.accounts_write);
        let _transactions = lock(&self.inner.transactions_write);
        self.inner.cache.clear();
        self.inner.store.clear_credentials();
        info!("signed out");
        Ok(())
    }

    // ── Write-through ────────────────────────────────────────────────

    /// Durable write, then mirror update. Returns `false` if the ticket is
    /// stale or the durable write failed; the mirror is untouched then.
    pub fn set_cached_accounts(&self, data: Vec<Account>, ticket: SyncTicket) -> bool {
        self.write_accounts(Arc::new(data), ticket)
    }

    pub fn set_cached_transactions(&self, data: Vec<Transaction>, ticket: SyncTicket) -> bool {
        self.write_transactions(Arc::new(data), ticket)
    }

    fn write_accounts(&self, data: Arc<Vec<Account>>, ticket: SyncTicket) -> bool {
        let _guard = lock(&self.inner.accounts_write);
        let store = &self.inner.store;
        if !store.accepts_accounts(ticket) {
            debug!(ticket = ticket.value(), "skipping superseded accounts write");
            return false;
        }
        let Some(metadata) = self.inner.cache.set_accounts(&data) else {
            return false;
        };
        store.apply_cached_accounts(data, metadata.last_synced, ticket)
    }

    fn write_transactions(&self, data: Arc<Vec<Transaction>>, ticket: SyncTicket) -> bool {
        let _guard = lock(&self.inner.transactions_write);
        let store = &self.inner.store;
        if !store.accepts_transactions(ticket) {
            debug!(ticket = ticket.value(), "skipping superseded transactions write");
            return false;
        }
        let Some(metadata) = self.inner.cache.set_transactions(&data) else {
            return false;
        };
        store.apply_cached_transactions(data, metadata.last_synced, ticket)
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch every page of accounts. Unfiltered results (a type filter
    /// makes the list partial) are written through to the cache.
    /// On failure the error propagates and the store keeps its last data.
    pub async fn refresh_accounts(
        &self,
        filter: &AccountFilter,
    ) -> Result<Arc<Vec<Account>>, CoreError> {
        let ticket = self.inner.store.begin_sync();
        let client = self.client()?;
        let envelope = accounts::get_all_accounts(&client, filter).await?;
        let data = Arc::new(envelope.data);
        if filter.account_type.is_none() {
            self.write_accounts(Arc::clone(&data), ticket);
        }
        debug!(count = data.len(), "accounts refreshed");
        Ok(data)
    }

    /// Fetch every page of transactions in the filter's window. Results
    /// without a type filter become the cached transaction collection.
    pub async fn refresh_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Arc<Vec<Transaction>>, CoreError> {
        let ticket = self.inner.store.begin_sync();
        let client = self.client()?;
        let envelope = transactions::get_all_transactions(&client, filter).await?;
        let data = Arc::new(envelope.data);
        if filter.transaction_type.is_none() {
            self.write_transactions(Arc::clone(&data), ticket);
        }
        debug!(count = data.len(), "transactions refreshed");
        Ok(data)
    }

    // ── Offline-first reads ──────────────────────────────────────────

    /// Refresh, or fall back to the mirror when the server is unreachable.
    /// Any other error, or no cached data, propagates.
    pub async fn accounts_offline_first(
        &self,
        filter: &AccountFilter,
    ) -> Result<Fetched<Account>, CoreError> {
        let result = self.refresh_accounts(filter).await;
        let store = &self.inner.store;
        offline_fallback(result, || {
            let cached = store.cached_accounts()?;
            let data = match &filter.account_type {
                Some(kind) => Arc::new(
                    cached
                        .iter()
                        .filter(|a| &a.attributes.account_type == kind)
                        .cloned()
                        .collect::<Vec<_>>(),
                ),
                None => cached,
            };
            Some((data, store.last_accounts_sync()))
        })
    }

    pub async fn transactions_offline_first(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Fetched<Transaction>, CoreError> {
        let result = self.refresh_transactions(filter).await;
        let store = &self.inner.store;
        offline_fallback(result, || {
            let cached = store.cached_transactions()?;
            let data = if filter == &TransactionFilter::default() {
                cached
            } else {
                Arc::new(
                    cached
                        .iter()
                        .filter(|t| transaction_matches(t, filter))
                        .cloned()
                        .collect::<Vec<_>>(),
                )
            };
            Some((data, store.last_transactions_sync()))
        })
    }

    // ── Cold start ───────────────────────────────────────────────────

    /// Copy durable cache entries into the mirror. Returns whether anything
    /// was loaded.
    pub fn hydrate_from_cache(&self) -> bool {
        let _accounts = lock(&self.inner.accounts_write);
        let _transactions = lock(&self.inner.transactions_write);
        let cache = &self.inner.cache;
        let loaded = self
            .inner
            .store
            .hydrate_cache_mirror(cache.get_accounts(), cache.get_transactions());
        debug!(loaded, "cache mirror hydrated");
        loaded
    }

    // ── Pending queue ────────────────────────────────────────────────

    /// Queue a transaction created offline. The queue is never replayed
    /// automatically.
    pub fn queue_transaction(&self, payload: TransactionStore) -> Uuid {
        let id = self.inner.store.add_pending_transaction(payload);
        info!(%id, "transaction queued for later");
        id
    }

    // ── Status ───────────────────────────────────────────────────────

    pub fn cache_status(&self, max_age_hours: u64) -> CacheStatus {
        self.inner.store.select(|s| CacheStatus {
            accounts: CollectionStatus::of(&s.cache.accounts, max_age_hours),
            transactions: CollectionStatus::of(&s.cache.transactions, max_age_hours),
        })
    }
}

/// Apply a transaction filter locally, by the group's first split.
pub fn transaction_matches(t: &Transaction, filter: &TransactionFilter) -> bool {
    let Some(first) = t.attributes.transactions.first() else {
        return false;
    };
    let DateRange { start, end } = filter.range;
    let day = first.date.date_naive();
    start.is_none_or(|s| day >= s)
        && end.is_none_or(|e| day <= e)
        && filter
            .transaction_type
            .as_ref()
            .is_none_or(|kind| &first.transaction_type == kind)
}

fn offline_fallback<T>(
    result: Result<Arc<Vec<T>>, CoreError>,
    cached: impl FnOnce() -> Option<(Arc<Vec<T>>, Option<i64>)>,
) -> Result<Fetched<T>, CoreError> {
    match result {
        Ok(data) => Ok(Fetched {
            data,
            source: DataSource::Live,
        }),
        Err(err) if err.is_offline() => match cached() {
            Some((data, last_synced)) => {
                warn!(error = %err, "server unreachable, serving cached data");
                Ok(Fetched {
                    data,
                    source: DataSource::Cached { last_synced },
                })
            }
            None => Err(err),
        },
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use fireside_api::models::TransactionType;
    use serde_json::json;

    use super::*;
    use crate::secure::SecureStoreError;

    /// Secure store that refuses every operation.
    struct LockedKeychain;

    impl SecureStore for LockedKeychain {
        fn load(&self) -> Result<Option<Credentials>, SecureStoreError> {
            Err(SecureStoreError::Backend("locked".into()))
        }
        fn save(&self, _: &Credentials) -> Result<(), SecureStoreError> {
            Err(SecureStoreError::Backend("locked".into()))
        }
        fn clear(&self) -> Result<(), SecureStoreError> {
            Err(SecureStoreError::Backend("locked".into()))
        }
    }

    fn locked_session() -> Session {
        let storage = Arc::new(MemoryStorage::new());
        Session::new(SessionParts {
            store: Arc::new(ReactiveStore::new()),
            cache: LocalCache::new(storage),
            secure_store: Arc::new(LockedKeychain),
            transport: TransportConfig::default(),
        })
    }

    #[test]
    fn client_requires_sign_in() {
        let session = Session::in_memory(TransportConfig::default());
        assert!(matches!(
            session.client(),
            Err(CoreError::Api(fireside_api::Error::NotInitialized))
        ));
    }

    #[test]
    fn set_and_load_credentials() {
        let session = Session::in_memory(TransportConfig::default());
        assert!(!session.load_credentials().unwrap());
        assert!(!session.store().is_loading());

        session
            .set_credentials(Credentials::new("https://ff.example.com", "tok"))
            .unwrap();
        assert!(session.store().is_authenticated());
        assert_eq!(
            session.client().unwrap().base_url().as_str(),
            "https://ff.example.com/api/v1/"
        );

        assert!(session.load_credentials().unwrap());
        assert!(!session.store().is_loading());
    }

    #[test]
    fn failed_save_changes_nothing() {
        let session = locked_session();
        let err = session
            .set_credentials(Credentials::new("https://ff.example.com", "tok"))
            .unwrap_err();
        assert!(matches!(err, CoreError::SecureStore(_)));
        assert!(!session.store().is_authenticated());
        assert!(session.client().is_err());
    }

    #[test]
    fn failed_load_clears_loading_flag() {
        let session = locked_session();
        assert!(session.load_credentials().is_err());
        assert!(!session.store().is_loading());
    }

    #[test]
    fn write_through_updates_cache_and_mirror() {
        let session = Session::in_memory(TransportConfig::default());
        let ticket = session.store().begin_sync();
        assert!(session.set_cached_accounts(Vec::new(), ticket));

        let entry = session.cache().get_accounts().unwrap();
        assert_eq!(
            session.store().last_accounts_sync(),
            Some(entry.metadata.last_synced)
        );
    }

    #[test]
    fn superseded_write_skips_durable_cache() {
        let session = Session::in_memory(TransportConfig::default());
        let older = session.store().begin_sync();
        let newer = session.store().begin_sync();

        assert!(session.set_cached_transactions(Vec::new(), newer));
        session.cache().clear();
        assert!(!session.set_cached_transactions(Vec::new(), older));
        assert!(session.cache().get_transactions().is_none());
    }

    #[test]
    fn cache_status_reports_missing_as_stale() {
        let session = Session::in_memory(TransportConfig::default());
        let status = session.cache_status(24);
        assert_eq!(status.accounts.items, None);
        assert!(status.accounts.stale);

        let ticket = session.store().begin_sync();
        session.set_cached_accounts(Vec::new(), ticket);
        let status = session.cache_status(24);
        assert_eq!(status.accounts.items, Some(0));
        assert!(!status.accounts.stale);
        assert!(status.transactions.stale);
    }

    fn group(date: &str, kind: &str) -> Transaction {
        serde_json::from_value(json!({
            "id": "1",
            "type": "transactions",
            "attributes": {
                "transactions": [{
                    "type": kind,
                    "date": date,
                    "amount": "4.20",
                    "description": "Coffee"
                }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn local_filter_uses_first_split() {
        let t = group("2026-02-10T08:00:00+01:00", "withdrawal");
        let mut filter = TransactionFilter::default();
        assert!(transaction_matches(&t, &filter));

        filter.range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        );
        assert!(transaction_matches(&t, &filter));

        filter.transaction_type = Some(TransactionType::Deposit);
        assert!(!transaction_matches(&t, &filter));

        filter.transaction_type = None;
        filter.range.start = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert!(!transaction_matches(&t, &filter));
    }
}
