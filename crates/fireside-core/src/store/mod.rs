// ── Reactive application store ──
//
// A single `watch` channel over `AppState`. Every action is one
// `send_if_modified` call, so subscribers never observe a half-applied
// action. When device storage is attached, the persistence filter is
// written after each change under a mutex that spans the update, so
// storage sees snapshots in update order.

mod dashboard;
mod persist;
mod state;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use fireside_api::Credentials;
use fireside_api::models::{Account, Transaction, TransactionStore};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::CacheEntry;
use crate::storage::KeyValueStorage;
use crate::stream::StateStream;

pub use dashboard::{DashboardLayout, DashboardSection};
pub use persist::{PersistedState, STORE_KEY, STORE_VERSION};
pub use state::{
    AppState, CacheMirror, CredentialsState, MirroredCollection, PendingState,
    PendingTransaction, SyncTicket, UiState,
};

/// Whether an action's result belongs in the device-storage snapshot.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    Memory,
    Device,
}

struct Persistence {
    storage: Arc<dyn KeyValueStorage>,
    lock: Mutex<()>,
}

impl Persistence {
    fn write(&self, snapshot: &PersistedState) {
        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "store snapshot could not be encoded");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(STORE_KEY, &raw) {
            warn!(error = %e, "store snapshot write failed");
        }
    }
}

fn load_snapshot(storage: &dyn KeyValueStorage) -> AppState {
    let raw = match storage.get_item(STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return AppState::default(),
        Err(e) => {
            warn!(error = %e, "store snapshot read failed, starting fresh");
            return AppState::default();
        }
    };
    match serde_json::from_str::<PersistedState>(&raw) {
        Ok(snapshot) if snapshot.version == STORE_VERSION => snapshot.into_state(),
        Ok(snapshot) => {
            debug!(
                version = snapshot.version,
                "discarding store snapshot from another version"
            );
            AppState::default()
        }
        Err(e) => {
            warn!(error = %e, "store snapshot could not be decoded, starting fresh");
            AppState::default()
        }
    }
}

/// Shared, observable application state.
pub struct ReactiveStore {
    state: watch::Sender<AppState>,
    persistence: Option<Persistence>,
    tickets: AtomicU64,
}

impl Default for ReactiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveStore {
    /// Memory-only store starting from defaults.
    pub fn new() -> Self {
        Self::from_state(AppState::default(), None)
    }

    /// Store backed by device storage: hydrates from the persisted snapshot
    /// (if any) and writes the persistence filter on every change.
    pub fn with_storage(storage: Arc<dyn KeyValueStorage>) -> Self {
        let state = load_snapshot(storage.as_ref());
        Self::from_state(
            state,
            Some(Persistence {
                storage,
                lock: Mutex::new(()),
            }),
        )
    }

    fn from_state(state: AppState, persistence: Option<Persistence>) -> Self {
        let (tx, _) = watch::channel(state);
        Self {
            state: tx,
            persistence,
            tickets: AtomicU64::new(SyncTicket::HYDRATE.0),
        }
    }

    fn update<F>(&self, scope: Scope, action: &'static str, modify: F) -> bool
    where
        F: FnOnce(&mut AppState) -> bool,
    {
        let persistence = match &self.persistence {
            Some(p) if scope == Scope::Device => p,
            _ => return self.state.send_if_modified(modify),
        };

        let _guard = persistence
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let changed = self.state.send_if_modified(modify);
        if changed {
            let snapshot = PersistedState::from_state(&self.state.borrow());
            persistence.write(&snapshot);
            debug!(action, "store snapshot persisted");
        }
        changed
    }

    // ── Selectors ────────────────────────────────────────────────────

    /// Clone of the whole state. Collections are behind `Arc`, so this is cheap.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Read through a selector without cloning the whole state.
    pub fn select<R>(&self, selector: impl FnOnce(&AppState) -> R) -> R {
        selector(&self.state.borrow())
    }

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    pub fn is_authenticated(&self) -> bool {
        self.select(|s| s.credentials.is_authenticated)
    }

    pub fn is_loading(&self) -> bool {
        self.select(|s| s.credentials.is_loading)
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.select(|s| s.credentials.credentials.clone())
    }

    pub fn balance_visible(&self) -> bool {
        self.select(|s| s.ui.balance_visible)
    }

    pub fn dashboard_layout(&self) -> DashboardLayout {
        self.select(|s| s.dashboard.clone())
    }

    pub fn visible_sections(&self) -> Vec<DashboardSection> {
        self.select(|s| s.dashboard.visible().to_vec())
    }

    pub fn hidden_sections(&self) -> Vec<DashboardSection> {
        self.select(|s| s.dashboard.hidden().iter().copied().collect())
    }

    pub fn cached_accounts(&self) -> Option<Arc<Vec<Account>>> {
        self.select(|s| s.cache.accounts.data.clone())
    }

    pub fn cached_transactions(&self) -> Option<Arc<Vec<Transaction>>> {
        self.select(|s| s.cache.transactions.data.clone())
    }

    pub fn last_accounts_sync(&self) -> Option<i64> {
        self.select(|s| s.cache.accounts.last_synced)
    }

    pub fn last_transactions_sync(&self) -> Option<i64> {
        self.select(|s| s.cache.transactions.last_synced)
    }

    pub fn pending_transactions(&self) -> Vec<PendingTransaction> {
        self.select(|s| s.pending.transactions.clone())
    }

    // ── Credentials slice ────────────────────────────────────────────

    /// Record a signed-in session. Memory only.
    pub fn set_auth(&self, credentials: Credentials) {
        self.update(Scope::Memory, "set_auth", |s| {
            s.credentials.credentials = Some(credentials);
            s.credentials.is_authenticated = true;
            true
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(Scope::Memory, "set_loading", |s| {
            let changed = s.credentials.is_loading != loading;
            s.credentials.is_loading = loading;
            changed
        });
    }

    // ── UI slice ─────────────────────────────────────────────────────

    pub fn set_balance_visible(&self, visible: bool) {
        self.update(Scope::Device, "set_balance_visible", |s| {
            let changed = s.ui.balance_visible != visible;
            s.ui.balance_visible = visible;
            changed
        });
    }

    /// Flip balance visibility and return the new value.
    pub fn toggle_balance_visible(&self) -> bool {
        let mut visible = false;
        self.update(Scope::Device, "toggle_balance_visible", |s| {
            s.ui.balance_visible = !s.ui.balance_visible;
            visible = s.ui.balance_visible;
            true
        });
        visible
    }

    // ── Dashboard slice ──────────────────────────────────────────────

    pub fn move_dashboard_section_to_hidden(&self, section: DashboardSection) -> bool {
        self.update(Scope::Device, "move_dashboard_section_to_hidden", |s| {
            s.dashboard.move_to_hidden(section)
        })
    }

    pub fn move_dashboard_section_to_visible(&self, section: DashboardSection) -> bool {
        self.update(Scope::Device, "move_dashboard_section_to_visible", |s| {
            s.dashboard.move_to_visible(section)
        })
    }

    pub fn reorder_dashboard_visible(&self, from: usize, to: usize) -> bool {
        self.update(Scope::Device, "reorder_dashboard_visible", |s| {
            from != to && s.dashboard.reorder_visible(from, to)
        })
    }

    pub fn set_dashboard_visible_order(&self, order: Vec<DashboardSection>) -> bool {
        self.update(Scope::Device, "set_dashboard_visible_order", |s| {
            s.dashboard.set_visible_order(order)
        })
    }

    pub fn reset_dashboard_layout(&self) {
        self.update(Scope::Device, "reset_dashboard_layout", |s| {
            let default = DashboardLayout::default();
            let changed = s.dashboard != default;
            s.dashboard = default;
            changed
        });
    }

    // ── Cache mirror slice ───────────────────────────────────────────

    /// Issue the ticket for a fetch that is about to start.
    pub fn begin_sync(&self) -> SyncTicket {
        SyncTicket(self.tickets.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn accepts_accounts(&self, ticket: SyncTicket) -> bool {
        self.select(|s| s.cache.accounts.accepts(ticket))
    }

    pub(crate) fn accepts_transactions(&self, ticket: SyncTicket) -> bool {
        self.select(|s| s.cache.transactions.accepts(ticket))
    }

    /// Replace the mirrored accounts. Returns `false` if `ticket` is older
    /// than the last one applied.
    pub fn apply_cached_accounts(
        &self,
        data: Arc<Vec<Account>>,
        last_synced: i64,
        ticket: SyncTicket,
    ) -> bool {
        let applied = self.update(Scope::Device, "apply_cached_accounts", |s| {
            s.cache.accounts.apply(data, last_synced, ticket)
        });
        if !applied {
            debug!(ticket = ticket.0, "stale accounts write rejected");
        }
        applied
    }

    pub fn apply_cached_transactions(
        &self,
        data: Arc<Vec<Transaction>>,
        last_synced: i64,
        ticket: SyncTicket,
    ) -> bool {
        let applied = self.update(Scope::Device, "apply_cached_transactions", |s| {
            s.cache.transactions.apply(data, last_synced, ticket)
        });
        if !applied {
            debug!(ticket = ticket.0, "stale transactions write rejected");
        }
        applied
    }

    /// Copy durable cache entries into the mirror in one update. Entries
    /// lose to anything a fetch has already applied.
    pub fn hydrate_cache_mirror(
        &self,
        accounts: Option<CacheEntry<Vec<Account>>>,
        transactions: Option<CacheEntry<Vec<Transaction>>>,
    ) -> bool {
        if accounts.is_none() && transactions.is_none() {
            return false;
        }
        self.update(Scope::Device, "hydrate_cache_mirror", |s| {
            let mut changed = false;
            if let Some(entry) = accounts {
                changed |= s.cache.accounts.apply(
                    Arc::new(entry.data),
                    entry.metadata.last_synced,
                    SyncTicket::HYDRATE,
                );
            }
            if let Some(entry) = transactions {
                changed |= s.cache.transactions.apply(
                    Arc::new(entry.data),
                    entry.metadata.last_synced,
                    SyncTicket::HYDRATE,
                );
            }
            changed
        })
    }

    // ── Pending slice ────────────────────────────────────────────────

    /// Append to the offline queue and return the entry's idempotency key.
    pub fn add_pending_transaction(&self, payload: TransactionStore) -> Uuid {
        let entry = PendingTransaction {
            id: Uuid::new_v4(),
            queued_at: Utc::now(),
            payload,
        };
        let id = entry.id;
        self.update(Scope::Device, "add_pending_transaction", |s| {
            s.pending.transactions.push(entry);
            true
        });
        id
    }

    pub fn remove_pending_transaction(&self, id: Uuid) -> bool {
        self.update(Scope::Device, "remove_pending_transaction", |s| {
            let before = s.pending.transactions.len();
            s.pending.transactions.retain(|p| p.id != id);
            s.pending.transactions.len() != before
        })
    }

    pub fn clear_pending_transactions(&self) {
        self.update(Scope::Device, "clear_pending_transactions", |s| {
            let changed = !s.pending.transactions.is_empty();
            s.pending.transactions.clear();
            changed
        });
    }

    // ── Sign-out ─────────────────────────────────────────────────────

    /// Reset credentials, cache mirror and pending queue in one update.
    /// UI preferences and the dashboard layout survive.
    ///
    /// Fetches started before this call can no longer write the mirror.
    pub fn clear_credentials(&self) {
        let fence = self.begin_sync();
        self.update(Scope::Device, "clear_credentials", |s| {
            s.credentials = CredentialsState::default();
            s.cache.accounts.reset(fence);
            s.cache.transactions.reset(fence);
            s.pending = PendingState::default();
            true
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fireside_api::models::{TransactionSplitStore, TransactionType};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cache::{CACHE_VERSION, CacheMetadata};
    use crate::storage::MemoryStorage;

    fn payload(description: &str) -> TransactionStore {
        TransactionStore {
            error_if_duplicate_hash: false,
            apply_rules: true,
            group_title: None,
            transactions: vec![TransactionSplitStore {
                transaction_type: TransactionType::Withdrawal,
                date: "2026-10-01".into(),
                amount: "12.50".into(),
                description: description.into(),
                currency_code: None,
                source_id: Some("1".into()),
                source_name: None,
                destination_id: None,
                destination_name: Some("Bakery".into()),
                category_name: None,
                budget_id: None,
                notes: None,
                tags: Vec::new(),
            }],
        }
    }

    fn persisted(storage: &MemoryStorage) -> PersistedState {
        serde_json::from_str(&storage.get_item(STORE_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn defaults() {
        let store = ReactiveStore::new();
        assert!(!store.is_authenticated());
        assert!(store.balance_visible());
        assert!(store.hidden_sections().is_empty());
        assert!(store.cached_accounts().is_none());
        assert!(store.pending_transactions().is_empty());
    }

    #[test]
    fn balance_toggle() {
        let store = ReactiveStore::new();
        assert!(!store.toggle_balance_visible());
        assert!(!store.balance_visible());
        assert!(store.toggle_balance_visible());
        store.set_balance_visible(false);
        assert!(!store.balance_visible());
    }

    #[test]
    fn tickets_order_mirror_writes() {
        let store = ReactiveStore::new();
        let older = store.begin_sync();
        let newer = store.begin_sync();
        assert!(newer > older);

        assert!(store.apply_cached_accounts(Arc::new(Vec::new()), 200, newer));
        assert!(!store.apply_cached_accounts(Arc::new(Vec::new()), 100, older));
        assert_eq!(store.last_accounts_sync(), Some(200));

        // Transactions track their own ticket.
        assert!(store.apply_cached_transactions(Arc::new(Vec::new()), 100, older));
    }

    #[test]
    fn hydrate_loses_to_fetched_data() {
        let store = ReactiveStore::new();
        let entry = CacheEntry {
            data: Vec::new(),
            metadata: CacheMetadata {
                last_synced: 1,
                version: CACHE_VERSION.into(),
            },
        };
        assert!(store.hydrate_cache_mirror(Some(entry.clone()), None));
        assert_eq!(store.last_accounts_sync(), Some(1));

        let ticket = store.begin_sync();
        store.apply_cached_accounts(Arc::new(Vec::new()), 50, ticket);
        assert!(!store.hydrate_cache_mirror(Some(entry), None));
        assert_eq!(store.last_accounts_sync(), Some(50));
        assert!(!store.hydrate_cache_mirror(None, None));
    }

    #[test]
    fn pending_queue() {
        let store = ReactiveStore::new();
        let a = store.add_pending_transaction(payload("bread"));
        let b = store.add_pending_transaction(payload("milk"));
        assert_ne!(a, b);

        let queued = store.pending_transactions();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].id, a);

        assert!(store.remove_pending_transaction(a));
        assert!(!store.remove_pending_transaction(a));
        assert_eq!(store.pending_transactions()[0].id, b);

        store.clear_pending_transactions();
        assert!(store.pending_transactions().is_empty());
    }

    #[test]
    fn clear_credentials_keeps_preferences() {
        let store = ReactiveStore::new();
        store.set_auth(Credentials::new("https://ff.example.com", "tok"));
        store.set_balance_visible(false);
        store.move_dashboard_section_to_hidden(DashboardSection::Bills);
        let ticket = store.begin_sync();
        store.apply_cached_accounts(Arc::new(Vec::new()), 10, ticket);
        store.apply_cached_transactions(Arc::new(Vec::new()), 10, ticket);
        store.add_pending_transaction(payload("coffee"));
        let layout = store.dashboard_layout();

        store.clear_credentials();

        let state = store.snapshot();
        assert!(state.credentials.credentials.is_none());
        assert!(!state.credentials.is_authenticated);
        assert!(state.cache.accounts.data.is_none());
        assert!(state.cache.transactions.last_synced.is_none());
        assert!(state.pending.transactions.is_empty());
        assert!(!state.ui.balance_visible);
        assert_eq!(state.dashboard, layout);
    }

    #[test]
    fn fetch_started_before_sign_out_cannot_repopulate() {
        let store = ReactiveStore::new();
        let in_flight = store.begin_sync();
        store.clear_credentials();

        assert!(!store.apply_cached_accounts(Arc::new(Vec::new()), 10, in_flight));
        assert!(store.cached_accounts().is_none());

        let next = store.begin_sync();
        assert!(store.apply_cached_accounts(Arc::new(Vec::new()), 20, next));
    }

    #[test]
    fn dashboard_actions_report_changes() {
        let store = ReactiveStore::new();
        assert!(store.move_dashboard_section_to_hidden(DashboardSection::Spending));
        assert!(!store.move_dashboard_section_to_hidden(DashboardSection::Spending));
        assert!(store.reorder_dashboard_visible(0, 1));
        assert!(!store.reorder_dashboard_visible(0, 0));
        assert!(store.move_dashboard_section_to_visible(DashboardSection::Spending));

        store.reset_dashboard_layout();
        assert_eq!(store.dashboard_layout(), DashboardLayout::default());
    }

    #[test]
    fn persists_filtered_state_on_change() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ReactiveStore::with_storage(storage.clone());

        store.set_auth(Credentials::new("https://ff.example.com", "tok"));
        assert!(storage.get_item(STORE_KEY).unwrap().is_none());

        store.set_balance_visible(false);
        assert!(!persisted(&storage).balance_visible);

        store.move_dashboard_section_to_hidden(DashboardSection::Recurring);
        let id = store.add_pending_transaction(payload("lunch"));
        let snapshot = persisted(&storage);
        assert!(!snapshot.dashboard.is_visible(DashboardSection::Recurring));
        assert_eq!(snapshot.pending_transactions[0].id, id);

        let raw = storage.get_item(STORE_KEY).unwrap().unwrap();
        assert!(!raw.contains("tok"));
        assert!(!raw.contains("ff.example.com"));
    }

    #[test]
    fn hydrates_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let store = ReactiveStore::with_storage(storage.clone());
            store.set_auth(Credentials::new("https://ff.example.com", "tok"));
            store.set_balance_visible(false);
            store.move_dashboard_section_to_hidden(DashboardSection::PiggyBanks);
            store.add_pending_transaction(payload("rent"));
        }

        let store = ReactiveStore::with_storage(storage);
        assert!(!store.is_authenticated());
        assert!(!store.balance_visible());
        assert_eq!(store.hidden_sections(), vec![DashboardSection::PiggyBanks]);
        assert_eq!(store.pending_transactions().len(), 1);
    }

    #[test]
    fn unreadable_snapshot_starts_fresh() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(STORE_KEY, "not json").unwrap();
        assert!(ReactiveStore::with_storage(storage.clone()).balance_visible());

        storage
            .set_item(STORE_KEY, r#"{"version":99,"balanceVisible":false}"#)
            .unwrap();
        assert!(ReactiveStore::with_storage(storage).balance_visible());
    }

    #[tokio::test]
    async fn subscribers_see_each_action() {
        let store = ReactiveStore::new();
        let mut stream = store.subscribe();
        assert!(stream.current().ui.balance_visible);

        store.set_balance_visible(false);
        let next = stream.changed().await.unwrap();
        assert!(!next.ui.balance_visible);
    }
}
