// ── Persistence filter ──
//
// The subset of `AppState` written to device storage. Credentials have no
// field here; they only travel through the secure store.

use std::sync::Arc;

use fireside_api::models::{Account, Transaction};
use serde::{Deserialize, Serialize};

use super::dashboard::DashboardLayout;
use super::state::{
    AppState, MirroredCollection, PendingState, PendingTransaction, SyncTicket, UiState,
};

/// Device-storage key of the store snapshot.
pub const STORE_KEY: &str = "fireside-store";

/// Bumped when the snapshot shape changes; older snapshots are discarded.
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub version: u32,
    pub balance_visible: bool,
    pub dashboard: DashboardLayout,
    pub cached_accounts: Option<Arc<Vec<Account>>>,
    pub cached_transactions: Option<Arc<Vec<Transaction>>>,
    pub last_accounts_sync: Option<i64>,
    pub last_transactions_sync: Option<i64>,
    pub pending_transactions: Vec<PendingTransaction>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::from_state(&AppState::default())
    }
}

impl PersistedState {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            version: STORE_VERSION,
            balance_visible: state.ui.balance_visible,
            dashboard: state.dashboard.clone(),
            cached_accounts: state.cache.accounts.data.clone(),
            cached_transactions: state.cache.transactions.data.clone(),
            last_accounts_sync: state.cache.accounts.last_synced,
            last_transactions_sync: state.cache.transactions.last_synced,
            pending_transactions: state.pending.transactions.clone(),
        }
    }

    /// Rebuild the in-memory state. Credentials start empty and the mirror
    /// starts at [`SyncTicket::HYDRATE`].
    pub fn into_state(self) -> AppState {
        let mut state = AppState {
            ui: UiState {
                balance_visible: self.balance_visible,
            },
            dashboard: self.dashboard.sanitized(),
            pending: PendingState {
                transactions: self.pending_transactions,
            },
            ..AppState::default()
        };
        state.cache.accounts = mirrored(self.cached_accounts, self.last_accounts_sync);
        state.cache.transactions = mirrored(self.cached_transactions, self.last_transactions_sync);
        state
    }
}

fn mirrored<T>(data: Option<Arc<Vec<T>>>, last_synced: Option<i64>) -> MirroredCollection<T> {
    MirroredCollection {
        last_synced: data.as_ref().and(last_synced),
        data,
        ticket: SyncTicket::HYDRATE,
    }
}
