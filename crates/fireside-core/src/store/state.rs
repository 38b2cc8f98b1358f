// ── Application state ──
//
// One value composed of independent slices. Slices only meet in
// `ReactiveStore::clear_credentials`, the sign-out reset.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fireside_api::Credentials;
use fireside_api::models::{Account, Transaction, TransactionStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dashboard::DashboardLayout;

/// Ordering token for cache-mirror writes.
///
/// Issued by [`ReactiveStore::begin_sync`](super::ReactiveStore::begin_sync)
/// when a fetch starts. A write carrying a ticket older than the last one
/// applied to the same collection is rejected, so a slow request that
/// started first cannot overwrite the result of one that started later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncTicket(pub(crate) u64);

impl SyncTicket {
    /// Ticket used when copying durable cache entries into an empty mirror
    /// at startup. Loses to every ticket issued by a fetch.
    pub const HYDRATE: Self = Self(0);

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub credentials: CredentialsState,
    pub ui: UiState,
    pub dashboard: DashboardLayout,
    pub cache: CacheMirror,
    pub pending: PendingState,
}

// ── Credentials ──────────────────────────────────────────────────────

/// In-memory only. Never written to device storage.
#[derive(Debug, Clone, Default)]
pub struct CredentialsState {
    pub credentials: Option<Credentials>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

// ── UI ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub balance_visible: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            balance_visible: true,
        }
    }
}

// ── Cache mirror ─────────────────────────────────────────────────────

/// In-memory copy of one Local Cache collection.
#[derive(Debug, Clone)]
pub struct MirroredCollection<T> {
    pub data: Option<Arc<Vec<T>>>,
    /// Epoch milliseconds of the durable write this copy came from.
    pub last_synced: Option<i64>,
    pub(crate) ticket: SyncTicket,
}

impl<T> Default for MirroredCollection<T> {
    fn default() -> Self {
        Self {
            data: None,
            last_synced: None,
            ticket: SyncTicket::HYDRATE,
        }
    }
}

impl<T> MirroredCollection<T> {
    pub(crate) fn accepts(&self, ticket: SyncTicket) -> bool {
        ticket >= self.ticket
    }

    pub(crate) fn apply(
        &mut self,
        data: Arc<Vec<T>>,
        last_synced: i64,
        ticket: SyncTicket,
    ) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.data = Some(data);
        self.last_synced = Some(last_synced);
        self.ticket = ticket;
        true
    }

    /// Drop the data but keep rejecting every ticket older than `fence`.
    pub(crate) fn reset(&mut self, fence: SyncTicket) {
        self.data = None;
        self.last_synced = None;
        self.ticket = fence;
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced.and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheMirror {
    pub accounts: MirroredCollection<Account>,
    pub transactions: MirroredCollection<Transaction>,
}

// ── Pending queue ────────────────────────────────────────────────────

/// A transaction created while offline.
///
/// Queued with an idempotency key so a future replay could submit it at most
/// once. Nothing drains the queue yet; entries leave only when removed
/// explicitly or on sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub id: Uuid,
    pub queued_at: DateTime<Utc>,
    pub payload: TransactionStore,
}

#[derive(Debug, Clone, Default)]
pub struct PendingState {
    pub transactions: Vec<PendingTransaction>,
}
