//! Offline-aware data layer between `fireside-api` and UI consumers.
//!
//! - **[`Session`]**: Composition root. Owns the swappable API client,
//!   runs the credential lifecycle through a [`SecureStore`], and writes
//!   full fetches through to the [`LocalCache`] and the store's cache mirror.
//!
//! - **[`ReactiveStore`]**: A `tokio::sync::watch` channel over
//!   [`AppState`] (credentials, UI flags, dashboard layout, cache mirror,
//!   pending queue). Every action is one atomic update; a filtered
//!   [`PersistedState`] is written to device storage after each change.
//!
//! - **[`LocalCache`]**: Versioned collection snapshots with staleness
//!   metadata over a [`KeyValueStorage`]. Best effort: failures are logged
//!   and read as "nothing cached".
//!
//! - **[`StateStream`]**: Subscription handle vended by the store.

pub mod cache;
pub mod error;
pub mod secure;
pub mod session;
pub mod storage;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CacheEntry, CacheMetadata, DEFAULT_MAX_AGE_HOURS, LocalCache, is_cache_stale};
pub use error::CoreError;
pub use secure::{MemorySecureStore, SecureStore, SecureStoreError};
pub use session::{
    CacheStatus, CollectionStatus, DataSource, Fetched, Session, SessionParts, transaction_matches,
};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{
    AppState, DashboardLayout, DashboardSection, PendingTransaction, PersistedState,
    ReactiveStore, SyncTicket,
};
pub use stream::StateStream;
