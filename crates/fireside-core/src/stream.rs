// ── Store subscriptions ──
//
// Reactive access to `AppState` for UI consumers.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::AppState;

/// A subscription to the application state.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed`](Self::changed) or by converting to a `Stream`.
pub struct StateStream {
    current: AppState,
    receiver: watch::Receiver<AppState>,
}

impl StateStream {
    pub(crate) fn new(mut receiver: watch::Receiver<AppState>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &AppState {
        &self.current
    }

    /// The latest state, which may be newer than `current()`.
    pub fn latest(&self) -> AppState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next action to land.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<AppState> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    /// The first item is the current state.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StateWatchStream {
    inner: WatchStream<AppState>,
}

impl Stream for StateWatchStream {
    type Item = AppState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_stream::StreamExt;

    use crate::store::{DashboardSection, ReactiveStore};

    #[tokio::test]
    async fn stream_yields_current_then_updates() {
        let store = ReactiveStore::new();
        let mut stream = store.subscribe().into_stream();

        let first = stream.next().await.unwrap();
        assert!(first.dashboard.is_visible(DashboardSection::Bills));

        store.move_dashboard_section_to_hidden(DashboardSection::Bills);
        let second = stream.next().await.unwrap();
        assert!(!second.dashboard.is_visible(DashboardSection::Bills));
    }

    #[tokio::test]
    async fn changed_ends_when_store_drops() {
        let store = ReactiveStore::new();
        let mut sub = store.subscribe();
        drop(store);
        assert!(sub.changed().await.is_none());
        assert!(sub.latest().ui.balance_visible);
    }
}
