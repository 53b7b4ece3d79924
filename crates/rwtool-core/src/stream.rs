// ── Reactive sync streams ──
//
// Subscription types for consuming a `SyncController`'s state changes.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::sync::SyncState;

/// A subscription to one synced collection.
///
/// Provides both point-in-time snapshot access and change notification
/// via `changed()` or by converting to a `Stream`.
pub struct SyncStream<T> {
    current: SyncState<T>,
    receiver: watch::Receiver<SyncState<T>>,
}

impl<T: Send + Sync + 'static> SyncStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<SyncState<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &SyncState<T> {
        &self.current
    }

    /// The latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> SyncState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the controller is gone.
    pub async fn changed(&mut self) -> Option<SyncState<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> SyncWatchStream<T> {
        SyncWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a state snapshot on every change.
pub struct SyncWatchStream<T> {
    inner: WatchStream<SyncState<T>>,
}

impl<T: Send + Sync + 'static> Stream for SyncWatchStream<T> {
    type Item = SyncState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use crate::notify::Notifier;
    use crate::sync::SyncController;

    #[tokio::test]
    async fn stream_yields_initial_then_loaded_state() {
        let c = SyncController::new("rows", "Error loading rows", Notifier::default(), || async {
            Ok(vec!["x"])
        });
        let mut stream = c.stream().into_stream();

        let first = stream.next().await.expect("initial");
        assert!(!first.is_loaded());

        c.refresh().await.expect("load");
        let mut last = None;
        while let Some(state) = tokio::time::timeout(std::time::Duration::from_millis(50), stream.next())
            .await
            .ok()
            .flatten()
        {
            last = Some(state);
        }
        let last = last.expect("update");
        assert_eq!(last.items.len(), 1);
        assert!(!last.is_loading);
    }

    #[tokio::test]
    async fn changed_tracks_current() {
        let c = SyncController::new("rows", "Error loading rows", Notifier::default(), || async {
            Ok(vec![1_u32])
        });
        let mut sub = c.stream();
        assert_eq!(sub.current().generation, 0);
        c.refresh().await.expect("load");
        sub.changed().await.expect("changed");
        assert_eq!(sub.latest().generation, 1);
    }
}
