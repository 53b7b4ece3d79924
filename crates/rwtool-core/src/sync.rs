// ── Resource sync controller ──
//
// Owns one server collection for one screen: fetches it, replaces the
// local copy wholesale, and runs mutations followed by a re-fetch.
// State lives in a `watch` channel so the TUI (or a test) can observe
// every transition. Discarding the controller cancels in-flight work;
// late responses never touch state afterwards.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::notify::Notifier;
use crate::stream::SyncStream;

type Loader<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<T>, CoreError>> + Send + Sync>;

// ── State ────────────────────────────────────────────────────────────

/// Observable state of one synced collection.
pub struct SyncState<T> {
    /// The last successfully fetched list, exactly as the server sent it.
    pub items: Arc<Vec<Arc<T>>>,
    /// True while at least one fetch is in flight.
    pub is_loading: bool,
    /// User-facing text of the most recent failed fetch, cleared on success.
    pub last_error: Option<String>,
    /// Number of fetches applied so far.
    pub generation: u64,
    in_flight: usize,
}

impl<T> SyncState<T> {
    fn begin(&mut self) {
        self.in_flight += 1;
        self.is_loading = true;
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_loading = self.in_flight > 0;
    }

    /// True once a fetch has succeeded at least once.
    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }
}

impl<T> Default for SyncState<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            is_loading: false,
            last_error: None,
            generation: 0,
            in_flight: 0,
        }
    }
}

impl<T> Clone for SyncState<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            generation: self.generation,
            in_flight: self.in_flight,
        }
    }
}

impl<T> std::fmt::Debug for SyncState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncState")
            .field("items", &self.items.len())
            .field("is_loading", &self.is_loading)
            .field("last_error", &self.last_error)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// Keeps one collection in sync with the server.
///
/// Cheaply cloneable via `Arc`; clones share state and cancellation.
pub struct SyncController<T> {
    inner: Arc<SyncInner<T>>,
}

struct SyncInner<T> {
    /// Short name used in logs (`domains`, `requests`, ...).
    resource: &'static str,
    /// Shown when a fetch fails without a server message.
    load_error: &'static str,
    loader: Loader<T>,
    state: watch::Sender<SyncState<T>>,
    notifier: Notifier,
    cancel: CancellationToken,
}

impl<T> Clone for SyncController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> SyncController<T> {
    /// Create a controller around a fetch function.
    ///
    /// `load_error` is the notice shown when a fetch fails and the server
    /// gave no message of its own.
    pub fn new<F, Fut>(
        resource: &'static str,
        load_error: &'static str,
        notifier: Notifier,
        loader: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, CoreError>> + Send + 'static,
    {
        let loader: Loader<T> = Arc::new(move || loader().boxed());
        let (state, _) = watch::channel(SyncState::default());
        Self {
            inner: Arc::new(SyncInner {
                resource,
                load_error,
                loader,
                state,
                notifier,
                cancel: CancellationToken::new(),
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Current state snapshot.
    pub fn state(&self) -> SyncState<T> {
        self.inner.state.borrow().clone()
    }

    /// Current item list.
    pub fn items(&self) -> Arc<Vec<Arc<T>>> {
        Arc::clone(&self.inner.state.borrow().items)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState<T>> {
        self.inner.state.subscribe()
    }

    /// Reactive view of the state for the TUI.
    pub fn stream(&self) -> SyncStream<T> {
        SyncStream::new(self.inner.state.subscribe())
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    pub fn is_discarded(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the collection and replace the local copy with the result.
    ///
    /// On failure the previous items stay in place, `last_error` is set
    /// and an error notice is shown. `is_loading` is cleared on every
    /// exit path, including a discard mid-fetch.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return Err(CoreError::Discarded);
        }

        inner.state.send_modify(SyncState::begin);
        debug!(resource = inner.resource, "refresh started");

        let outcome = tokio::select! {
            biased;
            () = inner.cancel.cancelled() => {
                debug!(resource = inner.resource, "refresh dropped after discard");
                inner.state.send_modify(SyncState::finish);
                return Err(CoreError::Discarded);
            }
            result = (inner.loader)() => result,
        };

        match outcome {
            Ok(items) => {
                let count = items.len();
                let items: Arc<Vec<Arc<T>>> = Arc::new(items.into_iter().map(Arc::new).collect());
                inner.state.send_modify(|s| {
                    s.items = items;
                    s.last_error = None;
                    s.generation += 1;
                    s.finish();
                });
                debug!(resource = inner.resource, count, "refresh complete");
                Ok(())
            }
            Err(err) => {
                let message = err.user_message(inner.load_error);
                warn!(resource = inner.resource, error = %err, "refresh failed");
                inner.state.send_modify(|s| {
                    s.last_error = Some(message.clone());
                    s.finish();
                });
                inner.notifier.error(message);
                Err(err)
            }
        }
    }

    /// Run a server mutation, then re-fetch, then report success.
    ///
    /// The returned future completes only after the re-fetch has settled,
    /// so callers observe the server's post-mutation state. A failed
    /// re-fetch still surfaces through `last_error`. On mutation failure
    /// the notice shows the server's message or `failure`, and no re-fetch
    /// happens.
    pub async fn mutate<R, Fut>(&self, action: Fut, success: &str, failure: &str) -> Result<R, CoreError>
    where
        Fut: Future<Output = Result<R, CoreError>>,
    {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return Err(CoreError::Discarded);
        }

        let result = tokio::select! {
            biased;
            () = inner.cancel.cancelled() => return Err(CoreError::Discarded),
            result = action => result,
        };

        match result {
            Ok(value) => {
                info!(resource = inner.resource, "{success}");
                if let Err(CoreError::Discarded) = self.refresh().await {
                    return Err(CoreError::Discarded);
                }
                inner.notifier.success(success);
                Ok(value)
            }
            Err(err) => {
                warn!(resource = inner.resource, error = %err, "mutation failed");
                inner.notifier.error(err.user_message(failure));
                Err(err)
            }
        }
    }

    /// Tear down: cancel in-flight work and ignore anything that arrives later.
    pub fn discard(&self) {
        debug!(resource = self.inner.resource, "discarded");
        self.inner.cancel.cancel();
    }
}

impl<T> std::fmt::Debug for SyncController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncController")
            .field("resource", &self.inner.resource)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;

    fn server_error(message: Option<&str>) -> CoreError {
        CoreError::Server {
            status: Some(500),
            message: message.map(str::to_owned),
            code: None,
        }
    }

    /// A fake collection whose next answer can be swapped between calls.
    #[derive(Clone)]
    struct FakeServer {
        rows: Arc<Mutex<Result<Vec<&'static str>, Option<&'static str>>>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeServer {
        fn new(rows: Vec<&'static str>) -> Self {
            Self {
                rows: Arc::new(Mutex::new(Ok(rows))),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn answer(&self, next: Result<Vec<&'static str>, Option<&'static str>>) {
            *self.rows.lock().expect("lock") = next;
        }

        fn controller(&self, notifier: Notifier) -> SyncController<&'static str> {
            let server = self.clone();
            SyncController::new("rows", "Error loading rows", notifier, move || {
                let server = server.clone();
                async move {
                    server.calls.fetch_add(1, Ordering::SeqCst);
                    let next = server.rows.lock().expect("lock").clone();
                    next.map_err(server_error)
                }
            })
        }
    }

    fn names(c: &SyncController<&'static str>) -> Vec<&'static str> {
        c.items().iter().map(|s| **s).collect()
    }

    #[tokio::test]
    async fn refresh_is_idempotent() {
        let server = FakeServer::new(vec!["a", "b"]);
        let c = server.controller(Notifier::default());

        c.refresh().await.expect("first");
        let first = names(&c);
        c.refresh().await.expect("second");
        assert_eq!(names(&c), first);
        assert_eq!(server.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_replaces_wholesale() {
        let server = FakeServer::new(vec!["a", "b", "c"]);
        let c = server.controller(Notifier::default());
        c.refresh().await.expect("load");

        server.answer(Ok(vec!["b", "d"]));
        c.refresh().await.expect("reload");
        assert_eq!(names(&c), vec!["b", "d"]);
    }

    #[tokio::test]
    async fn failure_keeps_stale_items_and_reports() {
        let server = FakeServer::new(vec!["a"]);
        let notifier = Notifier::default();
        let c = server.controller(notifier.clone());
        c.refresh().await.expect("load");

        server.answer(Err(None));
        assert!(c.refresh().await.is_err());
        let state = c.state();
        assert_eq!(names(&c), vec!["a"]);
        assert!(!state.is_loading);
        assert_eq!(state.last_error.as_deref(), Some("Error loading rows"));
        assert_eq!(notifier.current().map(|n| n.message).as_deref(), Some("Error loading rows"));

        server.answer(Err(Some("database offline")));
        assert!(c.refresh().await.is_err());
        assert_eq!(c.last_error().as_deref(), Some("database offline"));

        server.answer(Ok(vec!["z"]));
        c.refresh().await.expect("recover");
        assert_eq!(c.last_error(), None);
    }

    #[tokio::test]
    async fn loading_flag_tracks_fetch() {
        let (tx, rx) = oneshot::channel::<Result<Vec<u8>, CoreError>>();
        let rx = Arc::new(Mutex::new(Some(rx)));
        let c = SyncController::new("rows", "Error loading rows", Notifier::default(), move || {
            let rx = rx.lock().expect("lock").take();
            async move {
                match rx {
                    Some(rx) => rx.await.unwrap_or_else(|_| Ok(Vec::new())),
                    None => Ok(Vec::new()),
                }
            }
        });

        assert!(!c.is_loading());
        let task = tokio::spawn({
            let c = c.clone();
            async move { c.refresh().await }
        });
        while !c.is_loading() {
            tokio::task::yield_now().await;
        }
        tx.send(Err(server_error(None))).expect("send");
        assert!(task.await.expect("join").is_err());
        assert!(!c.is_loading());
    }

    #[tokio::test]
    async fn mutate_refreshes_before_returning() {
        let server = FakeServer::new(vec!["a"]);
        let notifier = Notifier::default();
        let c = server.controller(notifier.clone());
        c.refresh().await.expect("load");

        let remote = server.clone();
        let value = c
            .mutate(
                async move {
                    remote.answer(Ok(vec!["a", "b"]));
                    Ok::<_, CoreError>(7)
                },
                "Row created",
                "Error creating row",
            )
            .await
            .expect("mutate");

        assert_eq!(value, 7);
        assert_eq!(names(&c), vec!["a", "b"]);
        assert_eq!(notifier.current().map(|n| n.message).as_deref(), Some("Row created"));
    }

    #[tokio::test]
    async fn failed_mutation_skips_refresh() {
        let server = FakeServer::new(vec!["a"]);
        let notifier = Notifier::default();
        let c = server.controller(notifier.clone());
        c.refresh().await.expect("load");

        let err = c
            .mutate(
                async { Err::<(), _>(server_error(Some("Name already taken"))) },
                "Row created",
                "Error creating row",
            )
            .await;
        assert!(err.is_err());
        assert_eq!(server.calls.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.current().map(|n| n.message).as_deref(), Some("Name already taken"));
    }

    #[tokio::test(start_paused = true)]
    async fn responses_after_discard_are_ignored() {
        let c = SyncController::new("rows", "Error loading rows", Notifier::default(), || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![1_u8, 2, 3])
        });
        let task = tokio::spawn({
            let c = c.clone();
            async move { c.refresh().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        c.discard();

        let result = task.await.expect("join");
        assert!(matches!(result, Err(CoreError::Discarded)));
        assert!(c.items().is_empty());
        assert!(!c.is_loading());
        assert!(matches!(c.refresh().await, Err(CoreError::Discarded)));
    }
}
