// ── Notification channel ──
//
// One transient message slot per screen. Showing a message replaces the
// current one and re-arms a single auto-clear timer; the previous timer
// is aborted so it can never blank the newer message.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::NoticeTimings;

/// Severity of a notice, used only for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    /// Local input rejected before any request was sent.
    Validation,
}

/// The message currently on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Monotonic per-channel sequence number.
    pub id: u64,
    pub message: String,
    pub level: NoticeLevel,
}

/// Single-slot, auto-clearing notification channel.
///
/// Cheap to clone; clones share the same slot and timer.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    slot: watch::Sender<Option<Notice>>,
    timer: Mutex<TimerSlot>,
    timings: NoticeTimings,
}

#[derive(Default)]
struct TimerSlot {
    next_id: u64,
    handle: Option<JoinHandle<()>>,
}

impl Notifier {
    pub fn new(timings: NoticeTimings) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            inner: Arc::new(NotifierInner {
                slot,
                timer: Mutex::new(TimerSlot::default()),
                timings,
            }),
        }
    }

    /// Show a success message for the default duration.
    pub fn success(&self, message: impl Into<String>) {
        self.show(message, NoticeLevel::Success, self.inner.timings.default);
    }

    /// Show a failure message for the default duration.
    pub fn error(&self, message: impl Into<String>) {
        self.show(message, NoticeLevel::Error, self.inner.timings.default);
    }

    /// Show a validation message for the shorter validation duration.
    pub fn validation(&self, message: impl Into<String>) {
        self.show(message, NoticeLevel::Validation, self.inner.timings.validation);
    }

    /// Replace the current message and arm the auto-clear timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show(&self, message: impl Into<String>, level: NoticeLevel, visible_for: Duration) {
        let message = message.into();
        let mut timer = self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = timer.handle.take() {
            previous.abort();
        }
        timer.next_id += 1;
        let id = timer.next_id;

        debug!(id, %level, %message, "notice");
        self.inner.slot.send_replace(Some(Notice { id, message, level }));

        let inner = Arc::downgrade(&self.inner);
        timer.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(visible_for).await;
            if let Some(inner) = inner.upgrade() {
                inner
                    .slot
                    .send_if_modified(|current| match current {
                        Some(notice) if notice.id == id => {
                            *current = None;
                            true
                        }
                        _ => false,
                    });
            }
        }));
    }

    /// Clear the message now and cancel the pending timer.
    pub fn dismiss(&self) {
        let mut timer = self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
        self.inner.slot.send_replace(None);
    }

    /// The message on display right now, if any.
    pub fn current(&self) -> Option<Notice> {
        self.inner.slot.borrow().clone()
    }

    /// Watch the slot for changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.inner.slot.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NoticeTimings::default())
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl Drop for NotifierInner {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
    }
}
