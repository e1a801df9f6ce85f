//! Single-slot transient notification channel.
//!
//! # Design
//! - Exactly one visible message; each `raise` supersedes the previous one.
//! - Expiry runs as a cancellable task keyed by the message id, so a late
//!   timer can never clear a newer message.
//! - Display consumers observe changes through a `watch` receiver.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An upload was accepted.
    Success,
    /// A submission was rejected.
    Error,
}

impl NotificationKind {
    /// `success` or `error`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Auto-clear delays per notification kind, measured from the raise call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationWindows {
    /// Visible time for success messages.
    pub success: Duration,
    /// Visible time for error messages.
    pub error: Duration,
}

impl NotificationWindows {
    /// Window for the given kind.
    #[must_use]
    pub const fn for_kind(&self, kind: NotificationKind) -> Duration {
        match kind {
            NotificationKind::Success => self.success,
            NotificationKind::Error => self.error,
        }
    }
}

impl Default for NotificationWindows {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(3_000),
            error: Duration::from_millis(5_000),
        }
    }
}

/// The currently visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Monotonic identifier; later raises have larger ids.
    pub id: u64,
    /// Severity.
    pub kind: NotificationKind,
    /// Display text.
    pub message: String,
    /// How long after raising the message clears itself.
    pub expires_after: Duration,
}

/// Process-scoped notification slot. Clones share the same slot.
#[derive(Clone)]
pub struct NotificationChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    windows: NotificationWindows,
    sender: watch::Sender<Option<Notification>>,
    control: Mutex<Control>,
}

struct Control {
    next_id: u64,
    expiry: Option<JoinHandle<()>>,
}

impl NotificationChannel {
    /// Empty channel with the given windows.
    #[must_use]
    pub fn new(windows: NotificationWindows) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            inner: Arc::new(ChannelInner {
                windows,
                sender,
                control: Mutex::new(Control {
                    next_id: 1,
                    expiry: None,
                }),
            }),
        }
    }

    /// Configured windows.
    #[must_use]
    pub fn windows(&self) -> NotificationWindows {
        self.inner.windows
    }

    /// Replace the visible message and schedule its expiry. Returns the new id.
    ///
    /// Any pending expiry from an earlier message is cancelled. Outside a Tokio
    /// runtime the message is shown but never auto-clears.
    pub fn raise(&self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        let mut control = self.inner.lock_control();
        let id = control.next_id;
        control.next_id = control.next_id.saturating_add(1);
        if let Some(previous) = control.expiry.take() {
            previous.abort();
        }

        let expires_after = self.inner.windows.for_kind(kind);
        self.inner.sender.send_replace(Some(Notification {
            id,
            kind,
            message: message.into(),
            expires_after,
        }));
        debug!(id, kind = kind.as_str(), "notification raised");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let slot = Arc::downgrade(&self.inner);
                control.expiry = Some(handle.spawn(expire_after(slot, id, expires_after)));
            }
            Err(_) => warn!(id, "no runtime available; notification will not auto-clear"),
        }
        id
    }

    /// Close the message with `id` early. Stale ids are ignored.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut control = self.inner.lock_control();
        let cleared = self.inner.clear_if_current(id);
        if cleared {
            if let Some(expiry) = control.expiry.take() {
                expiry.abort();
            }
        }
        cleared
    }

    /// Snapshot of the visible message, if any.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.inner.sender.borrow().clone()
    }

    /// Receiver that observes every replace and clear.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.sender.subscribe()
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(NotificationWindows::default())
    }
}

impl ChannelInner {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn clear_if_current(&self, id: u64) -> bool {
        self.sender.send_if_modified(|current| {
            if current.as_ref().is_some_and(|visible| visible.id == id) {
                *current = None;
                true
            } else {
                false
            }
        })
    }
}

async fn expire_after(slot: Weak<ChannelInner>, id: u64, delay: Duration) {
    tokio::time::sleep(delay).await;
    if let Some(inner) = slot.upgrade() {
        if inner.clear_if_current(id) {
            debug!(id, "notification expired");
        }
    }
}
