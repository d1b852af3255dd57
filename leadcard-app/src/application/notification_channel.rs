use crate::domain::Notification;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(2000);

/// Single-slot transient message holder with auto-dismiss.
///
/// Cloning is cheap and every clone refers to the same slot.
#[derive(Clone)]
pub struct NotificationChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    sender: watch::Sender<Notification>,
    timer: Mutex<TimerSlot>,
}

#[derive(Default)]
struct TimerSlot {
    last_id: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl NotificationChannel {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Notification::default());
        Self {
            inner: Arc::new(ChannelInner {
                sender,
                timer: Mutex::new(TimerSlot::default()),
            }),
        }
    }

    /// Shows `text`, replacing whatever was there, and arms a fresh dismiss
    /// timer. Returns the id of the new notification.
    pub fn post(&self, text: impl Into<String>) -> u64 {
        let mut slot = self.timer_slot();
        slot.cancel();
        slot.last_id += 1;
        let id = slot.last_id;

        self.inner
            .sender
            .send_replace(Notification::shown(id, text.into()));
        slot.handle = self.spawn_dismiss_timer(id);
        id
    }

    /// Hides the current notification now and drops its pending timer.
    pub fn dismiss(&self) {
        let mut slot = self.timer_slot();
        slot.cancel();
        self.inner.sender.send_if_modified(hide);
    }

    pub fn current(&self) -> Notification {
        self.inner.sender.borrow().clone()
    }

    /// Watch handle for a display surface.
    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.inner.sender.subscribe()
    }

    fn spawn_dismiss_timer(&self, id: u64) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("No async runtime, notification {} stays until dismissed", id);
            return None;
        };

        let weak: Weak<ChannelInner> = Arc::downgrade(&self.inner);
        Some(runtime.spawn(async move {
            tokio::time::sleep(NOTIFICATION_TIMEOUT).await;
            if let Some(inner) = weak.upgrade() {
                // A newer post owns the slot if the id moved on.
                inner
                    .sender
                    .send_if_modified(|current| current.id == id && hide(current));
            }
        }))
    }

    fn timer_slot(&self) -> MutexGuard<'_, TimerSlot> {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

fn hide(notification: &mut Notification) -> bool {
    if notification.visible {
        notification.visible = false;
        true
    } else {
        false
    }
}
