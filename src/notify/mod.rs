use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
    pub created_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= NOTIFICATION_TTL
    }
}

#[derive(Default)]
struct Inner {
    queue: Vec<Notification>,
    next_id: u64,
    last_seen: u64,
}

/// Shared handle to the transient notification queue.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<Mutex<Inner>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&self, level: Level, message: String) {
        match level {
            Level::Success => log::info!("notify: {}", message),
            Level::Error => log::warn!("notify: {}", message),
        }
        let Ok(mut inner) = self.inner.lock() else {
            log::error!("Notification queue lock poisoned, dropping: {}", message);
            return;
        };
        inner.next_id += 1;
        let id = inner.next_id;
        inner.queue.push(Notification { id, level, message, created_at: Instant::now() });
    }

    /// Notifications still on screen. Expired ones are dropped.
    pub fn visible(&self) -> Vec<Notification> {
        let Ok(mut inner) = self.inner.lock() else {
            return Vec::new();
        };
        let now = Instant::now();
        inner.queue.retain(|n| !n.is_expired(now));
        inner.queue.clone()
    }

    /// Visible notifications that have not been handed out yet.
    pub fn take_unseen(&self) -> Vec<Notification> {
        let visible = self.visible();
        let Ok(mut inner) = self.inner.lock() else {
            return Vec::new();
        };
        let unseen: Vec<_> = visible.into_iter().filter(|n| n.id > inner.last_seen).collect();
        if let Some(last) = unseen.last() {
            inner.last_seen = last.id;
        }
        unseen
    }
}
