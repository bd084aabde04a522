use chrono::{Duration, Utc};
use std::{collections::VecDeque, sync::Mutex};
use uuid::Uuid;

use crate::models::{Notification, NotificationLevel};

/// NotificationCenter
///
/// Toast queue behind the page frame's notification area. Bounded: pushing
/// past `capacity` evicts the oldest toast. Toasts older than `ttl` are
/// pruned whenever the queue is read.
pub struct NotificationCenter {
    queue: Mutex<VecDeque<Notification>>,
    capacity: usize,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Queues a toast and returns its id.
    pub fn push(&self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        let id = notification.id;

        let mut queue = self.lock();
        while queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(notification);

        id
    }

    /// Live toasts, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        let mut queue = self.lock();

        // A TTL reaching past the earliest representable time keeps everything.
        if let Some(cutoff) = Utc::now().checked_sub_signed(self.ttl) {
            queue.retain(|notification| notification.created_at > cutoff);
        }

        queue.iter().cloned().collect()
    }

    /// Removes one toast. Returns false if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut queue = self.lock();
        let before = queue.len();
        queue.retain(|notification| notification.id != id);
        queue.len() != before
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the queue half-updated.
    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
