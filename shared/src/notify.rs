// shared/src/notify.rs
//
// Ordered, time-expiring set of user-visible messages. One instance is owned
// by the UI root and handed to whoever needs to raise a toast.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TTL_MS: i64 = 5_000;

pub type NotificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub created_ms: i64,
    /// `None` stays until dismissed.
    pub expires_ms: Option<i64>,
}

impl Notification {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_ms.is_some_and(|t| now_ms >= t)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    next_id: NotificationId,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now_ms: i64,
    ) -> NotificationId {
        self.show_for(kind, message, DEFAULT_TTL_MS, now_ms)
    }

    /// Show a message for `ttl_ms`; a ttl of zero or less keeps it until dismissed.
    pub fn show_for(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        ttl_ms: i64,
        now_ms: i64,
    ) -> NotificationId {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Notification {
            id,
            kind,
            message: message.into(),
            created_ms: now_ms,
            expires_ms: (ttl_ms > 0).then(|| now_ms.saturating_add(ttl_ms)),
        });
        id
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Live notifications, oldest first.
    pub fn list(&self, now_ms: i64) -> Vec<Notification> {
        self.items
            .iter()
            .filter(|n| !n.is_expired(now_ms))
            .cloned()
            .collect()
    }

    /// Drop expired notifications, returning how many were removed.
    pub fn prune(&mut self, now_ms: i64) -> usize {
        let before = self.items.len();
        self.items.retain(|n| !n.is_expired(now_ms));
        before - self.items.len()
    }

    /// Stored notifications, expired ones included until the next `prune`.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_ordered_and_hides_expired() {
        let mut c = NotificationCenter::new();
        let a = c.show(NotificationKind::Info, "saved", 0);
        let b = c.show_for(NotificationKind::Error, "failed", 1_000, 10);
        let ids: Vec<_> = c.list(500).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b]);

        let ids: Vec<_> = c.list(1_010).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a]);
        assert!(c.list(DEFAULT_TTL_MS).is_empty());
    }

    #[test]
    fn sticky_notifications_survive_prune() {
        let mut c = NotificationCenter::new();
        c.show_for(NotificationKind::Warning, "check credentials", 0, 0);
        c.show(NotificationKind::Success, "ok", 0);
        assert_eq!(c.len(), 2);
        assert_eq!(c.prune(i64::MAX), 1);
        assert_eq!(c.list(i64::MAX).len(), 1);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn dismiss_removes_once() {
        let mut c = NotificationCenter::new();
        let id = c.show(NotificationKind::Info, "hello", 0);
        assert!(c.dismiss(id));
        assert!(!c.dismiss(id));
        assert!(c.is_empty());
    }
}
