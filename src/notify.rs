use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A transient, auto-dismissing message to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Live notifications. Each is removed after `ttl` by a dismiss timer.
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    next_id: u64,
    live: Vec<Notification>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 0,
            live: Vec::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn raise(&mut self, level: Level, message: impl Into<String>) -> Notification {
        self.next_id += 1;
        let note = Notification {
            id: self.next_id,
            level,
            message: message.into(),
            raised_at: Utc::now(),
        };
        self.live.push(note.clone());
        note
    }

    /// Remove a notification. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.live.len();
        self.live.retain(|n| n.id != id);
        self.live.len() != before
    }

    pub fn live(&self) -> &[Notification] {
        &self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_and_dismiss() {
        let mut notifier = Notifier::new(Duration::from_secs(4));
        let a = notifier.raise(Level::Error, "positions failed to load");
        let b = notifier.raise(Level::Info, "looking up wallet");
        assert_ne!(a.id, b.id);
        assert_eq!(notifier.live().len(), 2);

        assert!(notifier.dismiss(a.id));
        assert!(!notifier.dismiss(a.id));
        assert_eq!(notifier.live(), &[b]);
    }
}
