//! User-visible notification channel.
//!
//! Every mutation in the identity, catalog, and enrollment stores reports its
//! outcome here as a short title + description. This is the sole user-facing
//! error surface; consumers (the CLI, a future UI shell) subscribe and render
//! notifications however they like.

use tokio::sync::broadcast;

/// Default buffer size for the notification channel.
const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// Whether a notification reports a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A short user-visible message describing a mutation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    /// Returns true if this notification reports a failure.
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Broadcast fan-out of notifications to any number of subscribers.
///
/// Cloning shares the underlying channel. Sending with no live subscribers is
/// not an error; the notification is simply dropped.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Create a new notifier with the default buffer capacity.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to notifications. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Report a successful mutation.
    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.send(NotificationKind::Success, title.into(), description.into());
    }

    /// Report a failed mutation or precondition.
    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.send(NotificationKind::Error, title.into(), description.into());
    }

    fn send(&self, kind: NotificationKind, title: String, description: String) {
        tracing::debug!(?kind, title = %title, "notification");
        let _ = self.tx.send(Notification {
            kind,
            title,
            description,
        });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_notification() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("Enrolled successfully", "You can now access the course content!");

        let n = rx.try_recv().unwrap();
        assert_eq!(n.kind, NotificationKind::Success);
        assert_eq!(n.title, "Enrolled successfully");
        assert!(!n.is_error());
    }

    #[test]
    fn test_error_notification_is_error() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.error("Error signing in", "Invalid credentials");

        let n = rx.try_recv().unwrap();
        assert!(n.is_error());
        assert_eq!(n.description, "Invalid credentials");
    }

    #[test]
    fn test_send_without_subscribers_does_not_panic() {
        let notifier = Notifier::new();
        notifier.success("ok", "nothing listening");
    }

    #[test]
    fn test_multiple_subscribers_all_receive() {
        let notifier = Notifier::new();
        let mut rx1 = notifier.subscribe();
        let mut rx2 = notifier.subscribe();

        notifier.error("Already enrolled", "You are already enrolled in this course.");

        assert_eq!(rx1.try_recv().unwrap().title, "Already enrolled");
        assert_eq!(rx2.try_recv().unwrap().title, "Already enrolled");
    }
}
