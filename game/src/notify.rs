//! Outbound notification sinks

use bridge::Broadcaster;
use shared::Notification;

/// Receives score and game-over notifications from the session.
///
/// Implementations must return promptly; the session calls this from inside
/// a frame.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl Notifier for Broadcaster {
    fn notify(&mut self, notification: Notification) {
        self.broadcast(&notification);
    }
}

/// Records notifications in order.
impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}
