//! Queueing notifier for pull-style hosts.

use parking_lot::RwLock;

use crate::domain::Notification;
use crate::ports::NotifierPort;

/// Notifier that queues notifications until the host collects them.
///
/// Hosts that poll (an editor extension host, a UI refresh loop) call
/// [`take_pending`](Self::take_pending) between ticks.
#[derive(Default)]
pub struct CollectingNotifier {
    pending: RwLock<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get and clear pending notifications.
    pub fn take_pending(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.pending.write())
    }

    /// Check if there are pending notifications.
    pub fn has_pending(&self) -> bool {
        !self.pending.read().is_empty()
    }
}

impl NotifierPort for CollectingNotifier {
    async fn notify(&self, notification: &Notification) {
        self.pending.write().push(notification.clone());
    }
}
