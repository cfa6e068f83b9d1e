//! Notifier port (interface).

use crate::domain::Notification;

/// Port for alerting the user about newly opened ports.
///
/// Called exactly once per `Opened` transition.
pub trait NotifierPort: Send + Sync {
    fn notify(&self, notification: &Notification) -> impl std::future::Future<Output = ()> + Send;
}
