//! Notifier that prints to stdout.

use ede_core::ports::NotifierPort;
use ede_core::Notification;
use tracing::warn;

/// Prints one line per notification: the message, or a JSON object.
pub struct ConsoleNotifier {
    json: bool,
}

impl ConsoleNotifier {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl NotifierPort for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) {
        if !self.json {
            println!("{}", notification.message());
            return;
        }

        match serde_json::to_string(notification) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(port = notification.port, error = %e, "failed to encode notification"),
        }
    }
}
