//! Port for transient, non-blocking notifications.
use std::time::Duration;

/// Shows a short message that disappears on its own.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show `message` for roughly `duration`.
    fn notify(&self, message: &str, duration: Duration);
}
