//! Transient notifications ("toasts").
//!
//! There is a single slot: showing a notification replaces whatever was visible. A visible
//! notification hides itself once its timeout has elapsed, checked through [`Notifier::tick`].

use std::fmt;
use std::time::{Duration, Instant};

/// Default time a notification stays visible.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
}

impl Notification {
    fn hidden() -> Self {
        Notification {
            message: String::new(),
            severity: Severity::Info,
            visible: false,
        }
    }
}

/// The notification slot of one view.
#[derive(Debug, Clone)]
pub struct Notifier {
    current: Notification,
    shown_at: Option<Instant>,
    timeout: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new(DEFAULT_TIMEOUT)
    }
}

impl Notifier {
    pub fn new(timeout: Duration) -> Self {
        Notifier {
            current: Notification::hidden(),
            shown_at: None,
            timeout,
        }
    }

    /// Shows `message`, replacing any visible notification.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(message, severity, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        self.current = Notification {
            message: message.into(),
            severity,
            visible: true,
        };
        self.shown_at = Some(now);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Error);
    }

    /// Hides the notification. The message is kept so a fading view can still draw it.
    pub fn dismiss(&mut self) {
        self.current.visible = false;
        self.shown_at = None;
    }

    /// Hides the notification if its timeout has elapsed at `now`. Returns `true` if it was
    /// hidden by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.shown_at {
            Some(shown) if now.saturating_duration_since(shown) >= self.timeout => {
                self.dismiss();
                true
            }
            _ => false,
        }
    }

    /// The visible notification, if any.
    pub fn visible(&self) -> Option<&Notification> {
        self.current.visible.then_some(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden() {
        let notifier = Notifier::default();
        assert!(notifier.visible().is_none());
    }

    #[test]
    fn new_notification_replaces_the_old_one() {
        let mut notifier = Notifier::default();
        notifier.success("QR code generated successfully!");
        notifier.error("Failed to copy URL");

        let visible = notifier.visible().unwrap();
        assert_eq!(visible.message, "Failed to copy URL");
        assert_eq!(visible.severity, Severity::Error);
    }

    #[test]
    fn manual_dismiss() {
        let mut notifier = Notifier::default();
        notifier.show("hello", Severity::Info);
        notifier.dismiss();
        assert!(notifier.visible().is_none());
        assert_eq!(notifier.current.message, "hello");
    }

    #[test]
    fn auto_dismiss_after_timeout() {
        let mut notifier = Notifier::new(Duration::from_millis(3000));
        let start = Instant::now();
        notifier.show_at("saved", Severity::Success, start);

        assert!(!notifier.tick(start + Duration::from_millis(2999)));
        assert!(notifier.visible().is_some());
        assert!(notifier.tick(start + Duration::from_millis(3000)));
        assert!(notifier.visible().is_none());
        // nothing left to hide
        assert!(!notifier.tick(start + Duration::from_millis(9000)));
    }

    #[test]
    fn replacing_restarts_the_timer() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        let start = Instant::now();
        notifier.show_at("first", Severity::Info, start);
        notifier.show_at("second", Severity::Info, start + Duration::from_secs(2));

        assert!(!notifier.tick(start + Duration::from_secs(4)));
        assert!(notifier.tick(start + Duration::from_secs(5)));
    }
}
