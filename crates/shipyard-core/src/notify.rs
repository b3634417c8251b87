//! Notification contract. The core reports outcomes through this seam; the
//! composition root decides how they reach the user.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

pub trait Notifier {
    fn notify(&self, title: &str, body: &str, severity: Severity);
}

/// Collects notifications instead of displaying them. Test helper.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub entries: std::cell::RefCell<Vec<(String, String, Severity)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str, severity: Severity) {
        self.entries
            .borrow_mut()
            .push((title.to_string(), body.to_string(), severity));
    }
}
