use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

impl Severity {
    /// Parses a severity label as sent by the server.
    ///
    /// Matching is case-insensitive and accepts the short forms the scheduler
    /// emits (`WARN`, `ERR`). Anything unrecognised is shown as `Info` so a new
    /// server-side severity never drops the message.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "error" | "err" | "fatal" => Severity::Error,
            "warning" | "warn" => Severity::Warning,
            "success" | "ok" => Severity::Success,
            _ => Severity::Info,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
            Severity::Success => "Success",
        }
    }

    /// CSS class used for the severity cell of a notification row.
    pub fn display_class(self) -> String {
        format!("severity-{}", self.label().to_ascii_lowercase())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Ordered list of diagnostics shown next to the diagram.
///
/// The log only reflects content. Whether its panel is shown is decided by the
/// controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Appends one entry. Repeats are kept.
    pub fn append(&mut self, notification: Notification) {
        self.entries.push(notification);
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<Notification> for NotificationLog {
    fn extend<T: IntoIterator<Item = Notification>>(&mut self, iter: T) {
        for notification in iter {
            self.append(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_labels_are_case_normalized() {
        assert_eq!(Severity::from_label("WARN"), Severity::Warning);
        assert_eq!(Severity::from_label("warning"), Severity::Warning);
        assert_eq!(Severity::from_label(" Error "), Severity::Error);
        assert_eq!(Severity::from_label("SUCCESS"), Severity::Success);
        assert_eq!(Severity::from_label("INFO"), Severity::Info);
        assert_eq!(Severity::from_label("debug"), Severity::Info);
        assert_eq!(Severity::Warning.display_class(), "severity-warning");
    }

    #[test]
    fn log_keeps_duplicates_in_arrival_order() {
        let mut log = NotificationLog::new();
        log.append(Notification::new(Severity::Info, "b"));
        log.append(Notification::new(Severity::Error, "a"));
        log.append(Notification::new(Severity::Info, "b"));

        let messages: Vec<_> = log.entries().iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "a", "b"]);

        log.clear();
        assert!(log.is_empty());
    }
}
