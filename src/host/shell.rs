//! Page-level side effects: alerts, flash messages, notifications, redirects.

use std::cell::RefCell;

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::dom::NodeId;

/// Cancelable notifications emitted while handling a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Response,
    Error,
    Complete,
}

impl NotificationKind {
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Response => "ajax-page:response",
            Self::Error => "ajax-page:error",
            Self::Complete => "ajax-page:complete",
        }
    }
}

/// A notification targeted at the interacted element.
#[derive(Debug)]
pub struct Notification<'a> {
    pub kind: NotificationKind,
    /// Interacted element; `None` for history-driven requests.
    pub target: Option<NodeId>,
    pub response: &'a Value,
}

pub trait Shell {
    fn alert(&self, message: &str);
    fn flash(&self, message: &str);
    /// Returns whether a listener prevented the default handling.
    fn notify(&self, notification: &Notification<'_>) -> bool;
    fn layout_change(&self);
    /// Full-page navigation.
    fn redirect(&self, url: &str);
}

// ============================================================================
// RecordingShell
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Alert(String),
    Flash(String),
    Notify(NotificationKind),
    LayoutChange,
    Redirect(String),
}

/// Records every call; selected notification kinds can be prevented.
#[derive(Debug, Default)]
pub struct RecordingShell {
    events: RefCell<Vec<ShellEvent>>,
    prevented: RefCell<FxHashSet<NotificationKind>>,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `kind` notification report `prevent_default`.
    pub fn prevent(&self, kind: NotificationKind) {
        self.prevented.borrow_mut().insert(kind);
    }

    pub fn events(&self) -> Vec<ShellEvent> {
        self.events.borrow().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ShellEvent::Alert(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &ShellEvent) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: ShellEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Shell for RecordingShell {
    fn alert(&self, message: &str) {
        self.record(ShellEvent::Alert(message.to_string()));
    }

    fn flash(&self, message: &str) {
        self.record(ShellEvent::Flash(message.to_string()));
    }

    fn notify(&self, notification: &Notification<'_>) -> bool {
        self.record(ShellEvent::Notify(notification.kind));
        self.prevented.borrow().contains(&notification.kind)
    }

    fn layout_change(&self) {
        self.record(ShellEvent::LayoutChange);
    }

    fn redirect(&self, url: &str) {
        self.record(ShellEvent::Redirect(url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prevented_kinds() {
        let shell = RecordingShell::new();
        shell.prevent(NotificationKind::Error);
        let response = json!({});

        let notify = |kind| {
            shell.notify(&Notification {
                kind,
                target: None,
                response: &response,
            })
        };
        assert!(notify(NotificationKind::Error));
        assert!(!notify(NotificationKind::Complete));

        shell.alert("Boom");
        assert_eq!(shell.alerts(), ["Boom"]);
        assert_eq!(shell.count(&ShellEvent::Notify(NotificationKind::Error)), 1);
        assert_eq!(NotificationKind::Complete.event_name(), "ajax-page:complete");
    }
}
