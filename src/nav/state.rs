//! Navigation state and the history entries that carry it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::page::PageRef;

/// Page and URL the controller currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub page: PageRef,
    pub href: String,
}

/// State object stored with each pushed history entry.
///
/// `title` and `snapshot` are only recorded in snapshot mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    pub page: PageRef,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Serialized replacement nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

impl HistoryEntry {
    pub fn new(state: &NavigationState) -> Self {
        Self {
            page: state.page.clone(),
            href: state.href.clone(),
            title: None,
            snapshot: None,
        }
    }

    pub fn state(&self) -> NavigationState {
        NavigationState {
            page: self.page.clone(),
            href: self.href.clone(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Entry stored in a history state, if it is one of ours.
    pub fn from_value(value: &Value) -> Option<Self> {
        let entry: Self = serde_json::from_value(value.clone()).ok()?;
        (!entry.href.is_empty()).then_some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_value_shape() {
        let entry = HistoryEntry::new(&NavigationState {
            page: PageRef::Number(2),
            href: "https://forum.test/t/1/page-2".into(),
        });
        assert_eq!(
            entry.to_value(),
            json!({"page": 2, "href": "https://forum.test/t/1/page-2"})
        );

        let full = HistoryEntry {
            title: Some("Thread - Page 2".into()),
            snapshot: Some("<div>2</div>".into()),
            ..entry
        };
        assert_eq!(HistoryEntry::from_value(&full.to_value()), Some(full));
    }

    #[test]
    fn test_foreign_state_rejected() {
        assert_eq!(HistoryEntry::from_value(&Value::Null), None);
        assert_eq!(HistoryEntry::from_value(&json!({"scroll": 40})), None);
        assert_eq!(HistoryEntry::from_value(&json!("x")), None);
    }
}
