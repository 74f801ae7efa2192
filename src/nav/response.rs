//! Shape of a navigation response.
//!
//! ```json
//! {
//!   "html": { "content": "<div>..</div>", "title": "Thread", "h1": "Thread" },
//!   "errorHtml": "<div class=\"blockMessage\">..</div>",
//!   "errors": ["Field required"],
//!   "exception": "Boom",
//!   "redirect": "https://forum.test/threads/1/",
//!   "message": "Saved."
//! }
//! ```
//!
//! Every key is optional. Empty strings count as absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Response {
    pub html: Option<HtmlPayload>,
    pub error_html: Option<HtmlPayload>,
    pub errors: Option<ErrorList>,
    #[serde(deserialize_with = "non_empty")]
    pub exception: Option<String>,
    #[serde(deserialize_with = "non_empty")]
    pub redirect: Option<String>,
    #[serde(deserialize_with = "non_empty")]
    pub message: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Markup plus optional container metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HtmlPayload {
    Markup(String),
    Container {
        #[serde(default)]
        content: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        h1: Option<String>,
    },
}

impl HtmlPayload {
    pub fn content(&self) -> &str {
        match self {
            Self::Markup(content) | Self::Container { content, .. } => content,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Container { title, .. } => title.as_deref().filter(|t| !t.is_empty()),
            Self::Markup(_) => None,
        }
    }

    pub fn heading(&self) -> Option<&str> {
        match self {
            Self::Container { h1, .. } => h1.as_deref().filter(|t| !t.is_empty()),
            Self::Markup(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content().trim().is_empty()
    }
}

/// Server-reported errors: one message, a list, or messages keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorList {
    One(String),
    Many(Vec<String>),
    Fields(BTreeMap<String, String>),
}

impl ErrorList {
    /// Messages joined by newlines.
    pub fn joined(&self) -> String {
        match self {
            Self::One(message) => message.clone(),
            Self::Many(messages) => messages.join("\n"),
            Self::Fields(fields) => fields.values().cloned().collect::<Vec<_>>().join("\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(message) => message.is_empty(),
            Self::Many(messages) => messages.is_empty(),
            Self::Fields(fields) => fields.is_empty(),
        }
    }
}

impl Response {
    pub fn html(&self) -> Option<&HtmlPayload> {
        self.html.as_ref().filter(|h| !h.is_empty())
    }

    pub fn error_html(&self) -> Option<&HtmlPayload> {
        self.error_html.as_ref().filter(|h| !h.is_empty())
    }

    pub fn errors(&self) -> Option<&ErrorList> {
        self.errors.as_ref().filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_html_shapes() {
        let plain = parse(json!({"html": "<div>x</div>"}));
        assert_eq!(plain.html().unwrap().content(), "<div>x</div>");
        assert_eq!(plain.html().unwrap().title(), None);

        let container = parse(json!({"html": {"content": "<p/>", "title": "T", "h1": "H"}}));
        let html = container.html().unwrap();
        assert_eq!(html.title(), Some("T"));
        assert_eq!(html.heading(), Some("H"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let r = parse(json!({"html": "", "exception": "", "redirect": null, "errorHtml": {"content": " "}}));
        assert!(r.html().is_none());
        assert!(r.error_html().is_none());
        assert!(r.exception.is_none());
        assert!(r.redirect.is_none());
        assert_eq!(parse(json!({})), Response::default());
    }

    #[test]
    fn test_error_list_shapes() {
        let r = parse(json!({"errors": ["a", "b"]}));
        assert_eq!(r.errors().unwrap().joined(), "a\nb");
        let r = parse(json!({"errors": {"title": "Title required", "body": "Too short"}}));
        assert_eq!(r.errors().unwrap().joined(), "Too short\nTitle required");
        let r = parse(json!({"errors": "Nope"}));
        assert_eq!(r.errors().unwrap().joined(), "Nope");
        assert!(parse(json!({"errors": []})).errors().is_none());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let r = parse(json!({"exception": "Boom", "status": "error", "visitor": {"id": 1}}));
        assert_eq!(r.exception.as_deref(), Some("Boom"));
    }
}
