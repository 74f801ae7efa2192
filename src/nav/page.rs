//! Page numbers: inference from pager links, URL templates, jump input.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId, Selector};

/// Characters `encodeURIComponent` leaves alone besides alphanumerics.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A page as far as the controller knows it.
///
/// Pages inferred from link text are not validated, so a page can be any
/// text; it is substituted into the URL as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRef {
    Number(i64),
    Text(String),
}

impl Default for PageRef {
    fn default() -> Self {
        Self::Number(1)
    }
}

impl PageRef {
    /// Numeric value, if the page is or spells an integer.
    pub fn number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// `page + delta`; non-numeric pages become `NaN`.
    pub fn offset(&self, delta: i64) -> Self {
        match self.number() {
            Some(n) => Self::Number(n.saturating_add(delta)),
            None => Self::Text("NaN".into()),
        }
    }

    fn from_attr(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(n) if n.to_string() == value => Self::Number(n),
            _ => Self::Text(value.to_string()),
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Target page of a clicked pager.
///
/// `data-page` (non-empty, non-zero) wins, then the next/prev roles relative
/// to `current`, then the link's trimmed text.
pub fn infer_page(
    doc: &Document,
    element: NodeId,
    current: &PageRef,
    next: Option<&Selector>,
    prev: Option<&Selector>,
) -> PageRef {
    if let Some(value) = doc.attr(element, "data-page").map(str::trim)
        && !value.is_empty()
        && value.parse::<f64>().map_or(true, |n| n != 0.0)
    {
        return PageRef::from_attr(value);
    }
    if next.is_some_and(|sel| doc.matches(element, sel)) {
        return current.offset(1);
    }
    if prev.is_some_and(|sel| doc.matches(element, sel)) {
        return current.offset(-1);
    }
    PageRef::Text(doc.text_content(element).trim().to_string())
}

/// Substitute `page` for the first `sentinel` in `template`.
///
/// Falls back to the percent-encoded sentinel (`%25page%25`), then to the
/// template unchanged.
pub fn build_url(template: &str, sentinel: &str, page: &PageRef) -> String {
    if sentinel.is_empty() {
        return template.to_string();
    }
    let page = page.to_string();
    if template.contains(sentinel) {
        return template.replacen(sentinel, &page, 1);
    }
    let encoded = utf8_percent_encode(sentinel, COMPONENT).to_string();
    if template.contains(&encoded) {
        return template.replacen(&encoded, &page, 1);
    }
    template.to_string()
}

/// Leading integer of `input`, like JavaScript's `parseInt(input, 10)`.
pub fn parse_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value = digits[..len]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if negative { -value } else { value })
}

/// Page requested through the jump field, clamped to at least 1.
pub fn jump_page(input: &str) -> i64 {
    parse_int(input).map_or(1, |page| page.max(1))
}
