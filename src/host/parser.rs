//! Fragment parsing.

use crate::dom::{Document, DomError, NodeId};

/// Parsed response markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFragment {
    /// Detached top-level nodes, in source order.
    pub nodes: Vec<NodeId>,
    /// Text of a `<title>` found in the markup (removed from `nodes`).
    pub title: Option<String>,
    /// Text of the first `<h1>`.
    pub heading: Option<String>,
}

/// Turns raw markup into detached nodes plus metadata.
pub trait FragmentParser {
    fn parse(&self, doc: &mut Document, html: &str) -> Result<ParsedFragment, DomError>;
}

/// `tl`-backed parser.
pub struct TlParser;

impl FragmentParser for TlParser {
    fn parse(&self, doc: &mut Document, html: &str) -> Result<ParsedFragment, DomError> {
        let mut nodes = doc.parse_fragment(html)?;

        let mut title = None;
        nodes.retain(|node| {
            if doc.tag(*node) == Some("title") {
                title.get_or_insert_with(|| doc.text_content(*node).trim().to_string());
                false
            } else {
                true
            }
        });

        let heading = nodes
            .iter()
            .flat_map(|node| std::iter::once(*node).chain(doc.descendants(*node)))
            .find(|node| doc.tag(*node) == Some("h1"))
            .map(|node| doc.text_content(node).trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(ParsedFragment {
            nodes,
            title: title.filter(|t| !t.is_empty()),
            heading,
        })
    }
}
