//! Markup to arena nodes via `tl`.
//!
//! Whitespace-only text is dropped between top-level nodes but kept inside
//! elements, where it separates inline content. Entity references in text and
//! attribute values are decoded, and a leading doctype is skipped.

use super::markup::unescape;
use super::{Document, DomError, NodeId};

/// Parse markup into detached top-level nodes.
pub(super) fn parse_nodes(doc: &mut Document, html: &str) -> Result<Vec<NodeId>, DomError> {
    let html = strip_doctype(html);
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| DomError::Parse(format!("{e:?}")))?;
    let parser = dom.parser();

    Ok(dom
        .children()
        .iter()
        .filter_map(|handle| convert(doc, *handle, parser, false))
        .collect())
}

fn convert(
    doc: &mut Document,
    handle: tl::NodeHandle,
    parser: &tl::Parser,
    keep_blank: bool,
) -> Option<NodeId> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();
            let id = doc.create_element(&name);

            let attrs = tag.attributes();
            for (key, value) in attrs.iter() {
                let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                doc.set_attr(id, &key, &value);
            }
            // `id` and `class` live in dedicated slots
            if let Some(value) = attrs.id() {
                doc.set_attr(id, "id", &unescape(&value.as_utf8_str()));
            }
            if let Some(value) = attrs.class() {
                doc.set_attr(id, "class", &unescape(&value.as_utf8_str()));
            }

            for child in tag.children().top().iter() {
                if let Some(node) = convert(doc, *child, parser, true) {
                    doc.append_child(id, node);
                }
            }
            Some(id)
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            if !keep_blank && text.trim().is_empty() {
                return None;
            }
            Some(doc.create_text(&unescape(&text)))
        }
        tl::Node::Comment(bytes) => {
            let text = bytes.as_utf8_str();
            let inner = text
                .trim_start_matches("<!--")
                .trim_end_matches("-->")
                .to_string();
            Some(doc.create_comment(&inner))
        }
    }
}

fn strip_doctype(html: &str) -> &str {
    let trimmed = html.trim_start();
    if trimmed
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
        && let Some(end) = trimmed.find('>')
    {
        return &trimmed[end + 1..];
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{NodeKind, Selector};

    #[test]
    fn test_fragment_top_level_nodes() {
        let mut doc = Document::new();
        let nodes = doc
            .parse_fragment(r#"<div class="a">1</div>  <div class="b">2</div>"#)
            .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.attr(nodes[0], "class"), Some("a"));
        assert_eq!(doc.attr(nodes[1], "class"), Some("b"));
    }

    #[test]
    fn test_inline_whitespace_kept() {
        let mut doc = Document::new();
        let html = "<p><b>a</b> <b>b</b></p>";
        let nodes = doc.parse_fragment(html).unwrap();
        assert_eq!(doc.text_content(nodes[0]), "a b");
        assert_eq!(doc.outer_html(nodes[0]), html);
    }

    #[test]
    fn test_doctype_is_skipped() {
        let doc = Document::parse("<!DOCTYPE html><html><head><title>T</title></head></html>").unwrap();
        assert_eq!(doc.title(), "T");
    }

    #[test]
    fn test_entities_decoded() {
        let mut doc = Document::new();
        let nodes = doc
            .parse_fragment(r#"<a href="/t?a=1&amp;b=2" id="x">Next &gt;</a>"#)
            .unwrap();
        assert_eq!(doc.attr(nodes[0], "href"), Some("/t?a=1&b=2"));
        assert_eq!(doc.attr(nodes[0], "id"), Some("x"));
        assert_eq!(doc.text_content(nodes[0]), "Next >");
    }

    #[test]
    fn test_boolean_attribute() {
        let doc = Document::parse(r#"<input disabled type="submit"/>"#).unwrap();
        let input = doc.query_selector(&Selector::parse("input").unwrap()).unwrap();
        assert!(doc.is_disabled(input));
        assert!(matches!(doc.kind(input), NodeKind::Element(_)));
    }
}
