//! Overlay presentation.

use crate::dom::{Document, NodeId};

/// Content shown in a modal overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub content: Vec<NodeId>,
}

pub trait OverlayPresenter {
    /// Show an overlay, returning its root node.
    fn present(&self, doc: &mut Document, overlay: Overlay) -> NodeId;
    fn hide(&self, doc: &mut Document, overlay: NodeId);
}

/// Appends `<div class="overlay">` containers to `<body>`.
///
/// ```text
/// <div class="overlay">
///   <div class="overlay-title">{title}</div>
///   <div class="overlay-content">{content}</div>
/// </div>
/// ```
pub struct DomOverlay;

impl OverlayPresenter for DomOverlay {
    fn present(&self, doc: &mut Document, overlay: Overlay) -> NodeId {
        let root = doc.create_element("div");
        doc.set_attr(root, "class", "overlay");

        let title = doc.create_element("div");
        doc.set_attr(title, "class", "overlay-title");
        doc.set_text_content(title, &overlay.title);
        doc.append_child(root, title);

        let content = doc.create_element("div");
        doc.set_attr(content, "class", "overlay-content");
        for node in overlay.content {
            doc.append_child(content, node);
        }
        doc.append_child(root, content);

        let body = doc.ensure_body();
        doc.append_child(body, root);
        root
    }

    fn hide(&self, doc: &mut Document, overlay: NodeId) {
        doc.hide(overlay);
    }
}
