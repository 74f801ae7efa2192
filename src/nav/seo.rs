//! `<link rel="canonical|prev|next">` upkeep.
//!
//! Each link is tracked by node; a link is created in `<head>` on first use
//! and detached (but kept for reuse) when its target goes away.

use crate::dom::{Document, NodeId, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rel {
    Canonical,
    Prev,
    Next,
}

impl Rel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Prev => "prev",
            Self::Next => "next",
        }
    }
}

/// Hrefs of the three links as currently connected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoSnapshot {
    pub canonical: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SeoLinks {
    canonical: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl SeoLinks {
    /// Pick up links already present in `<head>`.
    pub fn adopt(doc: &Document) -> Self {
        let find = |rel: Rel| {
            let head = doc.head()?;
            let selector = Selector::parse(&format!("link[rel=\"{}\"]", rel.as_str())).ok()?;
            doc.find(&[head], &selector).into_iter().next()
        };
        Self {
            canonical: find(Rel::Canonical),
            prev: find(Rel::Prev),
            next: find(Rel::Next),
        }
    }

    /// Point canonical at `href` and prev/next at the given targets.
    ///
    /// Idempotent: repeating a call leaves the document unchanged.
    pub fn sync(&mut self, doc: &mut Document, href: &str, prev: Option<&str>, next: Option<&str>) {
        self.set(doc, Rel::Canonical, Some(href));
        self.set(doc, Rel::Prev, prev);
        self.set(doc, Rel::Next, next);
    }

    fn slot(&mut self, rel: Rel) -> &mut Option<NodeId> {
        match rel {
            Rel::Canonical => &mut self.canonical,
            Rel::Prev => &mut self.prev,
            Rel::Next => &mut self.next,
        }
    }

    fn set(&mut self, doc: &mut Document, rel: Rel, href: Option<&str>) {
        let Some(href) = href else {
            if let Some(node) = *self.slot(rel) {
                doc.detach(node);
            }
            return;
        };

        let node = match *self.slot(rel) {
            Some(node) => node,
            None => {
                let node = doc.create_element("link");
                doc.set_attr(node, "rel", rel.as_str());
                *self.slot(rel) = Some(node);
                node
            }
        };
        doc.set_attr(node, "href", href);
        if !doc.is_connected(node) {
            let head = doc.ensure_head();
            doc.append_child(head, node);
        }
    }

    pub fn canonical(&self) -> Option<NodeId> {
        self.canonical
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn snapshot(&self, doc: &Document) -> SeoSnapshot {
        let href = |node: Option<NodeId>| {
            node.filter(|n| doc.is_connected(*n))
                .and_then(|n| doc.attr(n, "href"))
                .map(str::to_string)
        };
        SeoSnapshot {
            canonical: href(self.canonical),
            prev: href(self.prev),
            next: href(self.next),
        }
    }
}
