//! Browser window model: document, location, session history, events.
//!
//! Everything lives on one thread. Listeners are invoked with no borrow of
//! the window held, so a handler may freely mutate the document, bind or
//! unbind listeners, or push history.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::dom::{Document, DomError, NodeId};

/// Failure to load a page into a window.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid page URL: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Events
// ============================================================================

/// A dispatched click.
#[derive(Debug)]
pub struct ClickEvent {
    target: NodeId,
    current: Cell<NodeId>,
    prevented: Cell<bool>,
}

impl ClickEvent {
    /// Element originally clicked.
    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Element whose listener is running.
    #[inline]
    pub fn current_target(&self) -> NodeId {
        self.current.get()
    }

    pub fn prevent_default(&self) {
        self.prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.prevented.get()
    }
}

/// Back/forward traversal. `state` is what the entry was pushed with.
#[derive(Debug, Clone)]
pub struct PopStateEvent {
    pub state: Option<Value>,
}

pub type ClickListener = Rc<dyn Fn(&ClickEvent)>;
pub type PopStateListener = Rc<dyn Fn(&PopStateEvent)>;

// ============================================================================
// Session history
// ============================================================================

/// One session history entry.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub url: Url,
    pub state: Option<Value>,
}

#[derive(Debug)]
struct SessionHistory {
    entries: Vec<HistoryRecord>,
    index: usize,
}

// ============================================================================
// Window
// ============================================================================

pub struct Window {
    document: RefCell<Document>,
    history: RefCell<SessionHistory>,
    clicks: RefCell<FxHashMap<NodeId, Vec<ClickListener>>>,
    popstate: RefCell<Vec<PopStateListener>>,
}

impl Window {
    pub fn new(document: Document, url: Url) -> Rc<Self> {
        Rc::new(Self {
            document: RefCell::new(document),
            history: RefCell::new(SessionHistory {
                entries: vec![HistoryRecord { url, state: None }],
                index: 0,
            }),
            clicks: RefCell::new(FxHashMap::default()),
            popstate: RefCell::new(Vec::new()),
        })
    }

    /// Parse `html` as the page served at `url`.
    pub fn load(html: &str, url: &str) -> Result<Rc<Self>, LoadError> {
        let document = Document::parse(html)?;
        let url = Url::parse(url)?;
        Ok(Self::new(document, url))
    }

    // ------------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------------

    /// Shared borrow of the document. Do not hold across an await.
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    /// Exclusive borrow of the document. Do not hold across an await.
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    // ------------------------------------------------------------------------
    // Location
    // ------------------------------------------------------------------------

    pub fn location(&self) -> Url {
        let history = self.history.borrow();
        history.entries[history.index].url.clone()
    }

    /// Resolve a possibly relative URL against the current location.
    pub fn resolve_url(&self, href: &str) -> Option<Url> {
        self.location().join(href).ok()
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    /// `history.pushState`: drops forward entries, appends, moves to it.
    pub fn push_state(&self, state: Value, url: &str) -> Result<(), url::ParseError> {
        let url = self.location().join(url)?;
        let mut history = self.history.borrow_mut();
        let keep = history.index + 1;
        history.entries.truncate(keep);
        history.entries.push(HistoryRecord {
            url,
            state: Some(state),
        });
        history.index = keep;
        Ok(())
    }

    /// Entries of the session history, oldest first.
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.history.borrow().entries.clone()
    }

    pub fn history_index(&self) -> usize {
        self.history.borrow().index
    }

    pub fn back(&self) -> bool {
        self.go(-1)
    }

    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Traverse by `delta` entries and fire `popstate`. Returns whether it moved.
    pub fn go(&self, delta: isize) -> bool {
        let state = {
            let mut history = self.history.borrow_mut();
            let Some(target) = history.index.checked_add_signed(delta) else {
                return false;
            };
            if delta == 0 || target >= history.entries.len() {
                return false;
            }
            history.index = target;
            history.entries[target].state.clone()
        };

        let event = PopStateEvent { state };
        let listeners = self.popstate.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
        true
    }

    pub fn on_popstate(&self, listener: PopStateListener) {
        self.popstate.borrow_mut().push(listener);
    }

    // ------------------------------------------------------------------------
    // Clicks
    // ------------------------------------------------------------------------

    pub fn on_click(&self, node: NodeId, listener: ClickListener) {
        self.clicks.borrow_mut().entry(node).or_default().push(listener);
    }

    /// Remove every click listener bound to `node`.
    pub fn off_click(&self, node: NodeId) {
        self.clicks.borrow_mut().remove(&node);
    }

    pub fn has_click_listener(&self, node: NodeId) -> bool {
        self.clicks.borrow().get(&node).is_some_and(|l| !l.is_empty())
    }

    /// Dispatch a click on `target`, bubbling to the root.
    ///
    /// Returns whether a listener called `prevent_default`. Disabled form
    /// controls swallow the click entirely.
    pub fn click(&self, target: NodeId) -> bool {
        let path: Vec<NodeId> = {
            let doc = self.document();
            if matches!(doc.tag(target), Some("button" | "input")) && doc.is_disabled(target) {
                return false;
            }
            let mut path = vec![target];
            let mut cursor = doc.parent(target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = doc.parent(node);
            }
            path
        };

        let event = ClickEvent {
            target,
            current: Cell::new(target),
            prevented: Cell::new(false),
        };
        for node in path {
            let listeners = self.clicks.borrow().get(&node).cloned().unwrap_or_default();
            event.current.set(node);
            for listener in listeners {
                listener(&event);
            }
        }
        event.default_prevented()
    }
}

// ============================================================================
// Tests
// ============================================================================
