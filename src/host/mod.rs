//! Collaborators the navigation controller drives but does not implement.
//!
//! | Trait               | Reference impl      | Role                              |
//! |---------------------|---------------------|-----------------------------------|
//! | `FragmentFetcher`   | `StaticFetcher`     | Network round trip                |
//! | `FragmentParser`    | `TlParser`          | Markup -> nodes + title/heading   |
//! | `BehaviorActivator` | `NoopActivator`     | Initialize inserted subtrees      |
//! | `OverlayPresenter`  | `DomOverlay`        | Modal fallback                    |
//! | `Animator`          | `InstantAnimator`   | Fade out / fade in                |
//! | `Shell`             | `RecordingShell`    | Alerts, flashes, notifications    |
//!
//! All of them run on the UI thread: futures are `!Send` and live on a
//! `LocalSet`.

mod animate;
mod fetch;
mod overlay;
mod parser;
mod shell;

pub use animate::{Animator, InstantAnimator, TimedAnimator};
pub use fetch::{FetchError, FetchRequest, FetchResponse, FragmentFetcher, StaticFetcher};
pub use overlay::{DomOverlay, Overlay, OverlayPresenter};
pub use parser::{FragmentParser, ParsedFragment, TlParser};
pub use shell::{Notification, NotificationKind, RecordingShell, Shell, ShellEvent};

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::dom::{Document, NodeId};

/// Boxed future bound to the UI thread.
pub type LocalFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Initializes behaviors on freshly inserted nodes. Must be idempotent.
pub trait BehaviorActivator {
    fn activate(&self, doc: &mut Document, roots: &[NodeId]);
}

pub struct NoopActivator;

impl BehaviorActivator for NoopActivator {
    fn activate(&self, _doc: &mut Document, _roots: &[NodeId]) {}
}

/// The set of collaborators handed to a controller.
#[derive(Clone)]
pub struct Host {
    pub fetcher: Rc<dyn FragmentFetcher>,
    pub parser: Rc<dyn FragmentParser>,
    pub activator: Rc<dyn BehaviorActivator>,
    pub overlay: Rc<dyn OverlayPresenter>,
    pub animator: Rc<dyn Animator>,
    pub shell: Rc<dyn Shell>,
}

impl Host {
    /// Reference collaborators around a fetcher and a shell.
    pub fn new(fetcher: Rc<dyn FragmentFetcher>, shell: Rc<dyn Shell>) -> Self {
        Self {
            fetcher,
            parser: Rc::new(TlParser),
            activator: Rc::new(NoopActivator),
            overlay: Rc::new(DomOverlay),
            animator: Rc::new(InstantAnimator),
            shell,
        }
    }

    pub fn with_animator(mut self, animator: Rc<dyn Animator>) -> Self {
        self.animator = animator;
        self
    }

    pub fn with_activator(mut self, activator: Rc<dyn BehaviorActivator>) -> Self {
        self.activator = activator;
        self
    }

    pub fn with_overlay(mut self, overlay: Rc<dyn OverlayPresenter>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_parser(mut self, parser: Rc<dyn FragmentParser>) -> Self {
        self.parser = parser;
        self
    }
}
