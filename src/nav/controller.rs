//! The navigation controller.
//!
//! # Request Lifecycle
//!
//! ```text
//! click / jump / popstate
//!         │
//!         ▼
//!   gate acquired ──► (next tick) disable controls ──► fetch
//!                                                       │
//!         ┌─────────────────────────────────────────────┘
//!         ▼
//!   interpret response ──► try_replace ──► swap task (see swap.rs)
//!         │
//!         ▼
//!   settle delay ──► re-enable controls ──► gate released
//! ```
//!
//! Clicks and jumps are dropped while the gate is held. Popstate is always
//! honored unless it targets the URL already in flight, and it supersedes
//! whatever was pending: the older response is dropped on arrival and an
//! older swap stops before touching the document.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashSet;
use serde_json::Value;

use super::gate::{RequestGate, Ticket};
use super::page::{PageRef, build_url, infer_page, jump_page};
use super::replace::{OldTarget, ReplaceSpec, ResolveInput};
use super::response::{HtmlPayload, Response};
use super::selectors::Selectors;
use super::seo::{SeoLinks, SeoSnapshot};
use super::state::{HistoryEntry, NavigationState};
use crate::config::PageswapConfig;
use crate::dom::NodeId;
use crate::host::{FetchRequest, FetchResponse, Host, Notification, NotificationKind, Overlay, ParsedFragment};
use crate::window::{ClickEvent, PopStateEvent, Window};
use crate::{debug, log};

/// What started a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Click,
    Jump,
    PopState,
}

/// One dispatched request.
#[derive(Debug, Clone)]
pub(super) struct Navigation {
    pub origin: Origin,
    /// Interacted element.
    pub target: Option<NodeId>,
    pub state: NavigationState,
    pub ticket: Ticket,
}

/// Handle to an attached controller. Listeners stop working once dropped.
pub struct Controller {
    inner: Rc<Inner>,
}

pub(super) struct Inner {
    pub window: Rc<Window>,
    pub host: Host,
    pub config: PageswapConfig,
    pub selectors: Selectors,
    pub spec: ReplaceSpec,
    pub base_url: Option<String>,
    pub initial: HistoryEntry,
    pub state: RefCell<NavigationState>,
    pub gate: RequestGate,
    pub seo: RefCell<SeoLinks>,
    /// Nodes with our pager listener; guards against double binding.
    pub bound: RefCell<FxHashSet<NodeId>>,
}

impl Controller {
    /// Wire a controller into `window`.
    ///
    /// Returns `None` (and wires nothing) when the configuration leaves the
    /// controller inert. Must be called inside a `tokio::task::LocalSet`.
    pub fn attach(window: Rc<Window>, host: Host, config: PageswapConfig) -> Option<Self> {
        if !config.is_active() {
            debug!("nav"; "replace or pager selector missing, staying inert");
            return None;
        }
        let spec = match ReplaceSpec::parse(&config.swap.replace) {
            Ok(Some(spec)) => spec,
            Ok(None) => return None,
            Err(err) => {
                log!("nav"; "invalid replace spec `{}`: {}", config.swap.replace, err);
                return None;
            }
        };
        let selectors = match Selectors::compile(&config) {
            Ok(selectors) => selectors,
            Err(err) => {
                log!("nav"; "invalid selector: {}", err);
                return None;
            }
        };

        let state = NavigationState {
            page: PageRef::Number(config.pager.page),
            href: window.location().to_string(),
        };
        let (base_url, seo, initial) = {
            let doc = window.document();
            let attr = config.pager.base_url_data_attr();
            let base_url = doc
                .descendants(doc.root())
                .into_iter()
                .find_map(|node| doc.attr(node, &attr).map(str::to_string));

            let mut initial = HistoryEntry::new(&state);
            if config.history.snapshot {
                initial.title = Some(doc.title());
                if let OldTarget::Selector(selector) = &spec.old {
                    let nodes = doc.outermost(&doc.query_selector_all(selector));
                    initial.snapshot = Some(nodes.iter().map(|n| doc.outer_html(*n)).collect());
                }
            }
            (base_url, SeoLinks::adopt(&doc), initial)
        };
        if base_url.is_none() {
            debug!("nav"; "no `data-{}` template, page jump disabled", config.pager.base_url_attr);
        }

        let inner = Rc::new(Inner {
            window,
            host,
            config,
            selectors,
            spec,
            base_url,
            initial,
            state: RefCell::new(state),
            gate: RequestGate::new(),
            seo: RefCell::new(seo),
            bound: RefCell::new(FxHashSet::default()),
        });

        inner.bind_popstate();
        let root = inner.window.document().root();
        inner.bind_pagers(&[root]);
        inner.schedule_jump_binding();
        debug!("nav"; "attached at {}", inner.state.borrow().href);

        Some(Self { inner })
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.inner.window
    }

    pub fn state(&self) -> NavigationState {
        self.inner.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.gate.is_pending()
    }

    /// URL template read from the page, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.inner.base_url.as_deref()
    }

    pub fn seo(&self) -> SeoSnapshot {
        self.inner.seo.borrow().snapshot(&self.inner.window.document())
    }
}

// ============================================================================
// Wiring
// ============================================================================

impl Inner {
    fn bind_popstate(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.window.on_popstate(Rc::new(move |event: &PopStateEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.on_popstate(event);
            }
        }));
    }

    /// Bind the pager listener to matching nodes in `roots` (inclusive).
    pub(super) fn bind_pagers(self: &Rc<Self>, roots: &[NodeId]) {
        let pagers: Vec<NodeId> = {
            let doc = self.window.document();
            roots
                .iter()
                .flat_map(|root| std::iter::once(*root).chain(doc.descendants(*root)))
                .filter(|node| doc.matches(*node, &self.selectors.pager))
                .collect()
        };

        let mut bound = self.bound.borrow_mut();
        for pager in pagers {
            if !bound.insert(pager) {
                continue;
            }
            let weak = Rc::downgrade(self);
            self.window.on_click(
                pager,
                Rc::new(move |event: &ClickEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_pager_click(event);
                    }
                }),
            );
        }
    }

    /// Bind the jump submit after a delay, replacing its existing listeners.
    pub(super) fn schedule_jump_binding(self: &Rc<Self>) {
        if self.selectors.page_jump_submit.is_none() {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let delay = self.config.timing.jump_bind();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.bind_jump();
            }
        });
    }

    fn bind_jump(self: &Rc<Self>) {
        let Some(selector) = &self.selectors.page_jump_submit else {
            return;
        };
        let submits = self.window.document().query_selector_all(selector);
        for submit in submits {
            self.window.off_click(submit);
            let weak = Rc::downgrade(self);
            self.window.on_click(
                submit,
                Rc::new(move |event: &ClickEvent| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_jump(event);
                    }
                }),
            );
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    fn on_pager_click(self: &Rc<Self>, event: &ClickEvent) {
        event.prevent_default();
        let link = event.current_target();

        let Some(href) = self.window.document().attr(link, "href").map(str::to_string) else {
            return;
        };
        let Some(url) = self.window.resolve_url(&href) else {
            log!("nav"; "cannot resolve pager href `{}`", href);
            return;
        };
        let Some(ticket) = self.gate.try_acquire(url.as_str()) else {
            debug!("nav"; "request pending, dropping click on {}", url);
            return;
        };

        let page = {
            let doc = self.window.document();
            let current = self.state.borrow().page.clone();
            infer_page(
                &doc,
                link,
                &current,
                self.selectors.next_pager.as_ref(),
                self.selectors.prev_pager.as_ref(),
            )
        };
        self.dispatch(Navigation {
            origin: Origin::Click,
            target: Some(link),
            state: NavigationState {
                page,
                href: url.to_string(),
            },
            ticket,
        });
    }

    fn on_jump(self: &Rc<Self>, event: &ClickEvent) {
        if self.gate.is_pending() {
            debug!("nav"; "request pending, dropping page jump");
            return;
        }
        let Some(template) = &self.base_url else {
            log!("nav"; "no `data-{}` template, cannot jump", self.config.pager.base_url_attr);
            return;
        };

        let input = {
            let doc = self.window.document();
            self.selectors
                .page_jump_field
                .as_ref()
                .and_then(|field| doc.query_selector(field))
                .and_then(|field| doc.value(field))
                .unwrap_or_default()
                .to_string()
        };
        let page = PageRef::Number(jump_page(&input));
        let built = build_url(template, &self.config.pager.sentinel, &page);
        let Some(url) = self.window.resolve_url(&built) else {
            log!("nav"; "cannot resolve jump url `{}`", built);
            return;
        };
        let Some(ticket) = self.gate.try_acquire(url.as_str()) else {
            return;
        };

        // history goes first for jumps, before the response is known
        let state = NavigationState {
            page,
            href: url.to_string(),
        };
        *self.state.borrow_mut() = state.clone();
        self.push_history(HistoryEntry::new(&state));

        // closes the jump widget; our own pager handler sees the held gate
        let close = {
            let doc = self.window.document();
            self.selectors
                .jump_pager
                .as_ref()
                .and_then(|selector| doc.query_selector(selector))
        };
        if let Some(close) = close {
            self.window.click(close);
        }

        self.dispatch(Navigation {
            origin: Origin::Jump,
            target: Some(event.current_target()),
            state,
            ticket,
        });
    }

    fn on_popstate(self: &Rc<Self>, event: &PopStateEvent) {
        let entry = event
            .state
            .as_ref()
            .and_then(HistoryEntry::from_value)
            .unwrap_or_else(|| self.initial.clone());

        if self.gate.in_flight().as_deref() == Some(entry.href.as_str()) {
            debug!("history"; "{} already in flight", entry.href);
            return;
        }
        debug!("history"; "popstate to {} (page {})", entry.href, entry.page);

        *self.state.borrow_mut() = entry.state();
        if let Some(title) = &entry.title {
            self.window.document_mut().set_title(title);
        }

        if let Some(snapshot) = &entry.snapshot {
            let ticket = self.gate.supersede();
            let parsed = {
                let mut doc = self.window.document_mut();
                self.host.parser.parse(&mut doc, snapshot)
            };
            match parsed {
                Ok(parsed) => {
                    if self.try_replace(Origin::PopState, None, &entry.state(), &parsed.nodes, None, ticket) {
                        return;
                    }
                    self.discard(&parsed.nodes);
                    debug!("history"; "snapshot for {} did not apply, refetching", entry.href);
                }
                Err(err) => log!("history"; "cannot parse snapshot: {}", err),
            }
        }

        let ticket = self.gate.force_acquire(&entry.href);
        self.dispatch(Navigation {
            origin: Origin::PopState,
            target: None,
            state: entry.state(),
            ticket,
        });
    }

    // ========================================================================
    // Request
    // ========================================================================

    fn dispatch(self: &Rc<Self>, nav: Navigation) {
        let inner = Rc::clone(self);
        tokio::task::spawn_local(inner.run(nav));
    }

    async fn run(self: Rc<Self>, nav: Navigation) {
        // let other handlers of the same click run first
        tokio::task::yield_now().await;
        self.set_controls_disabled(true);

        let form_data = &self.config.request.form_data;
        let request = FetchRequest {
            method: self.config.request.method,
            url: nav.state.href.clone(),
            form_data: (!form_data.is_empty()).then(|| form_data.clone()),
            skip_default: true,
        };
        debug!("fetch"; "{} {}", request.method, request.url);

        match self.host.fetcher.fetch(request).await {
            Ok(_) if !self.gate.is_current(nav.ticket) => {
                debug!("fetch"; "{} superseded, dropping response", nav.state.href);
            }
            Ok(response) => self.handle_response(&nav, response),
            Err(err) => log!("fetch"; "{}", err),
        }

        tokio::time::sleep(self.config.timing.settle()).await;
        // a superseded request still re-enables controls once nothing is pending
        if self.gate.release(nav.ticket) || !self.gate.is_pending() {
            self.set_controls_disabled(false);
        }
    }

    fn set_controls_disabled(&self, disabled: bool) {
        let Some(selector) = &self.selectors.disable_submit else {
            return;
        };
        let mut doc = self.window.document_mut();
        for node in doc.query_selector_all(selector) {
            doc.set_disabled(node, disabled);
        }
    }

    // ========================================================================
    // Response
    // ========================================================================

    pub(super) fn handle_response(self: &Rc<Self>, nav: &Navigation, response: FetchResponse) {
        let shell = &self.host.shell;
        let value = match response {
            FetchResponse::Json(value @ Value::Object(_)) => value,
            _ => {
                shell.alert(&self.config.phrases.invalid_response);
                return;
            }
        };
        let notify = |kind| {
            shell.notify(&Notification {
                kind,
                target: nav.target,
                response: &value,
            })
        };

        if notify(NotificationKind::Response) {
            return;
        }
        let response: Response = match serde_json::from_value(value.clone()) {
            Ok(response) => response,
            Err(err) => {
                log!("nav"; "malformed response from {}: {}", nav.state.href, err);
                shell.alert(&self.config.phrases.invalid_response);
                return;
            }
        };

        let origin_overlay = {
            let doc = self.window.document();
            match (nav.target, &self.selectors.overlay) {
                (Some(target), Some(overlay)) if doc.is_connected(target) => doc.closest(target, overlay),
                _ => None,
            }
        };
        let request = &self.config.request;

        if let Some(error_html) = response.error_html() {
            if !notify(NotificationKind::Error) {
                self.present(error_html, Some(self.config.phrases.problems_occurred.as_str()));
            }
        } else if let Some(errors) = response.errors() {
            if !notify(NotificationKind::Error) {
                shell.alert(&errors.joined());
            }
        } else if let Some(exception) = &response.exception {
            shell.alert(exception);
        } else if let Some(redirect) = response.redirect.as_deref().filter(|_| request.redirect) {
            if origin_overlay.is_some() && request.skip_overlay_redirect {
                if let Some(message) = &response.message {
                    shell.flash(message);
                }
                self.hide_overlay(origin_overlay);
            } else {
                if request.force_flash_message
                    && let Some(message) = &response.message
                {
                    shell.flash(message);
                }
                shell.redirect(redirect);
            }
        } else if let Some(html) = response.html() {
            let to_hide = origin_overlay.filter(|_| self.config.swap.hide_overlay);
            self.apply_html(nav, html, to_hide);
        } else if let Some(message) = &response.message {
            shell.flash(message);
            self.hide_overlay(origin_overlay);
        }

        notify(NotificationKind::Complete);
    }

    fn parse(&self, html: &HtmlPayload) -> Option<ParsedFragment> {
        let mut doc = self.window.document_mut();
        match self.host.parser.parse(&mut doc, html.content()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log!("nav"; "cannot parse response markup: {}", err);
                None
            }
        }
    }

    fn apply_html(self: &Rc<Self>, nav: &Navigation, html: &HtmlPayload, to_hide: Option<NodeId>) {
        let Some(parsed) = self.parse(html) else {
            return;
        };
        let title = html
            .title()
            .map(str::to_string)
            .or_else(|| parsed.title.clone())
            .map(|base| self.config.title.format(&base, nav.state.page.number()));

        if self.try_replace(nav.origin, nav.target, &nav.state, &parsed.nodes, title, nav.ticket) {
            return;
        }
        self.hide_overlay(to_hide);
        self.show_overlay(html, parsed, None);
    }

    /// Present markup in a new overlay.
    fn present(&self, html: &HtmlPayload, fallback_title: Option<&str>) {
        if let Some(parsed) = self.parse(html) {
            self.show_overlay(html, parsed, fallback_title);
        }
    }

    fn show_overlay(&self, html: &HtmlPayload, parsed: ParsedFragment, fallback_title: Option<&str>) {
        let title = html
            .heading()
            .or(html.title())
            .or(parsed.heading.as_deref())
            .or(parsed.title.as_deref())
            .or(fallback_title)
            .unwrap_or_default()
            .to_string();
        let mut doc = self.window.document_mut();
        self.host.overlay.present(
            &mut doc,
            Overlay {
                title,
                content: parsed.nodes,
            },
        );
    }

    fn hide_overlay(&self, overlay: Option<NodeId>) {
        if let Some(overlay) = overlay {
            let mut doc = self.window.document_mut();
            self.host.overlay.hide(&mut doc, overlay);
        }
    }

    // ========================================================================
    // Replace
    // ========================================================================

    /// Resolve targets and start the swap. Returns whether it applies.
    ///
    /// On success the navigation state is committed and, for clicks, a
    /// history entry pushed; the swap itself runs as a separate task.
    pub(super) fn try_replace(
        self: &Rc<Self>,
        origin: Origin,
        interacted: Option<NodeId>,
        state: &NavigationState,
        nodes: &[NodeId],
        title: Option<String>,
        ticket: Ticket,
    ) -> bool {
        let plan = {
            let doc = self.window.document();
            self.spec.resolve(
                &doc,
                &ResolveInput {
                    interacted,
                    fragment: nodes,
                    scope: self.config.swap.target_scope,
                    filter: self.selectors.filter.as_ref(),
                    animate: self.selectors.animate.as_ref(),
                },
            )
        };
        let plan = match plan {
            Ok(plan) => plan,
            Err(err) => {
                log!("nav"; "{}", err);
                return false;
            }
        };

        *self.state.borrow_mut() = state.clone();
        if origin == Origin::Click {
            let mut entry = HistoryEntry::new(state);
            if self.config.history.snapshot {
                let doc = self.window.document();
                entry.title = Some(title.clone().unwrap_or_else(|| doc.title()));
                entry.snapshot = Some(plan.new.iter().map(|n| doc.outer_html(*n)).collect());
            }
            self.push_history(entry);
        }

        let inner = Rc::clone(self);
        let href = state.href.clone();
        tokio::task::spawn_local(inner.swap(plan, href, title, ticket));
        true
    }

    /// Drop nodes that were parsed but never inserted.
    pub(super) fn discard(&self, nodes: &[NodeId]) {
        let mut doc = self.window.document_mut();
        for node in nodes {
            if !doc.is_connected(*node) {
                doc.remove(*node);
            }
        }
    }

    fn push_history(&self, entry: HistoryEntry) {
        debug!("history"; "push {} (page {})", entry.href, entry.page);
        if let Err(err) = self.window.push_state(entry.to_value(), &entry.href) {
            log!("history"; "cannot push `{}`: {}", entry.href, err);
        }
    }
}
