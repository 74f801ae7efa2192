//! The swap pipeline.
//!
//! ```text
//! freeze transitions ─► hide new ─► fade out old ─► insert new / remove old
//!   ─► mod bar ─► activate subtree ─► SEO + title ─► fade in ─► layout change
//! ```
//!
//! Nothing is mutated before the fade-out resolves. A swap whose ticket was
//! superseded during the fade-out, or whose anchor left the document, backs
//! out instead: the faded nodes are shown again and the new ones released.
//! Replaced subtrees are released from the arena together with their click
//! listeners.

use std::rc::Rc;

use super::controller::Inner;
use super::gate::Ticket;
use super::replace::SwapPlan;
use crate::dom::{NodeId, Selector};
use crate::{debug, log};

impl Inner {
    pub(super) async fn swap(
        self: Rc<Self>,
        plan: SwapPlan,
        href: String,
        title: Option<String>,
        ticket: Ticket,
    ) {
        let Some(&anchor) = plan.old.first() else {
            return;
        };

        {
            let mut doc = self.window.document_mut();
            for node in plan.animate_out.iter().chain(&plan.animate_in) {
                doc.set_style(*node, "transition", "none");
            }
            for node in &plan.new {
                doc.hide(*node);
            }
        }

        let animator = Rc::clone(&self.host.animator);
        animator
            .fade_out(Rc::clone(&self.window), plan.animate_out.clone())
            .await;

        if !self.gate.is_current(ticket) || !self.window.document().is_connected(anchor) {
            debug!("swap"; "{} superseded, backing out", href);
            self.back_out(&plan);
            return;
        }

        let inserted = self.window.document_mut().insert_after(anchor, &plan.new);
        if let Err(err) = inserted {
            log!("swap"; "cannot insert new content for {}: {}", href, err);
            self.back_out(&plan);
            return;
        }
        self.release(&plan.old);
        debug!("swap"; "replaced {} node(s) with {} for {}", plan.old.len(), plan.new.len(), href);

        self.replace_mod_bar();
        self.activate(&plan.new);

        {
            let mut doc = self.window.document_mut();
            for node in &plan.new {
                doc.show(*node);
            }
            for node in &plan.animate_in {
                doc.hide(*node);
            }
        }

        self.sync_seo(&plan.new, &href);
        if let Some(title) = &title {
            self.window.document_mut().set_title(title);
        }

        animator
            .fade_in(Rc::clone(&self.window), plan.animate_in.clone())
            .await;
        self.host.shell.layout_change();
    }

    /// Undo the fade-out and drop the never-inserted content.
    fn back_out(&self, plan: &SwapPlan) {
        {
            let mut doc = self.window.document_mut();
            for node in &plan.animate_out {
                if doc.is_connected(*node) {
                    doc.remove_style(*node, "transition");
                    doc.show(*node);
                }
            }
        }
        self.discard(&plan.new);
    }

    /// Remove `roots` from the document, forgetting their listeners.
    fn release(&self, roots: &[NodeId]) {
        let released: Vec<NodeId> = {
            let mut doc = self.window.document_mut();
            roots.iter().flat_map(|root| doc.remove(*root)).collect()
        };
        let mut bound = self.bound.borrow_mut();
        for node in released {
            bound.remove(&node);
            self.window.off_click(node);
        }
    }

    /// Run behaviors and rebind our handlers on freshly inserted nodes.
    fn activate(self: &Rc<Self>, roots: &[NodeId]) {
        {
            let mut doc = self.window.document_mut();
            self.host.activator.activate(&mut doc, roots);
        }
        self.bind_pagers(roots);
        self.schedule_jump_binding();
    }

    /// Fade the inline moderation bar, then drop it and respawn a fresh one.
    fn replace_mod_bar(self: &Rc<Self>) {
        let Some(selector) = &self.selectors.mod_bar else {
            return;
        };
        let bars = {
            let mut doc = self.window.document_mut();
            let bars = doc.query_selector_all(selector);
            for bar in &bars {
                doc.set_style(*bar, "opacity", "0");
            }
            bars
        };
        if bars.is_empty() {
            return;
        }

        let inner = Rc::clone(self);
        let delay = self.config.timing.mod_bar();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            inner.release(&bars);
            let trigger = {
                let doc = inner.window.document();
                inner
                    .selectors
                    .mod_bar_trigger
                    .as_ref()
                    .and_then(|selector| doc.query_selector(selector))
            };
            if let Some(trigger) = trigger {
                inner.window.click(trigger);
            }
        });
    }

    /// Point canonical at `href`, prev/next at the pagers inside `roots`.
    fn sync_seo(&self, roots: &[NodeId], href: &str) {
        let pager_href = |selector: Option<&Selector>| -> Option<String> {
            let selector = selector?;
            let doc = self.window.document();
            let pager = roots
                .iter()
                .flat_map(|root| std::iter::once(*root).chain(doc.descendants(*root)))
                .find(|node| doc.matches(*node, selector))?;
            let target = doc.attr(pager, "href")?;
            self.window.resolve_url(target).map(|url| url.to_string())
        };
        let prev = pager_href(self.selectors.prev_pager.as_ref());
        let next = pager_href(self.selectors.next_pager.as_ref());

        let mut doc = self.window.document_mut();
        self.seo
            .borrow_mut()
            .sync(&mut doc, href, prev.as_deref(), next.as_deref());
        debug!("seo"; "canonical={} prev={:?} next={:?}", href, prev, next);
    }
}
