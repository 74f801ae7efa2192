//! Replace specs and target resolution.
//!
//! A replace spec reads `"<old> with <new>"`. Resolution turns it into a
//! [`SwapPlan`]: which live nodes go, which fragment nodes come in, and
//! which parts of each are faded.

use thiserror::Error;

use crate::config::TargetScope;
use crate::dom::{Document, DomError, NodeId, Selector};

/// Old-target keyword meaning "the interacted element".
pub const SELF_TARGET: &str = "self";

const DELIMITER: &str = " with ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OldTarget {
    SelfElement,
    Selector(Selector),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSpec {
    pub old: OldTarget,
    pub new: Selector,
}

impl ReplaceSpec {
    /// Parse a replace string. `Ok(None)` means replacement is disabled.
    pub fn parse(replace: &str) -> Result<Option<Self>, DomError> {
        let (old, new) = match replace.split_once(DELIMITER) {
            Some((old, rest)) => {
                // anything after a second delimiter is ignored
                let new = rest.split(DELIMITER).next().unwrap_or_default();
                (old.trim(), new.trim())
            }
            None => (replace.trim(), ""),
        };
        if old.is_empty() {
            return Ok(None);
        }
        let new = if new.is_empty() { old } else { new };

        let old = if old == SELF_TARGET {
            OldTarget::SelfElement
        } else {
            OldTarget::Selector(Selector::parse(old)?)
        };
        Ok(Some(Self {
            old,
            new: Selector::parse(new)?,
        }))
    }

    /// Resolve against the live document and a parsed fragment.
    pub fn resolve(&self, doc: &Document, input: &ResolveInput<'_>) -> Result<SwapPlan, ResolveError> {
        let old = self.resolve_old(doc, input)?;
        let (new, source) = self.resolve_new(doc, input)?;

        let (animate_out, animate_in) = match input.animate {
            Some(sel) => (animate_targets(doc, &old, sel), animate_targets(doc, &new, sel)),
            None => (old.clone(), new.clone()),
        };

        Ok(SwapPlan {
            old,
            new,
            animate_out,
            animate_in,
            source,
        })
    }

    fn resolve_old(&self, doc: &Document, input: &ResolveInput<'_>) -> Result<Vec<NodeId>, ResolveError> {
        let selector = match &self.old {
            OldTarget::SelfElement => {
                return input
                    .interacted
                    .filter(|node| doc.is_connected(*node))
                    .map(|node| vec![node])
                    .ok_or_else(|| ResolveError::OldNotFound(SELF_TARGET.into()));
            }
            OldTarget::Selector(selector) => selector,
        };

        if let Some(node) = input.interacted
            && doc.is_connected(node)
            && doc.matches(node, selector)
        {
            return Ok(vec![node]);
        }

        if input.scope == TargetScope::Closest
            && let Some(node) = input.interacted
            && let Some(ancestor) = doc.closest(node, selector)
            && doc.is_connected(ancestor)
        {
            return Ok(vec![ancestor]);
        }

        let found = doc.outermost(&doc.query_selector_all(selector));
        if found.is_empty() {
            return Err(ResolveError::OldNotFound(selector.to_string()));
        }
        Ok(found)
    }

    fn resolve_new(
        &self,
        doc: &Document,
        input: &ResolveInput<'_>,
    ) -> Result<(Vec<NodeId>, NewSource), ResolveError> {
        let roots: Vec<NodeId> = match input.filter {
            Some(filter) => doc.filter(input.fragment, filter),
            None => input
                .fragment
                .iter()
                .copied()
                .filter(|node| doc.is_element(*node))
                .collect(),
        };
        let missing = || ResolveError::NewNotFound(self.new.to_string());

        if input.scope == TargetScope::FragmentRoot {
            if roots.is_empty() {
                return Err(missing());
            }
            return Ok((roots, NewSource::FragmentRoot));
        }

        let top = doc.filter(&roots, &self.new);
        if !top.is_empty() {
            return Ok((top, NewSource::TopLevel));
        }
        let nested = doc.outermost(&doc.find(&roots, &self.new));
        if !nested.is_empty() {
            return Ok((nested, NewSource::Descendant));
        }
        Err(missing())
    }
}

/// Descendants matching `animate`, else the nodes that match it, else all nodes.
fn animate_targets(doc: &Document, nodes: &[NodeId], animate: &Selector) -> Vec<NodeId> {
    let inner = doc.find(nodes, animate);
    if !inner.is_empty() {
        return inner;
    }
    let own = doc.filter(nodes, animate);
    if !own.is_empty() {
        return own;
    }
    nodes.to_vec()
}

/// Context for [`ReplaceSpec::resolve`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
    /// Element the user interacted with (none for history restores).
    pub interacted: Option<NodeId>,
    /// Top-level nodes of the parsed fragment.
    pub fragment: &'a [NodeId],
    pub scope: TargetScope,
    pub filter: Option<&'a Selector>,
    pub animate: Option<&'a Selector>,
}

/// Where the new content was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewSource {
    /// Fragment roots matching the new selector.
    TopLevel,
    /// Descendants of fragment roots matching the new selector.
    Descendant,
    /// All (filtered) fragment roots.
    FragmentRoot,
}

/// Resolved replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    /// Live nodes removed; new content goes after the first.
    pub old: Vec<NodeId>,
    /// Fragment nodes inserted, in order.
    pub new: Vec<NodeId>,
    pub animate_out: Vec<NodeId>,
    pub animate_in: Vec<NodeId>,
    pub source: NewSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("could not find old selector '{0}'")]
    OldNotFound(String),

    #[error("could not find new selector '{0}'")]
    NewNotFound(String),
}
