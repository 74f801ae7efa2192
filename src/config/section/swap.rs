//! `[swap]` section configuration.
//!
//! What gets replaced by what, and how the replacement is animated.
//!
//! # Example
//!
//! ```toml
//! [swap]
//! replace = ".block-outer, .block-container"   # "<old>" or "<old> with <new>"
//! filter = ""                                  # Keep only matching fragment roots
//! animate = ".block-body"                      # Faded part; empty = whole target
//! target_scope = "document"                    # document | closest | fragment-root
//! overlay = ".overlay"
//! hide_overlay = true
//! mod_bar = ".inlineModBar"
//! mod_bar_trigger = ".js-inlineModTrigger"
//! ```

use serde::{Deserialize, Serialize};

/// Where the old target is looked up and what counts as new content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetScope {
    /// Every document match of the old selector.
    #[default]
    Document,
    /// Nearest ancestor of the clicked element, then the document.
    Closest,
    /// Document match; the fragment's top-level elements are the new content.
    FragmentRoot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// `"<old>"` or `"<old> with <new>"`; `old` may be `self`. Empty disables replacement.
    pub replace: String,

    /// Applied to the fragment's top-level nodes before resolution.
    pub filter: String,

    /// Part of old/new content that fades; empty animates the whole target.
    pub animate: String,

    pub target_scope: TargetScope,

    /// Container considered an overlay when the clicked element sits inside one.
    pub overlay: String,

    /// Hide the originating overlay before showing a fallback overlay.
    pub hide_overlay: bool,

    pub mod_bar: String,
    pub mod_bar_trigger: String,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            replace: ".block-outer, .block-container".into(),
            filter: String::new(),
            animate: ".block-body".into(),
            target_scope: TargetScope::Document,
            overlay: ".overlay".into(),
            hide_overlay: true,
            mod_bar: ".inlineModBar".into(),
            mod_bar_trigger: ".js-inlineModTrigger".into(),
        }
    }
}

/// `None` for empty or whitespace-only selector options.
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

impl SwapConfig {
    pub fn filter(&self) -> Option<&str> {
        non_empty(&self.filter)
    }

    pub fn animate(&self) -> Option<&str> {
        non_empty(&self.animate)
    }
}
