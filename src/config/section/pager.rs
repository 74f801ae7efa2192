//! `[pager]` section configuration.
//!
//! Which links navigate, how their page number is found, and how a page
//! number becomes a URL.
//!
//! # Example
//!
//! ```toml
//! [pager]
//! page = 1                               # Page the document was served as
//! pager = ".pageNavWrapper a"            # Links intercepted for navigation
//! next_pager = ".pageNav-jump--next"     # "next" role (page + 1)
//! prev_pager = ".pageNav-jump--prev"     # "previous" role (page - 1)
//! jump_pager = ".pageNav-page--skip a"   # Opens/closes the page-jump widget
//! page_jump_submit = ".js-pageJumpGo"
//! page_jump_field = ".js-pageJumpPage"
//! base_url_attr = "page-url"             # Reads data-page-url="/threads/x/page-%page%"
//! sentinel = "%page%"
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Page number of the initially served document.
    pub page: i64,

    /// Links whose clicks are intercepted.
    pub pager: String,

    pub next_pager: String,
    pub prev_pager: String,

    /// Control clicked after a jump to close the jump widget.
    pub jump_pager: String,

    pub page_jump_submit: String,
    pub page_jump_field: String,

    /// Suffix of the `data-*` attribute holding the URL template.
    pub base_url_attr: String,

    /// Placeholder replaced by the page number in the URL template.
    pub sentinel: String,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page: 1,
            pager: ".pageNavWrapper a".into(),
            next_pager: ".pageNav-jump--next".into(),
            prev_pager: ".pageNav-jump--prev".into(),
            jump_pager: ".pageNav-page--skip a".into(),
            page_jump_submit: ".js-pageJumpGo".into(),
            page_jump_field: ".js-pageJumpPage".into(),
            base_url_attr: "page-url".into(),
            sentinel: "%page%".into(),
        }
    }
}

impl PagerConfig {
    /// `data-page-url` for the default `base_url_attr`.
    pub fn base_url_data_attr(&self) -> String {
        format!("data-{}", self.base_url_attr)
    }
}
