//! `[title]` and `[phrases]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [title]
//! page_format = " - Page {page}"   # Appended for pages after the first
//! suffix = " | Forum"
//!
//! [phrases]
//! invalid_response = "Response was not JSON."
//! problems_occurred = "Oops! We ran into some problems."
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// `{page}` is replaced by the page number.
    pub page_format: String,
    pub suffix: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            page_format: " - Page {page}".into(),
            suffix: String::new(),
        }
    }
}

impl TitleConfig {
    /// Document title for `base` on `page` (page suffix only after page 1).
    pub fn format(&self, base: &str, page: Option<i64>) -> String {
        match page {
            Some(page) if page > 1 => format!(
                "{base}{}{}",
                self.page_format.replace("{page}", &page.to_string()),
                self.suffix
            ),
            _ => format!("{base}{}", self.suffix),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhrasesConfig {
    pub invalid_response: String,
    pub problems_occurred: String,
}

impl Default for PhrasesConfig {
    fn default() -> Self {
        Self {
            invalid_response: "Response was not JSON.".into(),
            problems_occurred: "Oops! We ran into some problems.".into(),
        }
    }
}
