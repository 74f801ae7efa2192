//! `[request]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [request]
//! method = "GET"
//! disable_submit = ".button, :submit, :reset"
//! redirect = true                  # Follow `redirect` in responses
//! skip_overlay_redirect = false    # Inside an overlay: flash + close instead
//! force_flash_message = false      # Flash `message` before redirecting
//!
//! [request.form_data]
//! _xfResponseType = "json"
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method for navigation requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub method: RequestMethod,

    /// Extra fields sent with every request.
    pub form_data: BTreeMap<String, String>,

    /// Elements disabled while a request is pending. Empty disables nothing.
    pub disable_submit: String,

    pub redirect: bool,
    pub skip_overlay_redirect: bool,
    pub force_flash_message: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            method: RequestMethod::Get,
            form_data: BTreeMap::new(),
            disable_submit:
                r#".button, :submit, :reset, [data-disable-submit], a[data-xf-click="ajax-click"]"#
                    .into(),
            redirect: true,
            skip_overlay_redirect: false,
            force_flash_message: false,
        }
    }
}
