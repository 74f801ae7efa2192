//! Controller configuration loaded from `pageswap.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Section definitions
//! │   ├── pager      # [pager]
//! │   ├── swap       # [swap]
//! │   ├── request    # [request]
//! │   ├── history    # [history], [timing]
//! │   └── text       # [title], [phrases]
//! ├── types/         # ConfigError, diagnostics, field paths
//! └── mod.rs         # PageswapConfig (this file)
//! ```
//!
//! Every key is optional; the defaults reproduce the stock forum pager.

pub mod section;
pub mod types;

pub use section::{
    HistoryConfig, PagerConfig, PhrasesConfig, RequestConfig, RequestMethod, SwapConfig,
    TargetScope, TimingConfig, TitleConfig,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::dom::Selector;
use crate::log;
use crate::nav::ReplaceSpec;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `pageswap.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageswapConfig {
    pub pager: PagerConfig,
    pub swap: SwapConfig,
    pub request: RequestConfig,
    pub history: HistoryConfig,
    pub timing: TimingConfig,
    pub title: TitleConfig,
    pub phrases: PhrasesConfig,
}

impl PageswapConfig {
    /// Parse from TOML text; unknown keys are ignored.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::parse_with_ignored(content)?.0)
    }

    /// Load from a file, warning about unknown keys.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse and collect the paths of keys serde did not consume.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Whether a controller built from this config wires anything at all.
    pub fn is_active(&self) -> bool {
        !self.swap.replace.trim().is_empty() && !self.pager.pager.trim().is_empty()
    }

    /// Check every selector and value, collecting all problems.
    ///
    /// Warnings (inert controller, odd values) are kept in the returned
    /// diagnostics; errors turn into `ConfigError::Diagnostics`.
    pub fn validate(&self) -> Result<ConfigDiagnostics, ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if !self.is_active() {
            diag.warn(
                FieldPath::new("swap.replace"),
                "`swap.replace` and `pager.pager` must both be set, the controller stays inert",
            );
        }

        if let Err(err) = ReplaceSpec::parse(&self.swap.replace) {
            diag.error_with_hint(
                FieldPath::new("swap.replace"),
                err.to_string(),
                "use `<old>` or `<old> with <new>`, where <old> may be `self`",
            );
        }

        let selectors = [
            (FieldPath::new("pager.pager"), &self.pager.pager),
            (FieldPath::new("pager.next_pager"), &self.pager.next_pager),
            (FieldPath::new("pager.prev_pager"), &self.pager.prev_pager),
            (FieldPath::new("pager.jump_pager"), &self.pager.jump_pager),
            (FieldPath::new("pager.page_jump_submit"), &self.pager.page_jump_submit),
            (FieldPath::new("pager.page_jump_field"), &self.pager.page_jump_field),
            (FieldPath::new("swap.filter"), &self.swap.filter),
            (FieldPath::new("swap.animate"), &self.swap.animate),
            (FieldPath::new("swap.overlay"), &self.swap.overlay),
            (FieldPath::new("swap.mod_bar"), &self.swap.mod_bar),
            (FieldPath::new("swap.mod_bar_trigger"), &self.swap.mod_bar_trigger),
            (FieldPath::new("request.disable_submit"), &self.request.disable_submit),
        ];
        for (field, value) in selectors {
            if let Some(value) = section::non_empty(value)
                && let Err(err) = Selector::parse(value)
            {
                diag.error(field, err.to_string());
            }
        }

        if self.pager.sentinel.is_empty() {
            diag.error(FieldPath::new("pager.sentinel"), "sentinel must not be empty");
        }
        if self.pager.base_url_attr.trim().is_empty() {
            diag.error_with_hint(
                FieldPath::new("pager.base_url_attr"),
                "attribute name must not be empty",
                "the default `page-url` reads `data-page-url`",
            );
        }
        if self.pager.page < 1 {
            diag.warn(FieldPath::new("pager.page"), "pages start at 1");
        }
        if !self.title.page_format.contains("{page}") {
            diag.warn(
                FieldPath::new("title.page_format"),
                "`{page}` placeholder missing, every page gets the same title",
            );
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse a config snippet, failing on unknown keys.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PageswapConfig {
    let (parsed, ignored) = PageswapConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config contains unknown fields: {ignored:?}"
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = PageswapConfig::from_str("[swap\nreplace = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_default_is_valid() {
        let config = PageswapConfig::default();
        assert!(config.is_active());
        let diag = config.validate().unwrap();
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[swap]\nreplace = \"self\"\nunknown_key = 1\n[mystery]\nx = 2";
        let (config, ignored) = PageswapConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.swap.replace, "self");
        assert!(ignored.iter().any(|p| p == "swap.unknown_key"));
        assert!(ignored.iter().any(|p| p.starts_with("mystery")));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = test_parse_config(
            "[pager]\npager = \"a[href\"\nsentinel = \"\"\n[swap]\nanimate = \":hover\"",
        );
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        let fields: Vec<_> = diag.errors().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, ["pager.pager", "swap.animate", "pager.sentinel"]);
    }

    #[test]
    fn test_validate_inert_is_warning() {
        let config = test_parse_config("[swap]\nreplace = \"\"");
        assert!(!config.is_active());
        let diag = config.validate().unwrap();
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn test_validate_replace_spec() {
        let config = test_parse_config("[swap]\nreplace = \".a with :hover\"");
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.errors()[0].field.as_str(), "swap.replace");
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[history]\nsnapshot = true").unwrap();
        let config = PageswapConfig::from_path(file.path()).unwrap();
        assert!(config.history.snapshot);

        let missing = PageswapConfig::from_path(Path::new("/nonexistent/pageswap.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));
    }
}
