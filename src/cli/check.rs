//! `pageswap check`: load and validate a controller config.

use std::path::Path;

use anyhow::Result;

use crate::config::{ConfigError, PageswapConfig};
use crate::log;
use crate::nav::{OldTarget, ReplaceSpec};

/// Load `path`, print warnings, fail on any validation error.
pub fn check_config(path: &Path) -> Result<PageswapConfig> {
    let config = PageswapConfig::from_path(path)?;

    match config.validate() {
        Ok(diag) => diag.print_warnings(),
        Err(ConfigError::Diagnostics(diag)) => {
            diag.print_warnings();
            return Err(ConfigError::Diagnostics(diag).into());
        }
        Err(err) => return Err(err.into()),
    }

    if config.is_active() {
        log!("check"; "{}: {}", path.display(), summary(&config));
    } else {
        log!("check"; "{}: valid, but the controller stays inert", path.display());
    }
    Ok(config)
}

fn summary(config: &PageswapConfig) -> String {
    let target = match ReplaceSpec::parse(&config.swap.replace) {
        Ok(Some(spec)) => match spec.old {
            OldTarget::SelfElement => format!("self with `{}`", spec.new.as_str()),
            OldTarget::Selector(old) if old == spec.new => format!("`{}`", old.as_str()),
            OldTarget::Selector(old) => format!("`{}` with `{}`", old.as_str(), spec.new.as_str()),
        },
        _ => "nothing".to_string(),
    };
    let history = if config.history.snapshot { "snapshots" } else { "refetch" };
    format!(
        "replaces {target} on `{}` clicks, {} requests, history by {history}",
        config.pager.pager.trim(),
        config.request.method
    )
}
