//! `[history]` and `[timing]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [history]
//! snapshot = false     # Store fragment markup + title in history entries
//!
//! [timing]
//! settle_ms = 300      # Gate release / re-enable delay after a request
//! jump_bind_ms = 100   # Deferral before (re)binding the page-jump submit
//! mod_bar_ms = 100     # Moderation bar fade before replacement
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Restore back/forward from stored markup instead of refetching.
    pub snapshot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub settle_ms: u64,
    pub jump_bind_ms: u64,
    pub mod_bar_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 300,
            jump_bind_ms: 100,
            mod_bar_ms: 100,
        }
    }
}

impl TimingConfig {
    #[inline]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[inline]
    pub fn jump_bind(&self) -> Duration {
        Duration::from_millis(self.jump_bind_ms)
    }

    #[inline]
    pub fn mod_bar(&self) -> Duration {
        Duration::from_millis(self.mod_bar_ms)
    }
}
