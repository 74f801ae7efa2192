//! Pageswap - in-place pagination for server-rendered pages.
//!
//! A [`Controller`] attached to a [`Window`] turns pager link clicks, page
//! jumps and history traversal into fragment requests, swaps the returned
//! markup into the page with a fade, and keeps the title, session history and
//! `<link rel="canonical|prev|next">` in step with what is shown.
//!
//! Everything outside the document (network, animation, alerts) is reached
//! through the traits in [`host`].

pub mod logger;

pub mod cli;
pub mod config;
pub mod dom;
pub mod host;
pub mod nav;
pub mod window;

pub use config::PageswapConfig;
pub use host::Host;
pub use nav::{Controller, HistoryEntry, NavigationState, PageRef, ReplaceSpec};
pub use window::Window;
