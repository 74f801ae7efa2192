//! Navigation: page inference, target resolution, the request gate, history
//! and SEO upkeep, and the controller tying them together.
//!
//! # Module Structure
//!
//! ```text
//! nav/
//! ├── page.rs        # PageRef, page inference, URL templates, jump input
//! ├── replace.rs     # ReplaceSpec, target resolution, SwapPlan
//! ├── gate.rs        # Single-flight request gate
//! ├── state.rs       # NavigationState, HistoryEntry
//! ├── seo.rs         # canonical / prev / next links
//! ├── response.rs    # Response JSON shape
//! ├── selectors.rs   # Selectors compiled from config
//! ├── controller.rs  # Controller: wiring, requests, response handling
//! └── swap.rs        # Animated swap pipeline
//! ```

mod controller;
mod gate;
mod page;
mod replace;
mod response;
mod selectors;
mod seo;
mod state;
mod swap;

#[cfg(test)]
mod tests;

pub use controller::{Controller, Origin};
pub use gate::{RequestGate, Ticket};
pub use page::{PageRef, build_url, infer_page, jump_page, parse_int};
pub use replace::{NewSource, OldTarget, ReplaceSpec, ResolveError, ResolveInput, SELF_TARGET, SwapPlan};
pub use response::{ErrorList, HtmlPayload, Response};
pub use selectors::Selectors;
pub use seo::{SeoLinks, SeoSnapshot};
pub use state::{HistoryEntry, NavigationState};
