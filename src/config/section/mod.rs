//! Configuration section definitions.
//!
//! Each module corresponds to one or more sections in `pageswap.toml`:
//!
//! | Module    | TOML Section              | Purpose                            |
//! |-----------|---------------------------|------------------------------------|
//! | `pager`   | `[pager]`                 | Pager selectors, URL template      |
//! | `swap`    | `[swap]`                  | Replace spec, animation, overlay   |
//! | `request` | `[request]`               | Method, form data, redirect/flash  |
//! | `history` | `[history]`, `[timing]`   | Snapshots, delays                  |
//! | `text`    | `[title]`, `[phrases]`    | Title format, user-facing phrases  |

mod history;
mod pager;
mod request;
mod swap;
mod text;

pub use history::{HistoryConfig, TimingConfig};
pub use pager::PagerConfig;
pub use request::{RequestConfig, RequestMethod};
pub use swap::{SwapConfig, TargetScope};
pub use text::{PhrasesConfig, TitleConfig};

pub(crate) use swap::non_empty;
