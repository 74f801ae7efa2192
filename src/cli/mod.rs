//! Command-line interface module.

mod args;
pub mod check;
pub mod replay;

pub use args::{Cli, Commands, ReplayArgs};
