//! Command-line interface for headsong
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point, config discovery and command dispatch
//! - `commands`: command implementations and output rendering
//! - `tests`: flag parsing tests (cfg(test) only)

pub mod args;
mod commands;
mod run;

#[cfg(test)]
mod tests;

pub use args::{Cli, Commands, NewsArgs, build_cli};
pub use run::run;
