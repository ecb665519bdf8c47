//! mplex command line tool.
//!
//! Encodes and decodes Metaplex program data and builds instructions from JSON
//! arguments, printing results as JSON on stdout.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{load_registry, run};
