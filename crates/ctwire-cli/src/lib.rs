//! Operator tooling for contract descriptor wire buffers.
//!
//! A thin layer over `ctwire-proto`: every command reads a file, hands it to
//! the codec and reports the result. Commands write their report to a caller
//! supplied writer so they can run against in-memory buffers in tests.

pub mod args;
pub mod commands;
pub mod error;
pub mod io;

pub use args::{Cli, Command, GlobalOptions};
pub use commands::run;
pub use error::CliError;
