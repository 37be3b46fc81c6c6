//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ctwire_proto::{DecodeOptions, decode::DEFAULT_MAX_INPUT_LEN, skip::DEFAULT_RECURSION_LIMIT};

/// Inspect and convert contract descriptor wire buffers.
#[derive(Debug, Parser)]
#[command(name = "ctwire", version, about)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub options: GlobalOptions,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// Read and write wire buffers as hex text instead of raw bytes
    #[arg(long, global = true)]
    pub hex: bool,

    /// Reject inputs larger than this many bytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_INPUT_LEN)]
    pub max_input: usize,

    /// Maximum nesting depth of records and groups
    #[arg(long, global = true, default_value_t = DEFAULT_RECURSION_LIMIT)]
    pub recursion_limit: u32,

    /// Log filter (e.g. `debug`, `ctwire_proto=trace`); falls back to RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl GlobalOptions {
    /// Decoder limits selected on the command line.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions { max_input_len: self.max_input, recursion_limit: self.recursion_limit }
    }
}

/// `ctwire` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Decode a contract and print its record tree
    Inspect {
        /// Wire buffer to read
        input: PathBuf,
    },

    /// List the raw top-level fields of a buffer without a schema
    Fields {
        /// Wire buffer to read
        input: PathBuf,
    },

    /// Decode and re-encode a contract, reporting whether the bytes survive
    Reencode {
        /// Wire buffer to read
        input: PathBuf,
        /// Where to write the re-encoded buffer
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a wire buffer into a CBOR rendering of the contract
    ToCbor {
        /// Wire buffer to read
        input: PathBuf,
        /// Where to write the CBOR document
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a CBOR rendering of a contract into a wire buffer
    FromCbor {
        /// CBOR document to read
        input: PathBuf,
        /// Where to write the wire buffer
        #[arg(short, long)]
        output: PathBuf,
    },
}
