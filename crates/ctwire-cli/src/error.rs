//! CLI error type.

use std::{io, path::PathBuf};

use ctwire_proto::ProtocolError;
use thiserror::Error;

/// Errors surfaced by `ctwire` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a file failed
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Writing to the output stream failed
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    /// `--hex` input was not valid hex
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Wire buffer could not be decoded
    #[error("wire format: {0}")]
    Protocol(#[from] ProtocolError),

    /// CBOR input or output failed
    #[error("cbor: {0}")]
    Cbor(String),
}
