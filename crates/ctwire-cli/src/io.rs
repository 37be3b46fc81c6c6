//! File input and output, raw or hex-encoded.

use std::{fs, path::Path};

use tracing::debug;

use crate::error::CliError;

/// Read `path` as raw bytes, or as hex text when `hex` is set.
pub fn read_input(path: &Path, hex: bool) -> Result<Vec<u8>, CliError> {
    let raw = fs::read(path).map_err(|source| CliError::Io { path: path.to_owned(), source })?;

    let bytes = if hex {
        let text: Vec<u8> = raw.into_iter().filter(|byte| !byte.is_ascii_whitespace()).collect();
        hex::decode(text)?
    } else {
        raw
    };

    debug!(path = %path.display(), len = bytes.len(), hex, "read input");
    Ok(bytes)
}

/// Write `bytes` to `path`, as hex text followed by a newline when `hex` is
/// set.
pub fn write_output(path: &Path, bytes: &[u8], hex: bool) -> Result<(), CliError> {
    let contents = if hex {
        let mut text = hex::encode(bytes).into_bytes();
        text.push(b'\n');
        text
    } else {
        bytes.to_vec()
    };

    fs::write(path, &contents).map_err(|source| CliError::Io { path: path.to_owned(), source })?;
    debug!(path = %path.display(), len = contents.len(), hex, "wrote output");
    Ok(())
}
