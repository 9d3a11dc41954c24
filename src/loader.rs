//! Hex program-text loader.
//!
//! Program files are plain text, one 16-bit instruction per line, each line
//! exactly 4 hexadecimal digits in big-endian nibble order (the first two
//! digits are the high byte). Blank lines are skipped; anything else is a
//! load failure reported with its 1-based line number. A failed parse
//! produces no bytes, so machine memory is never partially mutated.
//!
//! # Example
//! ```
//! use vole_emu::loader::parse_program;
//!
//! let image = parse_program("20FF\nC000\n").unwrap();
//! assert_eq!(image, vec![0x20, 0xFF, 0xC0, 0x00]);
//! ```

use std::path::Path;

use thiserror::Error;

use crate::machine::Fault;

/// Program load error.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The program file could not be read.
    #[error("failed to read program file: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not exactly 4 characters long.
    #[error("line {line}: '{text}' has wrong length, expected 4 hex digits")]
    BadLineLength { line: usize, text: String },

    /// A line contains a non-hexadecimal character.
    #[error("line {line}: '{text}' is not a hexadecimal number")]
    BadHexDigit { line: usize, text: String },

    /// The parsed image does not fit in machine memory.
    #[error(transparent)]
    Image(#[from] Fault),
}

/// Parse hex program text into a byte image, two bytes per line.
pub fn parse_program(text: &str) -> Result<Vec<u8>, LoadError> {
    let mut image = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let text = raw_line.trim();
        if text.is_empty() {
            continue;
        }

        if text.len() != 4 {
            return Err(LoadError::BadLineLength {
                line,
                text: text.to_string(),
            });
        }

        let word = u16::from_str_radix(text, 16).map_err(|_| LoadError::BadHexDigit {
            line,
            text: text.to_string(),
        })?;

        image.extend_from_slice(&word.to_be_bytes());
    }

    log::debug!("parsed {} instruction bytes", image.len());
    Ok(image)
}

/// Read and parse a program file.
pub fn load_program_file(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    log::info!("loading program from {}", path.display());
    parse_program(&text)
}
