//! Error types for the printer library
//!
//! Only transport and configuration problems are errors. Encoding and layout
//! degradations (unsupported code page, truncated table rows or QR payloads)
//! never fail a document; they are reported as [`Advisory`] values instead.

use std::fmt;

use thiserror::Error;

use crate::encoding::CodePage;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer is offline or unreachable
    #[error("Printer offline: {0}")]
    Offline(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Windows spooler error
    #[cfg(windows)]
    #[error("Windows printer error: {0}")]
    WindowsPrinter(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;

/// A recoverable degradation recorded while building a document.
///
/// The bytes are still emitted; an advisory only tells the caller that the
/// printed output differs from what was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// The opcode was sent but text falls back to single-byte transliteration.
    UnsupportedCodePage(CodePage),

    /// The right column of a two-column row did not fit and was cut.
    TableOverflow { dropped: usize },

    /// The QR payload exceeded the store-data limit and was cut.
    QrTruncated { dropped: usize },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::UnsupportedCodePage(cp) => {
                write!(f, "no transcoding table for code page {cp}")
            }
            Advisory::TableOverflow { dropped } => {
                write!(f, "two-column row exceeds line width, {dropped} chars dropped")
            }
            Advisory::QrTruncated { dropped } => {
                write!(f, "QR payload exceeds store limit, {dropped} bytes dropped")
            }
        }
    }
}
