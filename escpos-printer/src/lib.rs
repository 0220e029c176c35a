//! # escpos-printer
//!
//! ESC/POS document encoding for thermal receipt printers.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command framing (modes, justification, code pages, feeds, cuts)
//! - Text transcoding per selected code page
//! - Two-column row layout under a fixed line width
//! - QR code command blocks
//! - Sending finished documents to network, device or Windows printers
//!
//! Business logic (WHAT to print) stays in application code.
//!
//! ## Example
//!
//! ```ignore
//! use escpos_printer::{CodePage, Document, NetworkPrinter, PrintModes, QrCode};
//!
//! let mut doc = Document::new(32);
//! doc.initialize()
//!     .encoding(CodePage::Pc850)
//!     .center()
//!     .mode(PrintModes::EMPHASIZED | PrintModes::DOUBLE_HEIGHT)
//!     .line("Café Olé")
//!     .mode(PrintModes::empty())
//!     .left()
//!     .two_column("Espresso", "2.50")
//!     .two_column("Croissant", "3.10")
//!     .rule('-')
//!     .qr(&QrCode::model2("https://example.com/r/1042"))
//!     .feed(3)
//!     .partial_cut();
//!
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! doc.emit(&printer).await?;
//! ```

pub mod command;
mod config;
mod document;
pub mod encoding;
mod error;
mod printer;
pub mod qr;
pub mod table;

// Re-exports
pub use command::{Justification, PrintModes};
pub use config::{PrinterConfig, PrinterTarget};
pub use document::{DEFAULT_LINE_WIDTH, Document, Operation};
pub use encoding::{
    BuiltinCodePages, CodePage, CodePageProvider, Latin1, TextEncoder, Transliterate, encode_text,
};
pub use error::{Advisory, PrintError, PrintResult};
pub use printer::{ConfiguredPrinter, DevicePrinter, MemoryPrinter, NetworkPrinter, Printer};
pub use qr::{QrCode, QrErrorCorrection, QrModel};
pub use table::format_row;

#[cfg(windows)]
pub use printer::WindowsPrinter;
