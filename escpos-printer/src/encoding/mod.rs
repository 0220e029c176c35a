//! Code page selection and text transcoding
//!
//! ESC/POS printers interpret text bytes through the code page selected with
//! `ESC t n`. This module provides:
//! - The [`CodePage`] identifiers and their protocol values
//! - A pluggable [`CodePageProvider`] that owns the transcoding tables
//! - A pluggable [`Transliterate`] fallback used when no table exists
//! - [`TextEncoder`], which tracks the active code page of one document
//! - Width helpers for fixed-width line layout

mod cp437;
mod cp850;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::command;

/// Character code page understood by the printer.
///
/// Values outside the named set are passed through as [`CodePage::Custom`];
/// many printers define vendor-specific tables above the standard ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CodePage {
    #[default]
    Pc437,
    Katakana,
    Pc850,
    Pc860,
    Pc866,
    Pc852,
    Iso8859_2,
    Iso8859_15,
    Custom(u8),
}

impl CodePage {
    /// The `n` parameter of `ESC t n`.
    pub const fn value(self) -> u8 {
        match self {
            CodePage::Pc437 => 0,
            CodePage::Katakana => 1,
            CodePage::Pc850 => 2,
            CodePage::Pc860 => 3,
            CodePage::Pc866 => 17,
            CodePage::Pc852 => 18,
            CodePage::Iso8859_2 => 39,
            CodePage::Iso8859_15 => 40,
            CodePage::Custom(n) => n,
        }
    }

    /// Map a protocol value back to a code page, keeping unknown values.
    pub const fn from_value(value: u8) -> Self {
        match value {
            0 => CodePage::Pc437,
            1 => CodePage::Katakana,
            2 => CodePage::Pc850,
            3 => CodePage::Pc860,
            17 => CodePage::Pc866,
            18 => CodePage::Pc852,
            39 => CodePage::Iso8859_2,
            40 => CodePage::Iso8859_15,
            n => CodePage::Custom(n),
        }
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodePage::Pc437 => f.write_str("PC437"),
            CodePage::Katakana => f.write_str("KATAKANA"),
            CodePage::Pc850 => f.write_str("PC850"),
            CodePage::Pc860 => f.write_str("PC860"),
            CodePage::Pc866 => f.write_str("PC866"),
            CodePage::Pc852 => f.write_str("PC852"),
            CodePage::Iso8859_2 => f.write_str("ISO8859-2"),
            CodePage::Iso8859_15 => f.write_str("ISO8859-15"),
            CodePage::Custom(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for CodePage {
    type Err = String;

    /// Accepts the display names (case-insensitive, `_` or `-`) or a raw number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase().replace('_', "-");
        let cp = match name.as_str() {
            "PC437" | "CP437" => CodePage::Pc437,
            "KATAKANA" => CodePage::Katakana,
            "PC850" | "CP850" => CodePage::Pc850,
            "PC860" | "CP860" => CodePage::Pc860,
            "PC866" | "CP866" => CodePage::Pc866,
            "PC852" | "CP852" => CodePage::Pc852,
            "ISO8859-2" | "ISO-8859-2" => CodePage::Iso8859_2,
            "ISO8859-15" | "ISO-8859-15" => CodePage::Iso8859_15,
            other => {
                let n: u8 = other
                    .parse()
                    .map_err(|_| format!("Unknown code page: {}", s))?;
                CodePage::from_value(n)
            }
        };
        Ok(cp)
    }
}

impl TryFrom<String> for CodePage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CodePage> for String {
    fn from(cp: CodePage) -> Self {
        cp.to_string()
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Source of transcoding tables.
///
/// `encode` returns `None` when the provider has no table for the code page;
/// callers then fall back to a [`Transliterate`] strategy.
pub trait CodePageProvider: Send + Sync {
    /// Whether a table exists for this code page
    fn supports(&self, code_page: CodePage) -> bool;

    /// Encode text with the table for `code_page`
    fn encode(&self, code_page: CodePage, text: &str) -> Option<Vec<u8>>;
}

/// Best-effort single-byte encoding used when no table is available.
pub trait Transliterate: Send + Sync {
    fn transliterate(&self, text: &str) -> Vec<u8>;
}

/// Latin-1 fallback: U+0000..=U+00FF map to the same byte, everything else
/// becomes `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl Transliterate for Latin1 {
    fn transliterate(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }
}

/// Tables shipped with the crate.
///
/// PC437 and PC850 use built-in tables; PC866, ISO8859-2 and ISO8859-15 are
/// delegated to `encoding_rs`. Unmappable characters become `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCodePages;

impl CodePageProvider for BuiltinCodePages {
    fn supports(&self, code_page: CodePage) -> bool {
        matches!(
            code_page,
            CodePage::Pc437
                | CodePage::Pc850
                | CodePage::Pc866
                | CodePage::Iso8859_2
                | CodePage::Iso8859_15
        )
    }

    fn encode(&self, code_page: CodePage, text: &str) -> Option<Vec<u8>> {
        match code_page {
            CodePage::Pc437 => Some(encode_table(&cp437::UPPER, text)),
            CodePage::Pc850 => Some(encode_table(&cp850::UPPER, text)),
            CodePage::Pc866 => Some(encode_rs(encoding_rs::IBM866, text)),
            CodePage::Iso8859_2 => Some(encode_rs(encoding_rs::ISO_8859_2, text)),
            CodePage::Iso8859_15 => Some(encode_rs(encoding_rs::ISO_8859_15, text)),
            _ => None,
        }
    }
}

/// Encode against a 128-entry upper-half table; ASCII passes through.
fn encode_table(upper: &[char; 128], text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c as u8);
        } else if let Some(idx) = upper.iter().position(|&u| u == c) {
            out.push(0x80 + idx as u8);
        } else {
            out.push(b'?');
        }
    }
    out
}

/// Encode char by char so unmappable characters become `?` instead of the
/// HTML numeric references `encoding_rs` substitutes by default.
fn encode_rs(encoding: &'static encoding_rs::Encoding, text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut tmp = [0u8; 4];
    for c in text.chars() {
        let (cow, _, had_errors) = encoding.encode(c.encode_utf8(&mut tmp));
        if had_errors {
            out.push(b'?');
        } else {
            out.extend_from_slice(&cow);
        }
    }
    out
}

/// Encode text for a code page using the built-in tables and Latin-1 fallback.
pub fn encode_text(code_page: CodePage, text: &str) -> Vec<u8> {
    BuiltinCodePages
        .encode(code_page, text)
        .unwrap_or_else(|| Latin1.transliterate(text))
}

// ============================================================================
// Stateful encoder
// ============================================================================

/// Tracks the active code page of one document and transcodes text with it.
#[derive(Clone)]
pub struct TextEncoder {
    provider: Arc<dyn CodePageProvider>,
    fallback: Arc<dyn Transliterate>,
    active: CodePage,
}

impl TextEncoder {
    /// Create an encoder whose active code page is `code_page`.
    ///
    /// No opcode is produced; the printer is assumed to already use it.
    pub fn new(code_page: CodePage) -> Self {
        Self {
            provider: Arc::new(BuiltinCodePages),
            fallback: Arc::new(Latin1),
            active: code_page,
        }
    }

    /// Replace the table provider
    pub fn with_provider(mut self, provider: impl CodePageProvider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Replace the fallback strategy
    pub fn with_fallback(mut self, fallback: impl Transliterate + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    /// The code page text is currently encoded with
    pub fn active(&self) -> CodePage {
        self.active
    }

    /// Whether the provider has a table for `code_page`
    pub fn supports(&self, code_page: CodePage) -> bool {
        self.provider.supports(code_page)
    }

    /// Switch the active code page and return the `ESC t n` frame.
    ///
    /// The frame is produced even when no table exists; text then falls back
    /// to transliteration.
    pub fn select(&mut self, code_page: CodePage) -> [u8; 3] {
        if !self.provider.supports(code_page) {
            warn!(code_page = %code_page, "No transcoding table, falling back to transliteration");
        }
        self.active = code_page;
        command::select_code_page(code_page)
    }

    /// Encode text with the active code page
    pub fn encode(&self, text: &str) -> Vec<u8> {
        self.encode_with(self.active, text)
    }

    /// Encode text with an explicit code page, ignoring the active one
    #[instrument(level = "trace", skip(self, text), fields(len = text.len()))]
    pub fn encode_with(&self, code_page: CodePage, text: &str) -> Vec<u8> {
        self.provider
            .encode(code_page, text)
            .unwrap_or_else(|| self.fallback.transliterate(text))
    }
}

impl Default for TextEncoder {
    fn default() -> Self {
        Self::new(CodePage::default())
    }
}

impl fmt::Debug for TextEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEncoder")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Width helpers
// ============================================================================

/// Printed width of a string in characters.
///
/// Every supported code page is single-byte, so one character occupies one
/// column.
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string to at most `max_width` characters
pub fn truncate_width(s: &str, max_width: usize) -> &str {
    match s.char_indices().nth(max_width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Pad a string with spaces to `width` characters.
///
/// Longer strings are returned unchanged.
pub fn pad_width(s: &str, width: usize, align_right: bool) -> String {
    let current = text_width(s);
    if current >= width {
        return s.to_string();
    }
    let spaces = " ".repeat(width - current);
    if align_right {
        format!("{}{}", spaces, s)
    } else {
        format!("{}{}", s, spaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CodePage; 8] = [
        CodePage::Pc437,
        CodePage::Katakana,
        CodePage::Pc850,
        CodePage::Pc860,
        CodePage::Pc866,
        CodePage::Pc852,
        CodePage::Iso8859_2,
        CodePage::Iso8859_15,
    ];

    #[test]
    fn test_select_frame_for_every_code_page() {
        let mut enc = TextEncoder::default();
        for cp in ALL {
            assert_eq!(enc.select(cp), [0x1B, b't', cp.value()]);
            assert_eq!(enc.active(), cp);
        }
        assert_eq!(enc.select(CodePage::Custom(255)), [0x1B, b't', 255]);
    }

    #[test]
    fn test_value_round_trip() {
        for cp in ALL {
            assert_eq!(CodePage::from_value(cp.value()), cp);
        }
        assert_eq!(CodePage::from_value(99), CodePage::Custom(99));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("pc850".parse::<CodePage>().unwrap(), CodePage::Pc850);
        assert_eq!("ISO8859_15".parse::<CodePage>().unwrap(), CodePage::Iso8859_15);
        assert_eq!("iso-8859-2".parse::<CodePage>().unwrap(), CodePage::Iso8859_2);
        assert_eq!("17".parse::<CodePage>().unwrap(), CodePage::Pc866);
        assert_eq!("42".parse::<CodePage>().unwrap(), CodePage::Custom(42));
        assert!("EBCDIC".parse::<CodePage>().is_err());
    }

    #[test]
    fn test_builtin_tables() {
        assert_eq!(encode_text(CodePage::Pc437, "Ça"), vec![0x80, b'a']);
        assert_eq!(encode_text(CodePage::Pc437, "½°"), vec![0xAB, 0xF8]);
        assert_eq!(encode_text(CodePage::Pc850, "Øß"), vec![0x9D, 0xE1]);
        assert_eq!(encode_text(CodePage::Pc866, "Жa"), vec![0x86, b'a']);
        assert_eq!(encode_text(CodePage::Iso8859_2, "Łź"), vec![0xA3, 0xBC]);
        assert_eq!(encode_text(CodePage::Iso8859_15, "€"), vec![0xA4]);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        assert_eq!(encode_text(CodePage::Pc437, "a€b"), b"a?b".to_vec());
        assert_eq!(encode_text(CodePage::Iso8859_15, "日"), b"?".to_vec());
    }

    #[test]
    fn test_fallback_is_latin1() {
        // PC852 has a protocol value but no table
        assert_eq!(encode_text(CodePage::Pc852, "é"), vec![0xE9]);
        assert_eq!(encode_text(CodePage::Katakana, "ア"), b"?".to_vec());
        assert_eq!(encode_text(CodePage::Custom(77), "hi"), b"hi".to_vec());
    }

    #[test]
    fn test_non_empty_output_for_non_empty_input() {
        for cp in ALL {
            assert_eq!(encode_text(cp, "x€日").len(), 3);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let enc = TextEncoder::new(CodePage::Pc850);
        assert_eq!(enc.encode("Grüße"), enc.encode("Grüße"));
    }

    #[test]
    fn test_custom_fallback() {
        struct Dashes;
        impl Transliterate for Dashes {
            fn transliterate(&self, text: &str) -> Vec<u8> {
                vec![b'-'; text.chars().count()]
            }
        }

        let mut enc = TextEncoder::default().with_fallback(Dashes);
        enc.select(CodePage::Pc860);
        assert_eq!(enc.encode("olá"), b"---".to_vec());
    }

    #[test]
    fn test_custom_provider() {
        struct Upper;
        impl CodePageProvider for Upper {
            fn supports(&self, _: CodePage) -> bool {
                true
            }
            fn encode(&self, _: CodePage, text: &str) -> Option<Vec<u8>> {
                Some(text.to_ascii_uppercase().into_bytes())
            }
        }

        let enc = TextEncoder::new(CodePage::Katakana).with_provider(Upper);
        assert!(enc.supports(CodePage::Katakana));
        assert_eq!(enc.encode("abc"), b"ABC".to_vec());
    }

    #[test]
    fn test_width_helpers() {
        assert_eq!(text_width("héllo"), 5);
        assert_eq!(truncate_width("héllo", 2), "hé");
        assert_eq!(truncate_width("hi", 5), "hi");
        assert_eq!(pad_width("hi", 5, false), "hi   ");
        assert_eq!(pad_width("hi", 5, true), "   hi");
        assert_eq!(pad_width("hello world", 5, true), "hello world");
    }
}
