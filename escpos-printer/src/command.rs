//! ESC/POS command frames
//!
//! Every function here is pure and returns the exact bytes of one command.
//! Multi-byte parameters are single bytes unless noted.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::encoding::CodePage;

pub const ESC: u8 = 0x1B;
pub const GS: u8 = 0x1D;
pub const LF: u8 = 0x0A;

bitflags! {
    /// Character print mode flags for `ESC ! n`.
    ///
    /// The empty set is standard mode (font A, no emphasis, normal size).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PrintModes: u8 {
        const FONT_2        = 0x01;
        const EMPHASIZED    = 0x08;
        const DOUBLE_HEIGHT = 0x10;
        const DOUBLE_WIDTH  = 0x20;
        const UNDERLINE     = 0x80;
    }
}

impl Default for PrintModes {
    fn default() -> Self {
        PrintModes::empty()
    }
}

/// Horizontal alignment for `ESC a n`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justification {
    #[default]
    Left,
    Center,
    Right,
}

impl Justification {
    pub const fn value(self) -> u8 {
        match self {
            Justification::Left => 0x30,
            Justification::Center => 0x31,
            Justification::Right => 0x32,
        }
    }
}

/// ESC @ - initialize printer
///
/// Clears print mode, justification and code page on the device.
pub const fn initialize() -> [u8; 2] {
    [ESC, b'@']
}

/// ESC ! n - select print mode
pub const fn select_print_mode(modes: PrintModes) -> [u8; 3] {
    [ESC, b'!', modes.bits()]
}

/// ESC a n - select justification
pub const fn justify(justification: Justification) -> [u8; 3] {
    [ESC, b'a', justification.value()]
}

/// ESC t n - select character code page
pub const fn select_code_page(code_page: CodePage) -> [u8; 3] {
    [ESC, b't', code_page.value()]
}

/// ESC L - select page mode off (standard mode)
pub const fn standard_mode() -> [u8; 2] {
    [ESC, b'L']
}

/// ESC S - select page mode
pub const fn page_mode() -> [u8; 2] {
    [ESC, b'S']
}

/// ESC m - partial cut
pub const fn partial_cut() -> [u8; 2] {
    [ESC, b'm']
}

/// ESC J n - print buffer and feed paper
pub const fn print_and_feed(n: u8) -> [u8; 3] {
    [ESC, b'J', n]
}

/// ESC d n - print buffer and feed `lines` lines
///
/// Printers treat `n` as 0-127 on some models; callers stay in that range.
pub const fn feed_lines(lines: u8) -> [u8; 3] {
    [ESC, b'd', lines]
}

/// ESC 3 n - set line spacing in device motion units
pub const fn line_spacing(units: u8) -> [u8; 3] {
    [ESC, b'3', units]
}
