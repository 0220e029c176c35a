//! Two-column row layout
//!
//! The left column is left-aligned and the right column right-aligned within
//! a fixed line width, with spaces filling the gap. Widths are counted in
//! characters since every supported code page is single-byte.

use tracing::warn;

use crate::encoding::{CodePage, encode_text, pad_width, text_width, truncate_width};

/// A laid-out row, including the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub text: String,
    /// Characters of the right column that did not fit
    pub dropped: usize,
}

impl Row {
    pub fn overflowed(&self) -> bool {
        self.dropped > 0
    }
}

/// Lay out `left` and `right` on one line of `line_width` characters.
///
/// When the right column plus one separating space does not fit, the row
/// degrades to `left`, two spaces and as much of `right` as the remaining
/// padding minus two allows (possibly nothing). The line is not wrapped.
pub fn layout_row(left: &str, right: &str, line_width: usize) -> Row {
    let padding = line_width as isize - text_width(left) as isize;
    let right_width = text_width(right);

    let mut text = String::with_capacity(line_width + 1);
    text.push_str(left);

    let mut dropped = 0;
    if right_width as isize + 1 > padding {
        let keep = (padding - 2).max(0) as usize;
        let kept = truncate_width(right, keep);
        dropped = right_width - text_width(kept);
        if dropped > 0 {
            warn!(
                line_width,
                dropped, "Two-column row exceeds print boundaries, truncating"
            );
        }
        text.push_str("  ");
        text.push_str(kept);
    } else {
        text.push_str(&pad_width(right, padding as usize, true));
    }

    text.push('\n');
    Row { text, dropped }
}

/// Lay out a row and encode it with PC437, the printer's power-on code page.
pub fn format_row(left: &str, right: &str, line_width: usize) -> Vec<u8> {
    encode_text(CodePage::Pc437, &layout_row(left, right, line_width).text)
}
