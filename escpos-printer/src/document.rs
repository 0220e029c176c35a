//! ESC/POS document stream
//!
//! A [`Document`] accumulates the bytes of one print job. Every operation is
//! lowered to its command bytes immediately and appended in call order.

use tracing::{debug, instrument, warn};

use crate::command::{self, Justification, LF, PrintModes};
use crate::config::PrinterConfig;
use crate::encoding::{CodePage, TextEncoder};
use crate::error::{Advisory, PrintResult};
use crate::printer::Printer;
use crate::qr::QrCode;
use crate::table;

/// Default characters per line (58mm paper, font A)
pub const DEFAULT_LINE_WIDTH: usize = 32;

/// One document operation.
///
/// [`Document::apply`] lowers a value of this type exactly like the matching
/// named method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    Text(String),
    Line(String),
    Raw(Vec<u8>),
    Newline,
    Mode(PrintModes),
    Justify(Justification),
    Encoding(CodePage),
    Feed(u8),
    PrintAndFeed(u8),
    LineSpacing(u8),
    TwoColumn { left: String, right: String },
    Qr(QrCode),
    Rule(char),
    StandardMode,
    PageMode,
    PartialCut,
}

/// ESC/POS document builder
///
/// Common widths:
/// - 58mm paper: 32 characters
/// - 80mm paper: 48 characters
#[derive(Debug, Clone)]
pub struct Document {
    buf: Vec<u8>,
    width: usize,
    encoder: TextEncoder,
    advisories: Vec<Advisory>,
}

impl Document {
    /// Create an empty document with the given line width in characters.
    ///
    /// Nothing is emitted; call [`Document::initialize`] first to reset the
    /// printer state left over from a previous job.
    pub fn new(width: usize) -> Self {
        Self::with_encoder(width, TextEncoder::default())
    }

    /// Create a document that encodes text with a custom encoder
    pub fn with_encoder(width: usize, encoder: TextEncoder) -> Self {
        Self {
            buf: Vec::with_capacity(4096),
            width,
            encoder,
            advisories: Vec::new(),
        }
    }

    /// Create a document from printer configuration.
    ///
    /// The configured code page only sets how text is encoded; it is not sent
    /// to the printer.
    pub fn from_config(config: &PrinterConfig) -> Self {
        Self::with_encoder(config.line_width, TextEncoder::new(config.code_page))
    }

    /// Get the configured line width
    pub fn width(&self) -> usize {
        self.width
    }

    /// The code page text is currently encoded with
    pub fn code_page(&self) -> CodePage {
        self.encoder.active()
    }

    /// Degradations recorded so far
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Bytes accumulated so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // === Printer State ===

    /// ESC @ - reset mode, justification and code page on the printer
    pub fn initialize(&mut self) -> &mut Self {
        self.raw(&command::initialize())
    }

    /// Select print mode flags (replaces the current set)
    pub fn mode(&mut self, modes: PrintModes) -> &mut Self {
        self.raw(&command::select_print_mode(modes))
    }

    pub fn justify(&mut self, justification: Justification) -> &mut Self {
        self.raw(&command::justify(justification))
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.justify(Justification::Left)
    }

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.justify(Justification::Center)
    }

    /// Align text to right
    pub fn right(&mut self) -> &mut Self {
        self.justify(Justification::Right)
    }

    /// Select a code page on the printer and encode following text with it
    pub fn encoding(&mut self, code_page: CodePage) -> &mut Self {
        if !self.encoder.supports(code_page) {
            self.advisories.push(Advisory::UnsupportedCodePage(code_page));
        }
        let frame = self.encoder.select(code_page);
        self.raw(&frame)
    }

    pub fn standard_mode(&mut self) -> &mut Self {
        self.raw(&command::standard_mode())
    }

    pub fn page_mode(&mut self) -> &mut Self {
        self.raw(&command::page_mode())
    }

    /// Set line spacing in device motion units
    pub fn line_spacing(&mut self, units: u8) -> &mut Self {
        self.raw(&command::line_spacing(units))
    }

    // === Text Output ===

    /// Write text encoded with the active code page
    pub fn text(&mut self, s: &str) -> &mut Self {
        let bytes = self.encoder.encode(s);
        self.raw(&bytes)
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s).newline()
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(LF);
        self
    }

    /// Write raw bytes directly, bypassing the encoder
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    // === Paper Control ===

    /// ESC d n - print and feed `lines` lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        if lines > 127 {
            debug!(lines, "Feed count above 127 is printer-defined");
        }
        self.raw(&command::feed_lines(lines))
    }

    /// ESC J n - print and feed paper
    pub fn print_and_feed(&mut self, n: u8) -> &mut Self {
        self.raw(&command::print_and_feed(n))
    }

    /// Partial cut (leave a small connection)
    pub fn partial_cut(&mut self) -> &mut Self {
        self.raw(&command::partial_cut())
    }

    // === Layout Helpers ===

    /// Print left and right text on the same line
    ///
    /// Left text is left-aligned, right text is right-aligned,
    /// with spaces filling the gap.
    pub fn two_column(&mut self, left: &str, right: &str) -> &mut Self {
        let row = table::layout_row(left, right, self.width);
        if row.overflowed() {
            self.advisories
                .push(Advisory::TableOverflow { dropped: row.dropped });
        }
        self.text(&row.text)
    }

    /// Print a line made of `ch` across the full width
    pub fn rule(&mut self, ch: char) -> &mut Self {
        let s: String = std::iter::repeat_n(ch, self.width).collect();
        self.line(&s)
    }

    // === QR Code ===

    /// Append a finished QR code block
    pub fn qr(&mut self, qr: &QrCode) -> &mut Self {
        if qr.dropped() > 0 {
            self.advisories.push(Advisory::QrTruncated {
                dropped: qr.dropped(),
            });
        }
        self.raw(qr.as_bytes())
    }

    // === Operations ===

    /// Lower one operation and append it
    pub fn apply(&mut self, op: &Operation) -> &mut Self {
        match op {
            Operation::Initialize => self.initialize(),
            Operation::Text(s) => self.text(s),
            Operation::Line(s) => self.line(s),
            Operation::Raw(bytes) => self.raw(bytes),
            Operation::Newline => self.newline(),
            Operation::Mode(modes) => self.mode(*modes),
            Operation::Justify(j) => self.justify(*j),
            Operation::Encoding(cp) => self.encoding(*cp),
            Operation::Feed(n) => self.feed(*n),
            Operation::PrintAndFeed(n) => self.print_and_feed(*n),
            Operation::LineSpacing(n) => self.line_spacing(*n),
            Operation::TwoColumn { left, right } => self.two_column(left, right),
            Operation::Qr(qr) => self.qr(qr),
            Operation::Rule(ch) => self.rule(*ch),
            Operation::StandardMode => self.standard_mode(),
            Operation::PageMode => self.page_mode(),
            Operation::PartialCut => self.partial_cut(),
        }
    }

    /// Lower a sequence of operations in order
    pub fn apply_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a Operation>) -> &mut Self {
        for op in ops {
            self.apply(op);
        }
        self
    }

    // === Build ===

    /// Finish the document and return its bytes
    pub fn build(self) -> Vec<u8> {
        self.buf
    }

    /// Send the document to a printer as one payload.
    ///
    /// Printer errors are returned unchanged; the document is consumed either
    /// way.
    #[instrument(skip_all, fields(len = self.buf.len()))]
    pub async fn emit<P: Printer>(self, printer: &P) -> PrintResult<()> {
        for advisory in &self.advisories {
            warn!(%advisory, "Document printed with degraded output");
        }
        printer.print(&self.buf).await
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_WIDTH)
    }
}

impl Extend<Operation> for Document {
    fn extend<I: IntoIterator<Item = Operation>>(&mut self, iter: I) {
        for op in iter {
            self.apply(&op);
        }
    }
}
