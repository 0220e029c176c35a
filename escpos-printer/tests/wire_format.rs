// escpos-printer/tests/wire_format.rs
// Byte-exact output of the public document API

use escpos_printer::command;
use escpos_printer::{
    Advisory, CodePage, Document, Justification, Operation, PrintModes, QrCode,
    QrErrorCorrection, QrModel, TextEncoder, encode_text, format_row,
};

#[test]
fn test_select_encoding_is_three_bytes() {
    let pages = [
        (CodePage::Pc437, 0),
        (CodePage::Katakana, 1),
        (CodePage::Pc850, 2),
        (CodePage::Pc860, 3),
        (CodePage::Pc866, 17),
        (CodePage::Pc852, 18),
        (CodePage::Iso8859_2, 39),
        (CodePage::Iso8859_15, 40),
    ];
    for (cp, value) in pages {
        let mut doc = Document::new(32);
        doc.encoding(cp);
        assert_eq!(doc.build(), vec![0x1B, b't', value]);
    }
}

#[test]
fn test_combined_modes() {
    let mut doc = Document::new(32);
    doc.mode(PrintModes::FONT_2 | PrintModes::UNDERLINE | PrintModes::DOUBLE_HEIGHT);
    assert_eq!(doc.build(), vec![0x1B, b'!', 0x91]);
}

#[test]
fn test_initialize_mode_text_newline_order() {
    let mut doc = Document::new(32);
    doc.initialize()
        .mode(PrintModes::UNDERLINE)
        .text("hi")
        .newline();
    assert_eq!(
        doc.build(),
        vec![0x1B, b'@', 0x1B, b'!', 0x80, b'h', b'i', b'\n']
    );
}

#[test]
fn test_two_column_fixtures() {
    assert_eq!(format_row("AB", "12", 10), b"AB      12\n".to_vec());

    let a30 = "A".repeat(30);
    assert_eq!(format_row(&a30, "X", 32), format!("{a30} X\n").into_bytes());

    let a31 = "A".repeat(31);
    assert_eq!(format_row(&a31, "XY", 32), format!("{a31}  \n").into_bytes());
}

#[test]
fn test_qr_length_field() {
    for len in [0usize, 1, 252, 253, 7088, 7089, 7090, 10_000] {
        let qr = QrCode::new(QrModel::Model2, 3, QrErrorCorrection::L, vec![b'9'; len]);
        let b = qr.as_bytes();
        let field = b[28] as usize | (b[29] as usize) << 8;
        assert_eq!(field, (len + 3).min(7092), "payload {len}");
        // header(33) + stored payload + print trigger(8)
        assert_eq!(b.len(), 33 + (field - 3) + 8);
    }
}

#[test]
fn test_truncation_never_panics() {
    let mut doc = Document::new(32);
    doc.qr(&QrCode::model2(vec![b'z'; 10_000]))
        .two_column("Item", &"r".repeat(1000));

    assert_eq!(
        doc.advisories(),
        &[
            Advisory::QrTruncated { dropped: 2911 },
            Advisory::TableOverflow { dropped: 974 },
        ]
    );
}

#[test]
fn test_encoding_is_repeatable() {
    for cp in [CodePage::Pc437, CodePage::Pc850, CodePage::Iso8859_2, CodePage::Pc860] {
        assert_eq!(encode_text(cp, "Zürich ½ €"), encode_text(cp, "Zürich ½ €"));
    }

    let mut doc = Document::new(32);
    doc.encoding(CodePage::Iso8859_15).text("€5").text("€5");
    assert_eq!(doc.build()[3..], [0xA4, b'5', 0xA4, b'5']);
}

#[test]
fn test_operations_concatenate_individual_frames() {
    let ops = [
        Operation::Initialize,
        Operation::Justify(Justification::Right),
        Operation::LineSpacing(24),
        Operation::Text("x".into()),
        Operation::PrintAndFeed(2),
    ];

    let mut doc = Document::new(32);
    doc.apply_all(&ops);

    let expected = [
        &command::initialize()[..],
        &command::justify(Justification::Right)[..],
        &command::line_spacing(24)[..],
        &b"x"[..],
        &command::print_and_feed(2)[..],
    ]
    .concat();
    assert_eq!(doc.build(), expected);
}

#[test]
fn test_custom_code_page_passes_through() {
    let mut doc = Document::with_encoder(32, TextEncoder::new(CodePage::Pc437));
    doc.encoding(CodePage::Custom(255)).text("ok");
    assert_eq!(doc.build(), vec![0x1B, b't', 255, b'o', b'k']);
}
