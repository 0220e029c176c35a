//! IBM Code Page 850 (Multilingual Latin 1)

/// Upper half of CP850, indexed by `byte - 0x80`.
pub(super) const UPPER: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤',
    // 0xD0
    'ð', 'Ð', 'Ê', 'Ë', 'È', '\u{0131}', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀',
    // 0xE0
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', '\u{00B5}', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '\u{00AF}',
    '\u{00B4}',
    // 0xF0
    '\u{00AD}', '±', '\u{2017}', '¾', '¶', '§', '÷', '\u{00B8}', '°', '\u{00A8}', '\u{00B7}',
    '¹', '³', '²', '■', '\u{00A0}',
];
