// Character classes shared by the scanner and the selector value parsers.

pub const SHIFT_PREFIX: char = '~';

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_letter(c: char) -> bool {
    c.is_alphabetic()
}

/// `[A-Za-z0-9-]`, the alphabet of opaque version ids.
pub fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// `[A-Za-z0-9_-]`, the alphabet of staging labels.
pub fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
