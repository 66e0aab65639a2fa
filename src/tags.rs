//! Tag construction and rendering.
//!
//! A tag is an unsigned 64-bit value stored big-endian on disk.  Formats
//! usually pick tags that read as text in a hex dump, either as eight ASCII
//! characters or PNG-style (`0x89 X Y Z \r \n 0x1A \n`).

use crate::error::SchemaError;

/// Build a PNG-style tag: `0x89 b0 b1 b2 0D 0A 1A 0A`.
pub fn png_style(b0: u8, b1: u8, b2: u8) -> u64 {
    u64::from_be_bytes([0x89, b0, b1, b2, 0x0D, 0x0A, 0x1A, 0x0A])
}

/// Build a tag from exactly eight ASCII characters.
pub fn from_text(text: &str) -> Result<u64, SchemaError> {
    if !text.is_ascii() {
        return Err(SchemaError::InvalidTag {
            text:   text.to_owned(),
            reason: "tag text must be ASCII",
        });
    }
    let bytes: [u8; 8] = text.as_bytes().try_into().map_err(|_| SchemaError::InvalidTag {
        text:   text.to_owned(),
        reason: "tag text must be exactly 8 bytes",
    })?;
    Ok(u64::from_be_bytes(bytes))
}

/// Parse a tag written either as `0x`-prefixed hexadecimal or as eight
/// ASCII characters.
pub fn parse(text: &str) -> Result<u64, SchemaError> {
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"));
    match digits {
        Some(digits) => {
            let invalid = || SchemaError::InvalidTag {
                text:   text.to_owned(),
                reason: "invalid 64-bit hexadecimal value",
            };
            let digits: String = digits.chars().filter(|c| *c != '_').collect();
            // from_str_radix tolerates a leading sign.
            if !digits.starts_with(|c: char| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            u64::from_str_radix(&digits, 16).map_err(|_| invalid())
        }
        None => from_text(text),
    }
}

/// Render a tag (or offset) as `0x` followed by lowercase unsigned hex.
pub fn to_hex(value: u64) -> String {
    format!("0x{value:x}")
}

/// Render the eight tag bytes as text when they are all printable ASCII.
pub fn to_text(tag: u64) -> Option<String> {
    let bytes = tag.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        Some(bytes.iter().map(|b| *b as char).collect())
    } else {
        None
    }
}
