//! Colour decoding and formatting for shadow documents.
//!
//! Shadow payloads carry colours as bare hexadecimal text (`"FF0000"`).
//! Decoding is deliberately permissive: anything that does not parse as hex
//! becomes `0` (black). A garbled colour dims the strip, it never takes the
//! daemon down.

/// Decode shadow colour text into a 24-bit RGB value.
///
/// Case-insensitive hex with an optional leading `#` and surrounding
/// whitespace tolerated. Malformed input (empty, non-hex characters,
/// overflow) decodes to `0`.
pub fn decode_color(s: &str) -> u32 {
    let trimmed = s.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    u32::from_str_radix(hex, 16)
        .map(|c| c & 0xFF_FFFF)
        .unwrap_or(0)
}

/// Format a 24-bit RGB value in the wire form: uppercase, six digits, no
/// prefix (`0xFF0000` → `"FF0000"`).
pub fn format_color(color: u32) -> String {
    format!("{:06X}", color & 0xFF_FFFF)
}
