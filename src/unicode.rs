//! qUTF-8 (quite like UTF-8) round-tripping and display-width helpers.
//!
//! Internally every buffer in this crate holds valid Rust `String`/`str`
//! data. To still round-trip terminal input that is not valid UTF-8 (or
//! that arrived via some other 8-bit encoding) we encode each rogue byte
//! as a private-use code point in `U+EE000..=U+EE0FF`, the "raw plane".
//! Decoding maps such a code point straight back to its original byte.

use unicode_width::UnicodeWidthChar;

/// First code point of the raw plane used to smuggle invalid bytes through
/// a `String`.
const RAW_PLANE_START: u32 = 0xEE000;
const RAW_PLANE_END: u32 = 0xEE0FF;

/// Encode a single byte that could not be decoded as UTF-8 into its raw
/// plane code point.
pub fn raw_byte_to_char(byte: u8) -> char {
    char::from_u32(RAW_PLANE_START + byte as u32).expect("raw plane code points are valid")
}

/// If `c` is a raw plane code point, return the original byte it encodes.
pub fn char_to_raw_byte(c: char) -> Option<u8> {
    let cp = c as u32;
    if (RAW_PLANE_START..=RAW_PLANE_END).contains(&cp) {
        Some((cp - RAW_PLANE_START) as u8)
    } else {
        None
    }
}

/// Decode an arbitrary byte slice into a `String`, preserving invalid
/// bytes losslessly via the raw plane so that `decode_qutf8(bytes)` can be
/// turned back into the exact original bytes with [`encode_qutf8`].
pub fn decode_qutf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, after_valid) = rest.split_at(e.valid_up_to());
                // SAFETY: `valid` was just validated by `from_utf8`.
                out.push_str(unsafe { std::str::from_utf8_unchecked(valid) });
                let bad_len = e.error_len().unwrap_or(after_valid.len().max(1));
                let bad_len = bad_len.max(1);
                for &b in &after_valid[..bad_len.min(after_valid.len())] {
                    out.push(raw_byte_to_char(b));
                }
                rest = &after_valid[bad_len.min(after_valid.len())..];
                if rest.is_empty() {
                    break;
                }
            }
        }
    }
    out
}

/// Inverse of [`decode_qutf8`]: raw plane code points are emitted as their
/// original byte, everything else is re-encoded as UTF-8.
pub fn encode_qutf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        if let Some(b) = char_to_raw_byte(c) {
            out.push(b);
        } else {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
    }
    out
}

/// Display width of a single code point: East-Asian wide glyphs are 2
/// columns, zero-width/combining marks and control characters are 0, and
/// a raw-plane smuggled byte counts as the single column its `\xHH`
/// fallback glyph would occupy.
pub fn char_display_width(c: char) -> usize {
    if c == '\n' {
        return 0;
    }
    if char_to_raw_byte(c).is_some() {
        return 1;
    }
    let cp = c as u32;
    if cp < 0x20 || cp == 0x7f {
        return 0;
    }
    UnicodeWidthChar::width(c).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_valid_utf8() {
        let bytes = "hello, 世界".as_bytes();
        assert_eq!(encode_qutf8(&decode_qutf8(bytes)), bytes);
    }

    #[test]
    fn round_trips_invalid_bytes() {
        let bytes: &[u8] = &[b'a', 0xFF, 0xFE, b'b', 0x80];
        let decoded = decode_qutf8(bytes);
        assert_eq!(encode_qutf8(&decoded), bytes);
    }

    #[test]
    fn widths() {
        assert_eq!(char_display_width('a'), 1);
        assert_eq!(char_display_width('\n'), 0);
        assert_eq!(char_display_width('\u{0007}'), 0);
        assert_eq!(char_display_width('\u{4E2D}'), 2); // 中
        assert_eq!(char_display_width('\u{0301}'), 0); // combining acute
    }
}
