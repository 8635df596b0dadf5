//! Text canonicalization and legacy EBCDIC decoding.
//!
//! ## Canonical Form
//!
//! Text values arrive padded: fixed-width fields from the capacity table end in
//! blanks, lines read from the export filesystem end in a newline. Before a
//! value is compared or stored, trailing spaces and newlines are stripped.
//! Leading characters are kept as-is.
//!
//! ## EBCDIC Buffers
//!
//! The diagnostic instruction returns names as fixed-length buffers in code
//! page IBM-1047. A buffer is decoded byte by byte up to the first NUL.
//!
//! - A buffer made only of EBCDIC blanks (`0x40`) or only of zero bytes is the
//!   "not set" sentinel: nothing is decoded and nothing is stored.
//! - A byte that decodes to a control character (other than tab or newline) is
//!   malformed and fails the decode.

/// EBCDIC blank, used by the diagnostic instruction to mark unset fields.
pub const EBCDIC_BLANK: u8 = 0x40;

/// IBM-1047 to ISO-8859-1. The Latin-1 code point equals the Unicode scalar.
const IBM1047_TO_LATIN1: [u8; 256] = [
    0x00, 0x01, 0x02, 0x03, 0x9C, 0x09, 0x86, 0x7F, 0x97, 0x8D, 0x8E, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
    0x10, 0x11, 0x12, 0x13, 0x9D, 0x0A, 0x08, 0x87, 0x18, 0x19, 0x92, 0x8F, 0x1C, 0x1D, 0x1E, 0x1F,
    0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x17, 0x1B, 0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x05, 0x06, 0x07,
    0x90, 0x91, 0x16, 0x93, 0x94, 0x95, 0x96, 0x04, 0x98, 0x99, 0x9A, 0x9B, 0x14, 0x15, 0x9E, 0x1A,
    0x20, 0xA0, 0xE2, 0xE4, 0xE0, 0xE1, 0xE3, 0xE5, 0xE7, 0xF1, 0xA2, 0x2E, 0x3C, 0x28, 0x2B, 0x7C,
    0x26, 0xE9, 0xEA, 0xEB, 0xE8, 0xED, 0xEE, 0xEF, 0xEC, 0xDF, 0x21, 0x24, 0x2A, 0x29, 0x3B, 0x5E,
    0x2D, 0x2F, 0xC2, 0xC4, 0xC0, 0xC1, 0xC3, 0xC5, 0xC7, 0xD1, 0xA6, 0x2C, 0x25, 0x5F, 0x3E, 0x3F,
    0xF8, 0xC9, 0xCA, 0xCB, 0xC8, 0xCD, 0xCE, 0xCF, 0xCC, 0x60, 0x3A, 0x23, 0x40, 0x27, 0x3D, 0x22,
    0xD8, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0xAB, 0xBB, 0xF0, 0xFD, 0xFE, 0xB1,
    0xB0, 0x6A, 0x6B, 0x6C, 0x6D, 0x6E, 0x6F, 0x70, 0x71, 0x72, 0xAA, 0xBA, 0xE6, 0xB8, 0xC6, 0xA4,
    0xB5, 0x7E, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0xA1, 0xBF, 0xD0, 0x5B, 0xDE, 0xAE,
    0xAC, 0xA3, 0xA5, 0xB7, 0xA9, 0xA7, 0xB6, 0xBC, 0xBD, 0xBE, 0xDD, 0xA8, 0xAF, 0x5D, 0xB4, 0xD7,
    0x7B, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0xAD, 0xF4, 0xF6, 0xF2, 0xF3, 0xF5,
    0x7D, 0x4A, 0x4B, 0x4C, 0x4D, 0x4E, 0x4F, 0x50, 0x51, 0x52, 0xB9, 0xFB, 0xFC, 0xF9, 0xFA, 0xFF,
    0x5C, 0xF7, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0xB2, 0xD4, 0xD6, 0xD2, 0xD3, 0xD5,
    0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0xB3, 0xDB, 0xDC, 0xD9, 0xDA, 0x9F,
];

/// Strips trailing spaces and newlines.
pub fn canonicalize(text: &str) -> &str {
    text.trim_end_matches([' ', '\n'])
}

/// Whether a buffer carries the "not set" sentinel.
pub fn is_blank_sentinel(buf: &[u8]) -> bool {
    buf.iter().all(|b| *b == EBCDIC_BLANK) || buf.iter().all(|b| *b == 0)
}

/// A byte that has no text meaning in IBM-1047.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidByte {
    pub byte: u8,
    pub offset: usize,
}

/// Decodes an IBM-1047 buffer up to its first NUL byte.
pub fn decode_ebcdic(buf: &[u8]) -> Result<String, InvalidByte> {
    let mut out = String::with_capacity(buf.len());
    for (offset, byte) in buf.iter().copied().enumerate() {
        if byte == 0 {
            break;
        }
        let ch = char::from(IBM1047_TO_LATIN1[byte as usize]);
        if ch.is_control() && ch != '\t' && ch != '\n' {
            return Err(InvalidByte { byte, offset });
        }
        out.push(ch);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> Vec<u8> {
        text.chars()
            .map(|ch| {
                IBM1047_TO_LATIN1
                    .iter()
                    .position(|b| char::from(*b) == ch)
                    .expect("character not in IBM-1047") as u8
            })
            .collect()
    }

    #[test]
    fn canonicalize_strips_trailing_blanks_and_newlines() {
        assert_eq!(canonicalize("ABC   \n"), "ABC");
        assert_eq!(canonicalize("ABC\n \n"), "ABC");
        assert_eq!(canonicalize("  ABC"), "  ABC");
        assert_eq!(canonicalize("A B C "), "A B C");
        assert_eq!(canonicalize("   "), "");
        assert_eq!(canonicalize(""), "");
    }

    #[test]
    fn canonicalize_keeps_tabs() {
        assert_eq!(canonicalize("ABC\t"), "ABC\t");
    }

    #[test]
    fn decode_uppercase_digits_and_punctuation() {
        // "LPAR1" in IBM-1047
        assert_eq!(decode_ebcdic(&[0xD3, 0xD7, 0xC1, 0xD9, 0xF1]).unwrap(), "LPAR1");
        assert_eq!(decode_ebcdic(&encode("z/VM-6.4")).unwrap(), "z/VM-6.4");
        assert_eq!(decode_ebcdic(&encode("[pool_a]")).unwrap(), "[pool_a]");
    }

    #[test]
    fn decode_stops_at_nul() {
        assert_eq!(decode_ebcdic(&[0xC1, 0xC2, 0x00, 0xC3]).unwrap(), "AB");
        assert_eq!(decode_ebcdic(&[0x00, 0xC1]).unwrap(), "");
    }

    #[test]
    fn decode_keeps_blank_padding() {
        assert_eq!(decode_ebcdic(&[0xC1, 0x40, 0x40]).unwrap(), "A  ");
    }

    #[test]
    fn decode_rejects_control_bytes() {
        // 0x27 is ESC in IBM-1047
        assert_eq!(
            decode_ebcdic(&[0xC1, 0x27]),
            Err(InvalidByte {
                byte: 0x27,
                offset: 1
            })
        );
        assert!(decode_ebcdic(&[0xFF]).is_err());
    }

    #[test]
    fn decode_accepts_newline_byte() {
        assert_eq!(decode_ebcdic(&[0xC1, 0x15]).unwrap(), "A\n");
    }

    #[test]
    fn blank_sentinel_detection() {
        assert!(is_blank_sentinel(&[EBCDIC_BLANK; 8]));
        assert!(is_blank_sentinel(&[0; 8]));
        assert!(!is_blank_sentinel(&[0xC1, 0x40, 0x40, 0x40]));
        assert!(!is_blank_sentinel(&[0x40, 0x00]));
    }

    #[test]
    fn table_is_a_permutation() {
        let mut seen = [false; 256];
        for b in IBM1047_TO_LATIN1 {
            assert!(!seen[b as usize], "0x{:02x} mapped twice", b);
            seen[b as usize] = true;
        }
    }
}
