//! Ordered (encoding, delimiter) candidates for reading a raw export.
//!
//! This is a brute-force trial loop, not a principled format sniffer: each
//! candidate is attempted in sequence and the first one whose header maps to
//! both key columns and that yields data rows wins. UTF-8 comes before
//! Latin-1 because Latin-1 decoding cannot fail and would otherwise shadow
//! genuinely UTF-8 files.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadDialect {
    pub name: &'static str,
    pub encoding: TextEncoding,
    pub delimiter: u8,
}

pub const DIALECTS: [ReadDialect; 4] = [
    ReadDialect {
        name: "utf8-semicolon",
        encoding: TextEncoding::Utf8,
        delimiter: b';',
    },
    ReadDialect {
        name: "latin1-semicolon",
        encoding: TextEncoding::Latin1,
        delimiter: b';',
    },
    ReadDialect {
        name: "utf8-comma",
        encoding: TextEncoding::Utf8,
        delimiter: b',',
    },
    ReadDialect {
        name: "latin1-comma",
        encoding: TextEncoding::Latin1,
        delimiter: b',',
    },
];

impl ReadDialect {
    /// Decode raw bytes under this dialect's encoding. Returns `None` when
    /// the bytes are not valid for the encoding.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self.encoding {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            TextEncoding::Latin1 => {
                let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
                Some(decoded)
            }
        }
    }
}
