//! Source encoding registry.
//!
//! Only what the lexer needs: resolve a magic-comment name, and tell how
//! many bytes the character at a position occupies (or that the bytes do
//! not form a character). No transcoding happens anywhere in the front end.

use std::fmt;

/// Byte-structure family of an encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodingKind {
    Utf8,
    /// 7-bit only; any high byte is invalid.
    Ascii,
    /// Every byte is a character.
    Binary,
    /// ISO-8859-x, Windows-125x, KOI8: every byte is a character.
    SingleByte,
    EucJp,
    ShiftJis,
    /// GBK, Big5, EUC-KR: lead byte 0x81..=0xFE plus one trail byte.
    DoubleByte,
}

/// A recognised source encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Encoding {
    name: &'static str,
    kind: EncodingKind,
}

/// Why a magic-comment encoding name was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodingError {
    Unknown(String),
    /// `external`, `internal`, `locale`, `filesystem`.
    ProcessDefault(String),
    /// UTF-16/32 and friends cannot encode source text.
    NotAsciiCompatible(&'static str),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::Unknown(name) => write!(f, "unknown encoding name: {name}"),
            EncodingError::ProcessDefault(name) => {
                write!(f, "'{name}' names a process default encoding and cannot declare source")
            }
            EncodingError::NotAsciiCompatible(name) => write!(f, "{name} is not ASCII compatible"),
        }
    }
}

/// (canonical name, aliases, kind)
const REGISTRY: &[(&str, &[&str], EncodingKind)] = &[
    ("UTF-8", &["CP65001", "UTF8-MAC", "UTF-8-MAC", "UTF-8-HFS"], EncodingKind::Utf8),
    ("US-ASCII", &["ASCII", "ANSI_X3.4-1968", "646"], EncodingKind::Ascii),
    ("ASCII-8BIT", &["BINARY"], EncodingKind::Binary),
    ("ISO-8859-1", &["ISO8859-1"], EncodingKind::SingleByte),
    ("ISO-8859-2", &["ISO8859-2"], EncodingKind::SingleByte),
    ("ISO-8859-5", &["ISO8859-5"], EncodingKind::SingleByte),
    ("ISO-8859-15", &["ISO8859-15"], EncodingKind::SingleByte),
    ("Windows-1250", &["CP1250"], EncodingKind::SingleByte),
    ("Windows-1251", &["CP1251"], EncodingKind::SingleByte),
    ("Windows-1252", &["CP1252"], EncodingKind::SingleByte),
    ("KOI8-R", &["CP878"], EncodingKind::SingleByte),
    ("EUC-JP", &["eucJP"], EncodingKind::EucJp),
    ("Shift_JIS", &["SJIS"], EncodingKind::ShiftJis),
    ("Windows-31J", &["CP932", "csWindows31J", "PCK"], EncodingKind::ShiftJis),
    ("GBK", &["CP936"], EncodingKind::DoubleByte),
    ("Big5", &["CP950"], EncodingKind::DoubleByte),
    ("EUC-KR", &["eucKR"], EncodingKind::DoubleByte),
];

const NOT_ASCII_COMPATIBLE: &[&str] = &[
    "UTF-16", "UTF-16LE", "UTF-16BE", "UTF-32", "UTF-32LE", "UTF-32BE", "UTF-7",
];

const PROCESS_DEFAULTS: &[&str] = &["external", "internal", "locale", "filesystem"];

impl Encoding {
    pub const UTF_8: Encoding = Encoding {
        name: "UTF-8",
        kind: EncodingKind::Utf8,
    };
    pub const US_ASCII: Encoding = Encoding {
        name: "US-ASCII",
        kind: EncodingKind::Ascii,
    };
    pub const BINARY: Encoding = Encoding {
        name: "ASCII-8BIT",
        kind: EncodingKind::Binary,
    };

    /// Resolve a magic-comment name, case-insensitively, through aliases.
    pub fn find(name: &str) -> Result<Encoding, EncodingError> {
        if PROCESS_DEFAULTS.iter().any(|d| d.eq_ignore_ascii_case(name)) {
            return Err(EncodingError::ProcessDefault(name.to_string()));
        }
        if let Some(bad) = NOT_ASCII_COMPATIBLE
            .iter()
            .find(|n| n.eq_ignore_ascii_case(name))
        {
            return Err(EncodingError::NotAsciiCompatible(bad));
        }
        REGISTRY
            .iter()
            .find(|(canonical, aliases, _)| {
                canonical.eq_ignore_ascii_case(name)
                    || aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
            })
            .map(|&(canonical, _, kind)| Encoding {
                name: canonical,
                kind,
            })
            .ok_or_else(|| EncodingError::Unknown(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> EncodingKind {
        self.kind
    }

    pub fn is_utf8(&self) -> bool {
        self.kind == EncodingKind::Utf8
    }

    /// Length of the character at the start of `bytes`, or `None` when the
    /// bytes are not a complete, valid character in this encoding.
    pub fn char_len(&self, bytes: &[u8]) -> Option<usize> {
        let &lead = bytes.first()?;
        if lead < 0x80 {
            return Some(1);
        }
        match self.kind {
            EncodingKind::Ascii => None,
            EncodingKind::Binary | EncodingKind::SingleByte => Some(1),
            EncodingKind::Utf8 => utf8_char_len(bytes),
            EncodingKind::EucJp => match lead {
                0x8E => trail(bytes, 2, |b| (0xA1..=0xDF).contains(&b)),
                0x8F => trail(bytes, 3, |b| (0xA1..=0xFE).contains(&b)),
                0xA1..=0xFE => trail(bytes, 2, |b| (0xA1..=0xFE).contains(&b)),
                _ => None,
            },
            EncodingKind::ShiftJis => match lead {
                0xA1..=0xDF => Some(1),
                0x81..=0x9F | 0xE0..=0xFC => {
                    trail(bytes, 2, |b| matches!(b, 0x40..=0x7E | 0x80..=0xFC))
                }
                _ => None,
            },
            EncodingKind::DoubleByte => match lead {
                0x81..=0xFE => trail(bytes, 2, |b| (0x40..=0xFE).contains(&b)),
                _ => None,
            },
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::UTF_8
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn trail(bytes: &[u8], len: usize, ok: impl Fn(u8) -> bool) -> Option<usize> {
    let tail = bytes.get(1..len)?;
    tail.iter().all(|&b| ok(b)).then_some(len)
}

/// Strict UTF-8: no overlongs, no surrogates, nothing above U+10FFFF.
fn utf8_char_len(bytes: &[u8]) -> Option<usize> {
    let lead = *bytes.first()?;
    let (len, lo, hi) = match lead {
        0xC2..=0xDF => (2, 0x80, 0xBF),
        0xE0 => (3, 0xA0, 0xBF),
        0xED => (3, 0x80, 0x9F),
        0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80, 0xBF),
        0xF0 => (4, 0x90, 0xBF),
        0xF1..=0xF3 => (4, 0x80, 0xBF),
        0xF4 => (4, 0x80, 0x8F),
        _ => return None,
    };
    let second = *bytes.get(1)?;
    if !(lo..=hi).contains(&second) {
        return None;
    }
    let rest = bytes.get(2..len)?;
    rest.iter().all(|&b| b & 0xC0 == 0x80).then_some(len)
}
