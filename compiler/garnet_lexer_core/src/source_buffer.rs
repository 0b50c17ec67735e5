//! Sentinel-terminated source buffer.
//!
//! The buffer guarantees a `0x00` sentinel byte after the source content,
//! so the scanner can peek past the end without bounds checks. The total
//! size is rounded up to the next 64-byte boundary, which also pads
//! `peek_at` reads a few bytes beyond the sentinel.
//!
//! # Byte order marks
//!
//! A UTF-8 BOM is skipped and forces the UTF-8 encoding. UTF-16 BOMs are
//! recorded as [`EncodingIssue`]s; the lexer reports them.

use crate::{Cursor, Encoding};

const CACHE_LINE: usize = 64;

/// Owned source bytes plus the declared encoding.
///
/// ```text
/// [source_bytes..., 0x00, padding_zeros...]
///  ^                ^     ^
///  0                |     rounded up to 64-byte boundary
///              source_len (sentinel)
/// ```
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    buf: Vec<u8>,
    source_len: u32,
    /// First byte after a UTF-8 BOM, or 0.
    content_start: u32,
    encoding: Encoding,
    encoding_issues: Vec<EncodingIssue>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingIssue {
    pub kind: EncodingIssueKind,
    pub pos: u32,
    pub len: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingIssueKind {
    /// `0xFF 0xFE` at start.
    Utf16LeBom,
    /// `0xFE 0xFF` at start.
    Utf16BeBom,
}

impl EncodingIssueKind {
    pub fn encoding_name(self) -> &'static str {
        match self {
            EncodingIssueKind::Utf16LeBom => "UTF-16LE",
            EncodingIssueKind::Utf16BeBom => "UTF-16BE",
        }
    }
}

impl SourceBuffer {
    /// Copy `source` into a padded buffer, declaring `encoding` unless a
    /// UTF-8 BOM says otherwise.
    ///
    /// Sources larger than `u32::MAX` bytes saturate `len()`.
    pub fn new(source: &[u8], encoding: Encoding) -> Self {
        let source_len = source.len();
        let padded_len = (source_len + 1 + CACHE_LINE - 1) & !(CACHE_LINE - 1);

        let mut buf = vec![0u8; padded_len];
        buf[..source_len].copy_from_slice(source);

        let mut encoding = encoding;
        let mut content_start = 0;
        let mut encoding_issues = Vec::new();
        if source.starts_with(&[0xEF, 0xBB, 0xBF]) {
            content_start = 3;
            encoding = Encoding::UTF_8;
        } else if let Some(kind) = utf16_bom(source) {
            encoding_issues.push(EncodingIssue { kind, pos: 0, len: 2 });
        }

        SourceBuffer {
            buf,
            source_len: u32::try_from(source_len).unwrap_or(u32::MAX),
            content_start,
            encoding,
            encoding_issues,
        }
    }

    /// Source bytes without sentinel or padding (BOM included).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    pub fn as_sentinel_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// A cursor positioned after any BOM.
    pub fn cursor(&self) -> Cursor<'_> {
        let mut cursor = Cursor::new(&self.buf, self.source_len);
        cursor.set_pos(self.content_start);
        cursor
    }

    pub fn len(&self) -> u32 {
        self.source_len
    }

    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }

    pub fn content_start(&self) -> u32 {
        self.content_start
    }

    pub fn has_bom(&self) -> bool {
        self.content_start > 0
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Switch encodings after a magic comment. Ignored once a BOM fixed it.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        if !self.has_bom() {
            self.encoding = encoding;
        }
    }

    pub fn encoding_issues(&self) -> &[EncodingIssue] {
        &self.encoding_issues
    }

    /// Offset of the `\n` ending the line that contains `from`, or `len()`.
    pub fn line_end(&self, from: u32) -> u32 {
        let from = from.min(self.source_len);
        let rest = &self.buf[from as usize..self.source_len as usize];
        memchr::memchr(b'\n', rest)
            .and_then(|off| u32::try_from(off).ok())
            .map_or(self.source_len, |off| from + off)
    }
}

const _: () = assert!(std::mem::size_of::<SourceBuffer>() <= 80);

fn utf16_bom(source: &[u8]) -> Option<EncodingIssueKind> {
    match source {
        [0xFF, 0xFE, ..] => Some(EncodingIssueKind::Utf16LeBom),
        [0xFE, 0xFF, ..] => Some(EncodingIssueKind::Utf16BeBom),
        _ => None,
    }
}
