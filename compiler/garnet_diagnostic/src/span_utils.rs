//! Line and column lookup over raw source bytes.
//!
//! Sources are byte buffers in a declared encoding, not necessarily valid
//! UTF-8. Columns count characters by skipping UTF-8 continuation bytes,
//! which is exact for UTF-8 and ASCII-compatible encodings and degrades to
//! byte columns otherwise.
//!
//! For repeated lookups on the same source use [`LineOffsetTable`], which
//! answers in O(log L) instead of rescanning.

use garnet_ir::Span;

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Number of characters in `bytes`.
pub fn char_width(bytes: &[u8]) -> u32 {
    let count = bytes.iter().filter(|&&b| !is_continuation(b)).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Pre-computed line start table.
///
/// ```
/// use garnet_diagnostic::span_utils::LineOffsetTable;
///
/// let source = b"line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineOffsetTable {
    /// offsets[0] = 0; offsets[i] = byte after the i-th `\n`.
    offsets: Vec<u32>,
    len: u32,
}

impl LineOffsetTable {
    pub fn build(source: &[u8]) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.iter().enumerate() {
            if *byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable {
            offsets,
            len: u32::try_from(source.len()).unwrap_or(u32::MAX),
        }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column); the column counts characters.
    pub fn offset_to_line_col(&self, source: &[u8], offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.line_start_offset(line).unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len()).max(line_start);
        (line, char_width(&source[line_start..end]) + 1)
    }

    /// Byte offset where `line` (1-based) starts.
    pub fn line_start_offset(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    /// Byte range of `line` without its terminating newline (and without a
    /// preceding `\r`).
    pub fn line_bounds(&self, source: &[u8], line: u32) -> Option<Span> {
        let start = self.line_start_offset(line)?;
        let mut end = self
            .line_start_offset(line + 1)
            .map_or(self.len, |next| next - 1);
        if end > start && source.get((end - 1) as usize) == Some(&b'\r') {
            end -= 1;
        }
        Some(Span::new(start, end))
    }

    /// The bytes of `line`, as for [`LineOffsetTable::line_bounds`].
    pub fn line_text<'s>(&self, source: &'s [u8], line: u32) -> &'s [u8] {
        self.line_bounds(source, line)
            .and_then(|span| source.get(span.range()))
            .unwrap_or_default()
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// 1-based line where `span` starts.
///
/// For repeated lookups, use [`LineOffsetTable`].
pub fn line_number(source: &[u8], span: Span) -> u32 {
    line_from_offset(source, span.start)
}

/// 1-based line of a byte offset, by linear scan.
pub fn line_from_offset(source: &[u8], offset: u32) -> u32 {
    let end = (offset as usize).min(source.len());
    let newlines = source[..end].iter().filter(|&&b| b == b'\n').count();
    u32::try_from(newlines).unwrap_or(u32::MAX - 1) + 1
}

/// 1-based (line, column) of a byte offset, by linear scan.
pub fn offset_to_line_col(source: &[u8], offset: u32) -> (u32, u32) {
    let end = (offset as usize).min(source.len());
    let mut line = 1u32;
    let mut line_start = 0usize;
    for (i, &byte) in source[..end].iter().enumerate() {
        if byte == b'\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    (line, char_width(&source[line_start..end]) + 1)
}

#[cfg(test)]
mod tests;
