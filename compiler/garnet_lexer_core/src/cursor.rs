//! Cursor over a sentinel-terminated buffer.
//!
//! EOF is `pos >= source_len`. Interior NUL bytes read as `0x00` too; the
//! lexer treats them as a soft end of input, so the cursor does not need to
//! tell them apart beyond [`Cursor::is_eof`].

/// Byte cursor. [`Copy`], so a snapshot is just a copy.
///
/// # Invariant
///
/// `buf[source_len] == 0x00` and every byte after it is `0x00`; reads at
/// `pos + n` for small `n` stay inside the padding.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: u32,
    source_len: u32,
}

const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8], source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        Cursor {
            buf,
            pos: 0,
            source_len,
        }
    }

    /// Byte at the cursor, `0x00` at EOF.
    #[inline]
    pub fn current(&self) -> u8 {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(1)
    }

    /// Byte `n` positions ahead; `0x00` past the end.
    #[inline]
    pub fn peek_at(&self, n: u32) -> u8 {
        let at = self.pos as usize + n as usize;
        if at < self.source_len as usize {
            self.buf[at]
        } else {
            0
        }
    }

    /// Byte before the cursor, or `None` at the start of the buffer.
    pub fn prev(&self) -> Option<u8> {
        self.pos.checked_sub(1).map(|p| self.buf[p as usize])
    }

    #[inline]
    pub fn advance(&mut self) {
        self.advance_n(1);
    }

    /// Never moves past the sentinel.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos = self.pos.saturating_add(n).min(self.source_len);
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source_len
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Jump to an absolute offset, clamped to the source.
    pub fn set_pos(&mut self, pos: u32) {
        self.pos = pos.min(self.source_len);
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    pub fn slice(&self, start: u32, end: u32) -> &'a [u8] {
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        let end = end.min(self.source_len) as usize;
        let start = (start as usize).min(end);
        &self.buf[start..end]
    }

    pub fn slice_from(&self, start: u32) -> &'a [u8] {
        self.slice(start, self.pos)
    }

    /// Everything from the cursor to the end of the source.
    pub fn rest(&self) -> &'a [u8] {
        self.slice(self.pos, self.source_len)
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consume `prefix` if the input starts with it.
    pub fn eat_prefix(&mut self, prefix: &[u8]) -> bool {
        if self.starts_with(prefix) {
            self.advance_n(u32::try_from(prefix.len()).unwrap_or(u32::MAX));
            true
        } else {
            false
        }
    }

    /// Consume the current byte if it equals `byte`.
    pub fn eat(&mut self, byte: u8) -> bool {
        if !self.is_eof() && self.current() == byte {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advance while `pred` holds; stops at EOF.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Skip spaces, tabs, form feeds and vertical tabs.
    #[inline]
    pub fn eat_whitespace(&mut self) -> bool {
        let start = self.pos;
        self.eat_while(|b| matches!(b, b' ' | b'\t' | 0x0b | 0x0c));
        self.pos > start
    }

    /// Advance to the next `\n` (not consumed) or EOF.
    pub fn eat_until_newline_or_eof(&mut self) {
        self.pos = self.find(b'\n').unwrap_or(self.source_len);
    }

    /// Offset of the next `byte` at or after the cursor.
    pub fn find(&self, byte: u8) -> Option<u32> {
        memchr::memchr(byte, self.rest()).and_then(|off| self.offset(off))
    }

    /// Bytes in the UTF-8 character led by `byte`; 1 for ASCII and stray
    /// bytes.
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Whether the cursor sits at the first byte of a line.
    pub fn at_line_start(&self) -> bool {
        matches!(self.prev(), None | Some(b'\n'))
    }

    fn offset(&self, rel: usize) -> Option<u32> {
        u32::try_from(rel).ok().map(|r| self.pos + r)
    }
}

#[cfg(test)]
mod tests;
