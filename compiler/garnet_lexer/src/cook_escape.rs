//! Backslash escape processing for interpolating literals.
//!
//! `read_escape` starts on the `\` and appends the cooked bytes to an output
//! buffer. Problems are pushed as [`LexError`]s and scanning always makes
//! progress, so a bad escape never stalls the literal around it.
//!
//! Regexp bodies keep their escapes verbatim; [`copy_regexp_escape`] only
//! strips a backslash before the terminator and validates `\u`.

use garnet_ir::Span;
use garnet_lexer_core::{Cursor, Encoding};

use crate::lex_error::{LexError, LexErrorKind};

/// Where an escape appears.
#[derive(Copy, Clone, Debug)]
pub(crate) struct EscapeContext {
    /// Closing delimiter of the enclosing literal; 0 inside heredocs.
    pub term: u8,
    pub encoding: Encoding,
    /// Inside a `?x` character literal.
    pub char_literal: bool,
}

/// Single-letter escapes that map to one byte.
#[inline]
fn simple_escape(c: u8) -> Option<u8> {
    Some(match c {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'f' => 0x0c,
        b'v' => 0x0b,
        b'a' => 0x07,
        b'e' => 0x1b,
        b'b' => 0x08,
        b's' => b' ',
        _ => return None,
    })
}

/// Letter used to spell a whitespace byte as an escape.
fn escaped_control_code(c: u8) -> Option<u8> {
    Some(match c {
        b' ' => b's',
        b'\n' => b'n',
        b'\t' => b't',
        0x0b => b'v',
        b'\r' => b'r',
        0x0c => b'f',
        _ => return None,
    })
}

/// Cook the escape at the cursor (which must be on `\`).
pub(crate) fn read_escape(
    cursor: &mut Cursor<'_>,
    ctx: &EscapeContext,
    out: &mut Vec<u8>,
    errors: &mut Vec<LexError>,
) {
    let start = cursor.pos();
    cursor.advance();
    if cursor.is_eof() {
        return;
    }
    let c = cursor.current();
    if let Some(byte) = simple_escape(c) {
        cursor.advance();
        out.push(byte);
        return;
    }
    match c {
        // Line continuation.
        b'\n' => cursor.advance(),
        b'0'..=b'7' => out.push(read_octal(cursor)),
        b'x' => {
            cursor.advance();
            match read_hex(cursor, 2) {
                Some((value, _)) => out.push(u8::try_from(value).unwrap_or(u8::MAX)),
                None => errors.push(LexError::new(
                    LexErrorKind::InvalidHexEscape,
                    Span::new(start, cursor.pos()),
                )),
            }
        }
        b'u' => {
            cursor.advance();
            read_unicode(cursor, ctx, start, out, errors);
        }
        b'M' | b'C' | b'c' => {
            let mut cm = ControlMeta::new(start);
            if let Some(byte) = cm.read(cursor, ctx, errors) {
                out.push(byte);
            }
        }
        0x80..=0xff => {
            push_multibyte(cursor, ctx.encoding, out, errors);
        }
        _ => {
            cursor.advance();
            out.push(c);
        }
    }
}

/// Copy the character at the cursor, which starts with a high byte.
///
/// Returns `false` (after reporting) when the bytes are not a valid
/// character in `encoding`; the whole run of invalid bytes is consumed so
/// it is reported once.
pub(crate) fn push_multibyte(
    cursor: &mut Cursor<'_>,
    encoding: Encoding,
    out: &mut Vec<u8>,
    errors: &mut Vec<LexError>,
) -> bool {
    let start = cursor.pos();
    if let Some(len) = encoding.char_len(cursor.rest()) {
        let len = u32::try_from(len).unwrap_or(1);
        out.extend_from_slice(cursor.slice(start, start + len));
        cursor.advance_n(len);
        return true;
    }
    while !cursor.is_eof()
        && cursor.current() >= 0x80
        && encoding.char_len(cursor.rest()).is_none()
    {
        out.push(cursor.current());
        cursor.advance();
    }
    errors.push(LexError::new(
        LexErrorKind::InvalidMultibyte {
            encoding: encoding.name(),
        },
        Span::new(start, cursor.pos()),
    ));
    false
}

fn read_octal(cursor: &mut Cursor<'_>) -> u8 {
    let mut value: u8 = 0;
    for _ in 0..3 {
        let c = cursor.current();
        if !(b'0'..=b'7').contains(&c) {
            break;
        }
        value = value.wrapping_mul(8).wrapping_add(c - b'0');
        cursor.advance();
    }
    value
}

/// Read up to `max` hex digits. `None` when there are none.
fn read_hex(cursor: &mut Cursor<'_>, max: u32) -> Option<(u32, u32)> {
    let mut value: u32 = 0;
    let mut count = 0;
    while count < max {
        let Some(digit) = (cursor.current() as char).to_digit(16) else {
            break;
        };
        value = value.saturating_mul(16).saturating_add(digit);
        count += 1;
        cursor.advance();
    }
    (count > 0).then_some((value, count))
}

/// Append a code point as UTF-8. Returns whether it was valid.
fn push_codepoint(value: u32, span: Span, out: &mut Vec<u8>, errors: &mut Vec<LexError>) -> bool {
    if value > 0x10_FFFF {
        errors.push(LexError::new(LexErrorKind::UnicodeTooLarge, span));
        return false;
    }
    match char::from_u32(value) {
        Some(ch) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            true
        }
        None => {
            errors.push(LexError::new(LexErrorKind::InvalidUnicodeEscape, span));
            false
        }
    }
}

/// Cursor just past `\u`.
fn read_unicode(
    cursor: &mut Cursor<'_>,
    ctx: &EscapeContext,
    start: u32,
    out: &mut Vec<u8>,
    errors: &mut Vec<LexError>,
) {
    if !cursor.eat(b'{') {
        let value = read_hex(cursor, 4);
        let span = Span::new(start, cursor.pos());
        match value {
            Some((value, 4)) => {
                push_codepoint(value, span, out, errors);
            }
            _ => errors.push(LexError::new(LexErrorKind::InvalidUnicodeEscape, span)),
        }
        return;
    }

    let mut codepoints = 0u32;
    loop {
        cursor.eat_while(|b| b == b' ' || b == b'\t');
        let pos = cursor.pos();
        let c = cursor.current();
        if c == b'}' {
            cursor.advance();
            break;
        }
        if c.is_ascii_hexdigit() {
            let (value, count) = read_hex(cursor, u32::MAX).unwrap_or((0, 0));
            let span = Span::new(pos, cursor.pos());
            if count > 6 {
                errors.push(LexError::new(LexErrorKind::InvalidUnicodeEscape, span));
            } else if push_codepoint(value, span, out, errors) {
                codepoints += 1;
            }
            continue;
        }
        if cursor.is_eof() || c == b'\n' || (ctx.term != 0 && c == ctx.term) {
            errors.push(LexError::new(
                LexErrorKind::UnterminatedUnicodeEscape,
                Span::new(pos, pos + 1),
            ));
            return;
        }
        let width = Cursor::utf8_char_width(c);
        let span = Span::new(pos, pos + width);
        if let Some(close) = closing_brace(cursor, ctx.term) {
            errors.push(LexError::new(LexErrorKind::InvalidUnicodeEscape, span));
            cursor.set_pos(close + 1);
        } else {
            errors.push(LexError::new(LexErrorKind::UnterminatedUnicodeEscape, span));
            errors.push(LexError::new(LexErrorKind::InvalidUnicodeEscape, span));
            cursor.advance_n(width);
        }
        return;
    }

    if ctx.char_literal && codepoints > 1 {
        errors.push(LexError::new(
            LexErrorKind::MultipleCodepoints,
            Span::new(start, cursor.pos()),
        ));
    }
}

/// Offset of a `}` on this line, before the literal's terminator.
fn closing_brace(cursor: &Cursor<'_>, term: u8) -> Option<u32> {
    let rest = cursor.rest();
    let end = rest
        .iter()
        .position(|&b| b == b'}' || b == b'\n' || (term != 0 && b == term))?;
    (rest[end] == b'}')
        .then(|| u32::try_from(end).ok().map(|off| cursor.pos() + off))
        .flatten()
}

/// State for `\M-`, `\C-` and `\c` escapes, which nest.
struct ControlMeta {
    /// Offset of the outermost `\`.
    start: u32,
    /// Prefixes read so far, as they would be written in a suggestion.
    prefix: String,
    meta: bool,
    control: bool,
}

impl ControlMeta {
    fn new(start: u32) -> Self {
        ControlMeta {
            start,
            prefix: String::new(),
            meta: false,
            control: false,
        }
    }

    fn fail(&self, end: u32, errors: &mut Vec<LexError>) {
        errors.push(LexError::new(
            LexErrorKind::InvalidEscapeSyntax,
            Span::new(self.start, end),
        ));
    }

    /// Cursor on the `M`, `C` or `c` letter.
    fn read(
        &mut self,
        cursor: &mut Cursor<'_>,
        ctx: &EscapeContext,
        errors: &mut Vec<LexError>,
    ) -> Option<u8> {
        let letter = cursor.current();
        cursor.advance();
        let is_meta = letter == b'M';
        if letter != b'c' && !cursor.eat(b'-') {
            let width = if cursor.is_eof() {
                0
            } else {
                Cursor::utf8_char_width(cursor.current())
            };
            self.fail(cursor.pos() + width, errors);
            cursor.advance_n(width);
            return None;
        }
        if (is_meta && self.meta) || (!is_meta && self.control) {
            self.fail(cursor.pos(), errors);
            return None;
        }
        if is_meta {
            self.meta = true;
            self.prefix.push_str("\\M-");
        } else {
            self.control = true;
            self.prefix.push_str("\\C-");
            if cursor.eat(b'?') {
                return Some(0x7f);
            }
        }
        let operand = self.operand(cursor, ctx, errors)?;
        Some(if is_meta {
            operand | 0x80
        } else {
            operand & 0x9f
        })
    }

    fn operand(
        &mut self,
        cursor: &mut Cursor<'_>,
        ctx: &EscapeContext,
        errors: &mut Vec<LexError>,
    ) -> Option<u8> {
        if cursor.is_eof() {
            self.fail(cursor.pos(), errors);
            return None;
        }
        let c = cursor.current();
        if c == b'\\' {
            return match cursor.peek() {
                b'M' | b'C' | b'c' => {
                    cursor.advance();
                    self.read(cursor, ctx, errors)
                }
                b'u' | b'U' => {
                    self.fail(cursor.pos() + 2, errors);
                    cursor.advance_n(2);
                    None
                }
                _ => {
                    let mut cooked = Vec::new();
                    read_escape(cursor, ctx, &mut cooked, errors);
                    match cooked.as_slice() {
                        [byte] => Some(*byte),
                        _ => {
                            self.fail(cursor.pos(), errors);
                            None
                        }
                    }
                }
            };
        }
        if c >= 0x80 {
            let width = Cursor::utf8_char_width(c);
            self.fail(cursor.pos() + width, errors);
            cursor.advance_n(width);
            return None;
        }
        if let Some(code) = escaped_control_code(c) {
            cursor.advance();
            let written = if c == b' ' {
                self.prefix.as_str()
            } else if self.meta {
                "\\M-"
            } else {
                ""
            };
            let lead = if ctx.char_literal { "?" } else { "" };
            errors.push(LexError::new(
                LexErrorKind::DeprecatedEscape {
                    suggestion: format!("{lead}{written}\\{}", code as char),
                },
                Span::new(self.start, cursor.pos()),
            ));
            return Some(c);
        }
        cursor.advance();
        if c.is_ascii_control() {
            self.fail(cursor.pos(), errors);
            return None;
        }
        Some(c)
    }
}

/// Copy a regexp escape verbatim (cursor on `\`).
///
/// A backslash before the terminator is dropped. `\u` forms are checked
/// for shape only; the regexp engine decodes them later.
pub(crate) fn copy_regexp_escape(
    cursor: &mut Cursor<'_>,
    term: u8,
    encoding: Encoding,
    out: &mut Vec<u8>,
    errors: &mut Vec<LexError>,
) {
    let start = cursor.pos();
    cursor.advance();
    if cursor.is_eof() {
        out.push(b'\\');
        return;
    }
    let c = cursor.current();
    if c == term {
        cursor.advance();
        out.push(c);
        return;
    }
    out.push(b'\\');
    match c {
        b'u' => {
            cursor.advance();
            out.push(b'u');
            if cursor.current() == b'{' {
                let body_start = cursor.pos();
                let close = cursor
                    .rest()
                    .iter()
                    .position(|&b| b == b'}' || b == b'\n' || b == term);
                match close.and_then(|off| u32::try_from(off).ok()) {
                    Some(off) if cursor.peek_at(off) == b'}' => {
                        cursor.advance_n(off + 1);
                        out.extend_from_slice(cursor.slice_from(body_start));
                    }
                    // Runs into EOF: the regexp itself is unterminated.
                    None => {}
                    Some(_) => errors.push(LexError::new(
                        LexErrorKind::InvalidUnicodeList,
                        Span::new(start, cursor.pos() + 1),
                    )),
                }
            } else {
                let digits_start = cursor.pos();
                let count = read_hex(cursor, 4).map_or(0, |(_, n)| n);
                out.extend_from_slice(cursor.slice_from(digits_start));
                if count < 4 {
                    errors.push(LexError::new(
                        LexErrorKind::TooShortEscape,
                        Span::new(start, cursor.pos()),
                    ));
                }
            }
        }
        0x80..=0xff => {
            push_multibyte(cursor, encoding, out, errors);
        }
        _ => {
            cursor.advance();
            out.push(c);
        }
    }
}

#[cfg(test)]
mod tests;
