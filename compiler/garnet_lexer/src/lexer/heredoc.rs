//! Heredocs: `<<ID`, `<<-ID`, `<<~ID` and their quoted forms.

use garnet_ir::{Span, StringFlavor, StringOpen, Token, TokenKind};
use tracing::trace;

use super::{is_ident_byte, Lexer};
use crate::cook_escape::{push_multibyte, read_escape, EscapeContext};
use crate::lex_error::LexErrorKind;
use crate::mode::{HeredocMode, Mode};
use crate::state::LexState;

/// Whether `line` ends a heredoc named `ident`.
///
/// The identifier must end the line; anything before it must be empty, or
/// whitespace when the terminator may be indented.
fn heredoc_terminates(line: &[u8], ident: &[u8], indented_end: bool) -> bool {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let Some(prefix) = line.strip_suffix(ident) else {
        return false;
    };
    prefix.is_empty()
        || (indented_end
            && prefix
                .iter()
                .all(|b| matches!(b, b' ' | b'\t' | 0x0b | 0x0c)))
}

/// Leading indentation of `line` in columns; tabs advance to the next
/// multiple of 8. Also returns the number of bytes it spans.
fn leading_indent(line: &[u8]) -> (u32, usize) {
    let mut cols = 0;
    for (i, &b) in line.iter().enumerate() {
        match b {
            b' ' => cols += 1,
            b'\t' => cols = (cols / 8 + 1) * 8,
            _ => return (cols, i),
        }
    }
    (cols, line.len())
}

impl Lexer<'_> {
    /// Start of the line after `pos`, or the end of input.
    fn next_line_start(&self, pos: u32) -> u32 {
        let mut c = self.cursor;
        c.set_pos(pos);
        c.find(b'\n').map_or(c.source_len(), |nl| nl + 1)
    }

    /// Cursor after `<<`. `None` when no identifier follows; the caller
    /// then lexes `<<` as an operator.
    pub(super) fn lex_heredoc_open(&mut self, start: u32) -> Option<Token> {
        let save = self.cursor.pos();
        let (indented_end, squiggly) = match self.cursor.current() {
            b'-' => (true, false),
            b'~' => (true, true),
            _ => (false, false),
        };
        if indented_end {
            self.cursor.advance();
        }
        let c = self.cursor.current();
        let (ident, interpolates, command): (Box<[u8]>, bool, bool) = match c {
            b'"' | b'\'' | b'`' => {
                self.cursor.advance();
                let ident_start = self.cursor.pos();
                let line_end = self.cursor.find(b'\n').unwrap_or(self.cursor.source_len());
                let line = self.cursor.slice(ident_start, line_end);
                let Some(close) = line
                    .iter()
                    .position(|&b| b == c)
                    .and_then(|off| u32::try_from(off).ok())
                else {
                    self.cursor.set_pos(line_end);
                    self.error(
                        LexErrorKind::UnterminatedHeredocIdent,
                        Span::new(start, line_end),
                    );
                    return Some(self.finish(TokenKind::InvalidByte(b'<'), start));
                };
                let ident = self.cursor.slice(ident_start, ident_start + close).into();
                self.cursor.set_pos(ident_start + close + 1);
                (ident, c != b'\'', c == b'`')
            }
            _ if !self.cursor.is_eof() && is_ident_byte(c) => {
                let ident_start = self.cursor.pos();
                self.scan_ident_chars();
                (self.cursor.slice_from(ident_start).into(), true, false)
            }
            _ => {
                self.cursor.set_pos(save);
                return None;
            }
        };

        let resume = self.cursor.pos();
        let body_start = match self.heredoc_end.take() {
            Some(end) => end,
            None => self.next_line_start(resume),
        };
        let dedent = squiggly.then(|| self.squiggly_indent(body_start, &ident, indented_end));
        trace!(
            ident = %String::from_utf8_lossy(&ident),
            body_start,
            resume,
            "enter heredoc body"
        );
        self.modes.push(Mode::Heredoc(HeredocMode {
            ident,
            interpolates,
            indented_end,
            dedent,
            resume,
            decl: Span::new(start, resume),
            at_line_start: true,
        }));
        self.cursor.set_pos(body_start);
        let open = StringOpen {
            flavor: StringFlavor::Heredoc,
            interpolates,
            command,
        };
        Some(self.emit(TokenKind::StringBegin(open), Span::new(start, resume)))
    }

    /// Smallest indentation among the body's non-blank lines.
    fn squiggly_indent(&self, body_start: u32, ident: &[u8], indented_end: bool) -> u32 {
        let mut c = self.cursor;
        c.set_pos(body_start);
        let mut min: Option<u32> = None;
        while !c.is_eof() {
            let line_start = c.pos();
            let end = c.find(b'\n').unwrap_or(c.source_len());
            let line = c.slice(line_start, end);
            if heredoc_terminates(line, ident, indented_end) {
                break;
            }
            let (cols, width) = leading_indent(line);
            if !matches!(line.get(width), None | Some(b'\r')) {
                min = Some(min.map_or(cols, |m| m.min(cols)));
            }
            c.set_pos(end + 1);
        }
        min.unwrap_or(0)
    }

    fn strip_indent(&mut self, cols: u32) {
        let mut col = 0;
        while col < cols {
            match self.cursor.current() {
                b' ' => col += 1,
                b'\t' => {
                    let next = (col / 8 + 1) * 8;
                    if next > cols {
                        break;
                    }
                    col = next;
                }
                _ => break,
            }
            self.cursor.advance();
        }
    }

    fn set_heredoc_line_start(&mut self, at_line_start: bool) {
        if let Mode::Heredoc(doc) = self.modes.top_mut() {
            doc.at_line_start = at_line_start;
        }
    }

    fn at_heredoc_terminator(&self) -> bool {
        let Mode::Heredoc(doc) = self.modes.top() else {
            return false;
        };
        let end = self.cursor.find(b'\n').unwrap_or(self.cursor.source_len());
        let line = self.cursor.slice(self.cursor.pos(), end);
        heredoc_terminates(line, &doc.ident, doc.indented_end)
    }

    /// One line (or the part of it up to an interpolation) of a heredoc body.
    pub(super) fn lex_heredoc_body(&mut self) -> Token {
        let (interpolates, dedent, at_line_start) = match self.modes.top() {
            Mode::Heredoc(doc) => (doc.interpolates, doc.dedent, doc.at_line_start),
            _ => return self.lex_eof(),
        };
        let start = self.cursor.pos();
        if self.cursor.is_eof() {
            return self.leave_heredoc(start, false);
        }
        if at_line_start {
            if self.at_heredoc_terminator() {
                return self.leave_heredoc(start, true);
            }
            self.set_heredoc_line_start(false);
            if let Some(cols) = dedent {
                self.strip_indent(cols);
            }
        }
        if interpolates && self.cursor.current() == b'#' {
            if let Some(token) = self.interpolation_start(start) {
                return token;
            }
        }

        let mut out = Vec::new();
        let mut line_done = false;
        while !self.cursor.is_eof() {
            let c = self.cursor.current();
            match c {
                b'\n' => {
                    out.push(b'\n');
                    self.cursor.advance();
                    line_done = true;
                    break;
                }
                b'\r' if self.cursor.peek() == b'\n' => {
                    out.push(b'\n');
                    self.cursor.advance_n(2);
                    line_done = true;
                    break;
                }
                b'\\' if interpolates => {
                    let ctx = EscapeContext {
                        term: 0,
                        encoding: self.encoding,
                        char_literal: false,
                    };
                    read_escape(&mut self.cursor, &ctx, &mut out, &mut self.errors);
                }
                b'#' if interpolates && self.interp_follows() => break,
                0x80..=0xff => {
                    push_multibyte(&mut self.cursor, self.encoding, &mut out, &mut self.errors);
                }
                _ => {
                    out.push(c);
                    self.cursor.advance();
                }
            }
        }
        if line_done {
            self.set_heredoc_line_start(true);
            if let Some(end) = self.heredoc_end.take() {
                self.cursor.set_pos(end);
            }
        }
        self.finish(TokenKind::StringContent(out), start)
    }

    /// Close the heredoc and jump back to the rest of the opener's line.
    fn leave_heredoc(&mut self, start: u32, terminated: bool) -> Token {
        let Some(Mode::Heredoc(doc)) = self.modes.pop() else {
            return self.lex_eof();
        };
        let span = if terminated {
            let line_end = self.cursor.find(b'\n').unwrap_or(self.cursor.source_len());
            self.heredoc_end = Some(self.next_line_start(start));
            Span::new(start, line_end)
        } else {
            if !self.eof_reported {
                self.error_at_eof(
                    LexErrorKind::UnterminatedHeredoc {
                        ident: String::from_utf8_lossy(&doc.ident).into_owned(),
                    },
                    doc.decl,
                );
                self.eof_reported = true;
            }
            self.heredoc_end = Some(self.cursor.source_len());
            Span::point(start)
        };
        trace!(resume = doc.resume, terminated, "leave heredoc body");
        self.cursor.set_pos(doc.resume);
        self.state = LexState::End;
        self.emit(TokenKind::StringEnd, span)
    }
}
