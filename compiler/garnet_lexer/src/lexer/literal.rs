//! Quoted literals: strings, symbols, regexps, `%` literals and `?c`.

use garnet_ir::{Span, StringFlavor, StringOpen, Token, TokenKind};

use super::{is_ident_byte, is_space, Lexer};
use crate::cook_escape::{copy_regexp_escape, push_multibyte, read_escape, EscapeContext};
use crate::lex_error::LexErrorKind;
use crate::mode::{LiteralMode, Mode};
use crate::state::LexState;

const REGEXP_OPTIONS: &[u8] = b"imxounse";

/// Global names made of one punctuation byte (`$~`, `$!`, ...).
fn is_global_punct(c: u8) -> bool {
    matches!(
        c,
        b'~' | b'*' | b'$' | b'?' | b'!' | b'@' | b'/' | b'\\' | b';' | b',' | b'.' | b'='
            | b':' | b'<' | b'>' | b'"' | b'&' | b'`' | b'\'' | b'+' | b'0'
    )
}

impl Lexer<'_> {
    fn open_literal(&mut self, start: u32, lit: LiteralMode, command: bool) -> Token {
        let open = StringOpen {
            flavor: lit.flavor,
            interpolates: lit.interpolates,
            command,
        };
        self.modes.push(Mode::Literal(lit));
        self.finish(TokenKind::StringBegin(open), start)
    }

    /// `"`, `'` or a backquote at the cursor.
    pub(super) fn open_quote(&mut self, start: u32, quote: u8, label_ok: bool) -> Token {
        self.cursor.advance();
        let command = quote == b'`';
        let lit = LiteralMode {
            flavor: if command {
                StringFlavor::Command
            } else {
                StringFlavor::Plain
            },
            open: 0,
            close: quote,
            nesting: 0,
            interpolates: quote != b'\'',
            label_ok: label_ok && !command,
            opener: Span::new(start, self.cursor.pos()),
        };
        self.open_literal(start, lit, command)
    }

    /// `:"` or `:'` (cursor after the quote).
    pub(super) fn open_symbol_string(&mut self, start: u32, quote: u8) -> Token {
        let lit = LiteralMode {
            flavor: StringFlavor::Symbol,
            open: 0,
            close: quote,
            nesting: 0,
            interpolates: quote == b'"',
            label_ok: false,
            opener: Span::new(start, self.cursor.pos()),
        };
        self.open_literal(start, lit, false)
    }

    /// `/` at the cursor, in operand position.
    pub(super) fn open_regexp(&mut self, start: u32) -> Token {
        self.cursor.advance();
        let lit = LiteralMode {
            flavor: StringFlavor::Regexp,
            open: 0,
            close: b'/',
            nesting: 0,
            interpolates: true,
            label_ok: false,
            opener: Span::new(start, self.cursor.pos()),
        };
        self.open_literal(start, lit, false)
    }

    /// `%` at the cursor, in operand position.
    pub(super) fn open_percent(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.is_eof() {
            return self.percent_unterminated(start);
        }
        let c = self.cursor.current();
        let letter = if c.is_ascii_alphanumeric() {
            self.cursor.advance();
            if self.cursor.is_eof() {
                return self.percent_unterminated(start);
            }
            let term = self.cursor.current();
            if term.is_ascii_alphanumeric() || term >= 0x80 || !b"QqWwIisrx".contains(&c) {
                return self.percent_unknown(start);
            }
            Some(c)
        } else if c >= 0x80 {
            return self.percent_unknown(start);
        } else {
            None
        };
        let term = self.cursor.current();
        self.cursor.advance();
        let (open, close) = match term {
            b'(' => (b'(', b')'),
            b'[' => (b'[', b']'),
            b'{' => (b'{', b'}'),
            b'<' => (b'<', b'>'),
            other => (0, other),
        };
        let (flavor, interpolates) = match letter {
            None | Some(b'Q') => (StringFlavor::Plain, true),
            Some(b'q') => (StringFlavor::Plain, false),
            Some(b'W') => (StringFlavor::Words, true),
            Some(b'w') => (StringFlavor::Words, false),
            Some(b'I') => (StringFlavor::Symbols, true),
            Some(b'i') => (StringFlavor::Symbols, false),
            Some(b's') => (StringFlavor::Symbol, false),
            Some(b'r') => (StringFlavor::Regexp, true),
            _ => (StringFlavor::Command, true),
        };
        let lit = LiteralMode {
            flavor,
            open,
            close,
            nesting: 0,
            interpolates,
            label_ok: false,
            opener: Span::new(start, self.cursor.pos()),
        };
        self.open_literal(start, lit, letter == Some(b'x'))
    }

    fn percent_unterminated(&mut self, start: u32) -> Token {
        self.error_at_eof(
            LexErrorKind::UnterminatedLiteral {
                what: "quoted string",
            },
            Span::new(start, self.cursor.pos()),
        );
        self.eof_reported = true;
        self.done = true;
        self.lex_eof()
    }

    fn percent_unknown(&mut self, start: u32) -> Token {
        self.error(
            LexErrorKind::UnknownPercentType,
            Span::new(start, self.cursor.pos()),
        );
        self.done = true;
        self.lex_eof()
    }

    // === Literal bodies ===

    pub(super) fn lex_literal(&mut self) -> Token {
        let lit = match self.modes.top() {
            Mode::Literal(lit) => lit.clone(),
            _ => return self.lex_eof(),
        };
        let start = self.cursor.pos();
        if self.cursor.is_eof() {
            return self.lex_eof();
        }
        let c = self.cursor.current();
        if c == lit.close && lit.nesting == 0 {
            return self.close_literal(&lit, start);
        }
        if lit.is_list() && is_space(c) {
            while !self.cursor.is_eof() && is_space(self.cursor.current()) {
                self.skip_literal_newline();
            }
            return self.finish(TokenKind::WordSep, start);
        }
        if lit.interpolates && c == b'#' {
            if let Some(token) = self.interpolation_start(start) {
                return token;
            }
        }

        let mut out = Vec::new();
        let mut nesting = lit.nesting;
        while !self.cursor.is_eof() {
            let c = self.cursor.current();
            if c == lit.close && nesting == 0 {
                break;
            }
            if lit.open != 0 && c == lit.open {
                nesting += 1;
            } else if c == lit.close {
                nesting -= 1;
            } else if lit.is_list() && is_space(c) {
                break;
            } else if lit.interpolates && c == b'#' && self.interp_follows() {
                break;
            } else if c == b'\\' {
                self.literal_escape(&lit, &mut out);
                continue;
            } else if c == b'\r' && self.cursor.peek() == b'\n' {
                self.cursor.advance();
                continue;
            } else if c == b'\n' {
                out.push(c);
                self.skip_literal_newline();
                continue;
            } else if c >= 0x80 {
                push_multibyte(&mut self.cursor, self.encoding, &mut out, &mut self.errors);
                continue;
            }
            out.push(c);
            self.cursor.advance();
        }
        if let Mode::Literal(frame) = self.modes.top_mut() {
            frame.nesting = nesting;
        }
        self.finish(TokenKind::StringContent(out), start)
    }

    /// Consume one whitespace byte of a literal; a newline skips any
    /// heredoc bodies read from the line it ends.
    fn skip_literal_newline(&mut self) {
        let c = self.cursor.current();
        self.cursor.advance();
        if c == b'\n' {
            if let Some(end) = self.heredoc_end.take() {
                self.cursor.set_pos(end);
            }
        }
    }

    fn literal_escape(&mut self, lit: &LiteralMode, out: &mut Vec<u8>) {
        if lit.flavor == StringFlavor::Regexp {
            copy_regexp_escape(
                &mut self.cursor,
                lit.close,
                self.encoding,
                out,
                &mut self.errors,
            );
            return;
        }
        let next = self.cursor.peek();
        let at_end = self.cursor.pos() + 1 >= self.cursor.source_len();
        if lit.is_list() && is_space(next) && !at_end {
            self.cursor.advance_n(2);
            out.push(next);
            return;
        }
        if lit.interpolates {
            let ctx = EscapeContext {
                term: lit.close,
                encoding: self.encoding,
                char_literal: false,
            };
            read_escape(&mut self.cursor, &ctx, out, &mut self.errors);
            return;
        }
        if !at_end && (next == b'\\' || next == lit.close || (lit.open != 0 && next == lit.open)) {
            self.cursor.advance_n(2);
            out.push(next);
        } else {
            self.cursor.advance();
            out.push(b'\\');
        }
    }

    fn close_literal(&mut self, lit: &LiteralMode, start: u32) -> Token {
        self.cursor.advance();
        self.modes.pop();
        if lit.flavor == StringFlavor::Regexp {
            let opts_start = self.cursor.pos();
            self.cursor.eat_while(|b| b.is_ascii_alphabetic());
            let letters = self.cursor.slice_from(opts_start);
            let (valid, invalid): (Vec<u8>, Vec<u8>) =
                letters.iter().partition(|b| REGEXP_OPTIONS.contains(b));
            if !invalid.is_empty() {
                self.error(
                    LexErrorKind::UnknownRegexpOptions {
                        options: String::from_utf8_lossy(&invalid).into_owned(),
                    },
                    Span::new(opts_start, self.cursor.pos()),
                );
            }
            self.state = LexState::End;
            let options = String::from_utf8_lossy(&valid).into_owned();
            return self.finish(TokenKind::RegexpEnd(options.into()), start);
        }
        if lit.label_ok && self.cursor.current() == b':' && self.cursor.peek() != b':' {
            self.cursor.advance();
            self.state = LexState::Beg;
            return self.finish(TokenKind::LabelEnd, start);
        }
        self.state = LexState::End;
        self.finish(TokenKind::StringEnd, start)
    }

    // === Interpolation ===

    /// `#{`, `#@ivar` or `#$gvar` at the cursor.
    pub(super) fn interp_follows(&self) -> bool {
        self.cursor.peek() == b'{' || self.interp_var_follows()
    }

    fn interp_var_follows(&self) -> bool {
        let len = self.cursor.source_len();
        let at = |n: u32| {
            if self.cursor.pos() + n < len {
                Some(self.cursor.peek_at(n))
            } else {
                None
            }
        };
        let mut name_at = 2;
        match at(1) {
            Some(b'$') => match at(2) {
                Some(b'-') => name_at = 3,
                Some(c) if is_global_punct(c) || c.is_ascii_digit() => return true,
                _ => {}
            },
            Some(b'@') => {
                if at(2) == Some(b'@') {
                    name_at = 3;
                }
            }
            _ => return false,
        }
        at(name_at).is_some_and(|c| c >= 0x80 || c == b'_' || c.is_ascii_alphabetic())
    }

    /// Start an interpolation at `#`, or `None` for a plain `#`.
    pub(super) fn interpolation_start(&mut self, start: u32) -> Option<Token> {
        if self.cursor.peek() == b'{' {
            self.cursor.advance_n(2);
            self.modes.push(Mode::Interp { brace_depth: 0 });
            self.state = LexState::Beg;
            self.command_start = true;
            return Some(self.finish(TokenKind::InterpBegin, start));
        }
        if self.interp_var_follows() {
            self.cursor.advance();
            self.interp_var = true;
            return Some(self.finish(TokenKind::InterpVar, start));
        }
        None
    }

    // === Character literals ===

    /// `?` at the cursor: a character literal or the ternary operator.
    pub(super) fn lex_question(&mut self, start: u32, last: LexState) -> Token {
        self.cursor.advance();
        if last.is_end() {
            self.state = LexState::Beg;
            return self.finish(TokenKind::Question, start);
        }
        if self.cursor.is_eof() {
            self.error(
                LexErrorKind::IncompleteCharSyntax,
                Span::new(start, self.cursor.pos()),
            );
            self.done = true;
            return self.lex_eof();
        }
        let c = self.cursor.current();
        if is_space(c) || self.char_runs_into_ident(c) {
            self.state = LexState::Beg;
            return self.finish(TokenKind::Question, start);
        }
        let mut out = Vec::new();
        if c == b'\\' {
            let ctx = EscapeContext {
                term: 0,
                encoding: self.encoding,
                char_literal: true,
            };
            read_escape(&mut self.cursor, &ctx, &mut out, &mut self.errors);
        } else if c >= 0x80 {
            push_multibyte(&mut self.cursor, self.encoding, &mut out, &mut self.errors);
        } else {
            out.push(c);
            self.cursor.advance();
        }
        self.state = LexState::End;
        self.finish(TokenKind::Char(out), start)
    }

    /// `?ab` is `?` followed by a name, not a character.
    fn char_runs_into_ident(&self, c: u8) -> bool {
        let width = if c.is_ascii_alphanumeric() || c == b'_' {
            1
        } else if c >= 0x80 {
            match self.encoding.char_len(self.cursor.rest()) {
                Some(w) => u32::try_from(w).unwrap_or(1),
                None => return false,
            }
        } else {
            return false;
        };
        self.cursor.pos() + width < self.cursor.source_len()
            && is_ident_byte(self.cursor.peek_at(width))
    }
}
