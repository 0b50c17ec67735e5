//! Numeric literals.

use garnet_ir::{NumberLit, Span, Token, TokenKind};

use super::Lexer;
use crate::lex_error::LexErrorKind;
use crate::state::LexState;

impl Lexer<'_> {
    /// Digits in `radix` with `_` separators, which must sit between digits.
    fn scan_digits(&mut self, radix: u32, mut after_digit: bool) -> String {
        let mut digits = String::new();
        while !self.cursor.is_eof() {
            let c = self.cursor.current();
            if c == b'_' {
                if after_digit && char::from(self.cursor.peek()).is_digit(radix) {
                    self.cursor.advance();
                    after_digit = false;
                    continue;
                }
                let pos = self.cursor.pos();
                self.error(LexErrorKind::TrailingUnderscore, Span::new(pos, pos + 1));
                // `1__2`: the rest of the run belongs to this literal.
                self.cursor.eat_while(|b| b == b'_' || char::from(b).is_digit(radix));
                break;
            }
            if radix == 8 && matches!(c, b'8' | b'9') {
                let pos = self.cursor.pos();
                self.error(LexErrorKind::InvalidOctalDigit, Span::new(pos, pos + 1));
                self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
                break;
            }
            if !char::from(c).is_digit(radix) {
                break;
            }
            digits.push(char::from(c));
            self.cursor.advance();
            after_digit = true;
        }
        digits
    }

    /// `e`, `E` followed by an optionally signed digit.
    fn at_exponent(&self) -> bool {
        matches!(self.cursor.current(), b'e' | b'E')
            && (self.cursor.peek().is_ascii_digit()
                || (matches!(self.cursor.peek(), b'+' | b'-')
                    && self.cursor.peek_at(2).is_ascii_digit()))
    }

    fn scan_exponent(&mut self, text: &mut String) {
        self.cursor.advance();
        text.push('e');
        let sign = self.cursor.current();
        if matches!(sign, b'+' | b'-') {
            text.push(char::from(sign));
            self.cursor.advance();
        }
        text.push_str(&self.scan_digits(10, false));
    }

    pub(super) fn lex_number(&mut self, start: u32) -> Token {
        self.state = LexState::End;
        let mut radix = 10;
        let mut prefixed = false;
        if self.cursor.current() == b'0' {
            match self.cursor.peek() {
                b'x' | b'X' => (radix, prefixed) = (16, true),
                b'b' | b'B' => (radix, prefixed) = (2, true),
                b'o' | b'O' => (radix, prefixed) = (8, true),
                b'd' | b'D' => (radix, prefixed) = (10, true),
                b'_' | b'0'..=b'9' => radix = 8,
                _ => {}
            }
        }

        if prefixed || radix == 8 {
            self.cursor.advance_n(if prefixed { 2 } else { 1 });
            let mut digits = self.scan_digits(radix, !prefixed);
            if digits.is_empty() {
                if prefixed {
                    self.error(
                        LexErrorKind::NumericWithoutDigits,
                        Span::new(start, self.cursor.pos()),
                    );
                }
                digits.push('0');
            }
            return self.finish_number(start, NumberLit::int(&digits, radix), false);
        }

        let mut text = self.scan_digits(10, false);
        let mut float = false;
        let mut exponent = false;
        if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            text.push('.');
            text.push_str(&self.scan_digits(10, false));
            float = true;
        }
        if self.at_exponent() {
            self.scan_exponent(&mut text);
            float = true;
            exponent = true;
        }
        let lit = if float {
            let value = text.parse::<f64>().unwrap_or(0.0);
            if value.is_infinite() {
                let literal = String::from_utf8_lossy(self.cursor.slice_from(start)).into_owned();
                self.error(
                    LexErrorKind::FloatOutOfRange { text: literal },
                    Span::new(start, self.cursor.pos()),
                );
            }
            NumberLit::float(value)
        } else {
            NumberLit::int(&text, 10)
        };
        self.finish_number(start, lit, exponent)
    }

    /// Apply `r`, `i` or `ri` suffixes, unless they run into a name.
    fn finish_number(&mut self, start: u32, mut lit: NumberLit, exponent: bool) -> Token {
        let save = self.cursor.pos();
        let rational = !exponent && self.cursor.eat(b'r');
        let imaginary = self.cursor.eat(b'i');
        let c = self.cursor.current();
        let runs_on = !self.cursor.is_eof() && (c.is_ascii_alphabetic() || c == b'_' || c >= 0x80);
        if (rational || imaginary) && runs_on {
            self.cursor.set_pos(save);
        } else {
            lit.rational = rational;
            lit.imaginary = imaginary;
        }
        self.finish(TokenKind::Number(Box::new(lit)), start)
    }

    /// `.5` (no leading digit) or `1.2.3` (a second fraction): reported
    /// and skipped without producing a token.
    pub(super) fn skip_dot_fraction(&mut self, start: u32) {
        let after_number = start > self.content_start
            && self
                .source
                .get(start as usize - 1)
                .is_some_and(u8::is_ascii_digit);
        self.cursor.advance();
        self.scan_digits(10, false);
        if self.at_exponent() {
            let mut sink = String::new();
            self.scan_exponent(&mut sink);
        }
        let kind = if after_number {
            LexErrorKind::FractionAfterNumeric
        } else {
            LexErrorKind::LeadingDotFloat
        };
        self.error(kind, Span::new(start, self.cursor.pos()));
        self.state = LexState::End;
    }
}
