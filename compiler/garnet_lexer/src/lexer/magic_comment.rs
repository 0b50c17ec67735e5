//! Magic comments.
//!
//! Every comment is tried as a magic comment, either in the emacs form
//! `# -*- key: value; key: value -*-` or as a single `# key: value`. Keys
//! compare case-insensitively with `-` and `_` interchangeable.
//!
//! `coding`/`encoding` only count on the first line, or the second after a
//! `#!` line. There a comment that is not a magic comment is still searched
//! for `coding[:=] name`, as in `# vim: set fileencoding=utf-8`.

use garnet_ir::{ShareableMode, Span};
use garnet_lexer_core::{Encoding, EncodingError};

use super::Lexer;
use crate::lex_error::LexErrorKind;

/// Settings collected from magic comments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MagicComments {
    /// Source encoding declared with `coding:`.
    pub encoding: Option<Encoding>,
    pub frozen_string_literal: Option<bool>,
    pub warn_indent: Option<bool>,
    /// Every valid `shareable_constant_value` directive, in source order.
    pub shareable_constant_value: Vec<(ShareableMode, Span)>,
}

/// One `key: value` pair; `value` is an absolute span.
#[derive(Debug, PartialEq)]
struct MagicPair {
    key: String,
    value: Span,
}

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0b | 0x0c)
}

fn normalize_key(key: &[u8]) -> String {
    key.iter()
        .map(|&b| if b == b'-' { '_' } else { char::from(b.to_ascii_lowercase()) })
        .collect()
}

/// Trim blanks from both ends of `start..end` within `source`.
fn trim(source: &[u8], mut start: u32, mut end: u32) -> (u32, u32) {
    while start < end && is_blank(source[start as usize]) {
        start += 1;
    }
    while end > start && is_blank(source[end as usize - 1]) {
        end -= 1;
    }
    (start, end)
}

/// Split `key: value` in `start..end`. The key must be a word; the value
/// must be non-empty.
fn split_pair(source: &[u8], start: u32, end: u32) -> Option<MagicPair> {
    let (start, end) = trim(source, start, end);
    let text = &source[start as usize..end as usize];
    let colon = u32::try_from(text.iter().position(|&b| b == b':')?).ok()?;
    let (key_start, key_end) = trim(source, start, start + colon);
    let key = &source[key_start as usize..key_end as usize];
    if key.is_empty() || !key.iter().all(|&b| is_key_byte(b)) {
        return None;
    }
    let (value_start, value_end) = trim(source, start + colon + 1, end);
    if value_start == value_end {
        return None;
    }
    Some(MagicPair {
        key: normalize_key(key),
        value: Span::new(value_start, value_end),
    })
}

/// Parse the comment body `start..end` (after `#`) as a magic comment.
fn parse_magic(source: &[u8], start: u32, end: u32) -> Vec<MagicPair> {
    let body = &source[start as usize..end as usize];
    if let Some(open) = memchr::memmem::find(body, b"-*-") {
        let inner_start = open + 3;
        let Some(close) = memchr::memmem::find(&body[inner_start..], b"-*-") else {
            return Vec::new();
        };
        let base = start as usize + inner_start;
        let inner = &body[inner_start..inner_start + close];
        let mut pairs = Vec::new();
        let mut seg_start = 0;
        for seg_end in inner
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == b';')
            .map(|(i, _)| i)
            .chain(std::iter::once(inner.len()))
        {
            let (Ok(s), Ok(e)) = (u32::try_from(base + seg_start), u32::try_from(base + seg_end))
            else {
                break;
            };
            pairs.extend(split_pair(source, s, e));
            seg_start = seg_end + 1;
        }
        return pairs;
    }
    match split_pair(source, start, end) {
        Some(pair)
            if !source[pair.value.start as usize..pair.value.end as usize]
                .iter()
                .any(|&b| is_blank(b)) =>
        {
            vec![pair]
        }
        _ => Vec::new(),
    }
}

fn parse_bool(value: &[u8]) -> Option<bool> {
    if value.eq_ignore_ascii_case(b"true") {
        Some(true)
    } else if value.eq_ignore_ascii_case(b"false") {
        Some(false)
    } else {
        None
    }
}

impl Lexer<'_> {
    /// Handle the comment `hash..end` (`hash` is the `#`).
    pub(super) fn process_comment(&mut self, hash: u32, end: u32) {
        let at_top = self.comment_at_top(hash);
        let pairs = parse_magic(self.source, hash + 1, end);
        if pairs.is_empty() {
            if at_top {
                self.scan_coding(hash + 1, end);
            }
            return;
        }
        let comment = Span::new(hash, end);
        for pair in pairs {
            self.apply_magic(&pair, comment, at_top);
        }
    }

    /// First line, or the second after a `#!` line.
    fn comment_at_top(&self, hash: u32) -> bool {
        match self.lines.line_from_offset(hash) {
            1 => true,
            2 => self
                .source
                .get(self.content_start as usize..)
                .is_some_and(|s| s.starts_with(b"#!")),
            _ => false,
        }
    }

    /// Only whitespace precedes the `#` on its line.
    fn comment_only_line(&self, hash: u32) -> bool {
        let line = self.lines.line_from_offset(hash);
        let line_start = self
            .lines
            .line_start_offset(line)
            .unwrap_or(0)
            .max(self.content_start);
        self.source[line_start as usize..hash as usize]
            .iter()
            .all(|&b| is_blank(b))
    }

    fn apply_magic(&mut self, pair: &MagicPair, comment: Span, at_top: bool) {
        let value = &self.source[pair.value.start as usize..pair.value.end as usize];
        match pair.key.as_str() {
            "coding" | "encoding" => {
                if at_top {
                    self.declare_encoding(pair.value);
                }
            }
            "frozen_string_literal" => {
                let key = "frozen_string_literal";
                if self.seen_token {
                    self.error(LexErrorKind::MagicIgnoredAfterTokens { key }, comment);
                    return;
                }
                match parse_bool(value) {
                    Some(flag) => self.magic.frozen_string_literal = Some(flag),
                    None => self.invalid_magic_value(key, pair.value),
                }
            }
            "warn_indent" => match parse_bool(value) {
                Some(flag) => self.magic.warn_indent = Some(flag),
                None => self.invalid_magic_value("warn_indent", pair.value),
            },
            "warn_past_scope" => {
                if parse_bool(value).is_none() {
                    self.invalid_magic_value("warn_past_scope", pair.value);
                }
            }
            "shareable_constant_value" => {
                let key = "shareable_constant_value";
                if !self.comment_only_line(comment.start) {
                    self.error(LexErrorKind::MagicNotCommentOnly { key }, comment);
                    return;
                }
                let mode = std::str::from_utf8(value)
                    .ok()
                    .and_then(ShareableMode::from_value);
                match mode {
                    Some(mode) => {
                        self.magic.shareable_constant_value.push((mode, comment));
                        self.directives.push((mode, comment));
                    }
                    None => self.invalid_magic_value(key, pair.value),
                }
            }
            _ => {}
        }
    }

    fn invalid_magic_value(&mut self, key: &'static str, value: Span) {
        let text = String::from_utf8_lossy(
            &self.source[value.start as usize..value.end as usize],
        )
        .into_owned();
        self.error(LexErrorKind::MagicInvalidValue { key, value: text }, value);
    }

    /// Search a top comment for `coding[:=] name`.
    fn scan_coding(&mut self, start: u32, end: u32) {
        let body = &self.source[start as usize..end as usize];
        let lower = body.to_ascii_lowercase();
        let Some(at) = memchr::memmem::find(&lower, b"coding") else {
            return;
        };
        let mut i = at + 6;
        while body.get(i).is_some_and(|&b| is_blank(b)) {
            i += 1;
        }
        if !matches!(body.get(i), Some(b':' | b'=')) {
            return;
        }
        i += 1;
        while body.get(i).is_some_and(|&b| is_blank(b)) {
            i += 1;
        }
        let name_len = body[i..].iter().take_while(|&&b| is_key_byte(b)).count();
        if name_len == 0 {
            return;
        }
        let (Ok(name_start), Ok(name_end)) = (
            u32::try_from(start as usize + i),
            u32::try_from(start as usize + i + name_len),
        ) else {
            return;
        };
        self.declare_encoding(Span::new(name_start, name_end));
    }

    /// Switch to the encoding named at `name`, unless a BOM fixed it.
    fn declare_encoding(&mut self, name: Span) {
        if self.encoding_locked {
            return;
        }
        let text = String::from_utf8_lossy(&self.source[name.start as usize..name.end as usize])
            .into_owned();
        match Encoding::find(&text) {
            Ok(encoding) => {
                self.encoding = encoding;
                self.magic.encoding = Some(encoding);
            }
            Err(EncodingError::Unknown(name_text)) => {
                self.error(LexErrorKind::UnknownEncoding { name: name_text }, name);
            }
            Err(err) => {
                self.error(
                    LexErrorKind::UnusableEncoding {
                        message: err.to_string(),
                    },
                    name,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests;
