use crate::{Encoding, SourceBuffer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn buffer(source: &str) -> SourceBuffer {
    SourceBuffer::new(source.as_bytes(), Encoding::UTF_8)
}

// === Basic Navigation ===

#[test]
fn current_and_peek() {
    let buf = buffer("abc");
    let cursor = buf.cursor();
    assert_eq!(cursor.current(), b'a');
    assert_eq!(cursor.peek(), b'b');
    assert_eq!(cursor.peek_at(2), b'c');
    assert_eq!(cursor.peek_at(3), 0);
    assert_eq!(cursor.peek_at(300), 0);
}

#[test]
fn advance_stops_at_eof() {
    let buf = buffer("hi");
    let mut cursor = buf.cursor();
    cursor.advance_n(10);
    assert!(cursor.is_eof());
    assert_eq!(cursor.pos(), 2);
    cursor.advance();
    assert_eq!(cursor.pos(), 2);
}

#[test]
fn interior_nul_is_not_eof() {
    let buf = SourceBuffer::new(b"a\0b", Encoding::UTF_8);
    let mut cursor = buf.cursor();
    cursor.advance();
    assert_eq!(cursor.current(), 0);
    assert!(!cursor.is_eof());
}

#[test]
fn prev_and_line_start() {
    let buf = buffer("a\nb");
    let mut cursor = buf.cursor();
    assert_eq!(cursor.prev(), None);
    assert!(cursor.at_line_start());
    cursor.advance();
    assert!(!cursor.at_line_start());
    cursor.advance();
    assert_eq!(cursor.prev(), Some(b'\n'));
    assert!(cursor.at_line_start());
}

#[test]
fn snapshot_is_independent() {
    let buf = buffer("abc");
    let mut cursor = buf.cursor();
    let snapshot = cursor;
    cursor.advance_n(2);
    assert_eq!(snapshot.pos(), 0);
    assert_eq!(cursor.pos(), 2);
}

// === Slices and prefixes ===

#[test]
fn slices() {
    let buf = buffer("hello world");
    let mut cursor = buf.cursor();
    cursor.advance_n(5);
    assert_eq!(cursor.slice_from(0), b"hello");
    assert_eq!(cursor.rest(), b" world");
    assert_eq!(cursor.slice(6, 100), b"world");
}

#[test]
fn eat_prefix_and_eat() {
    let buf = buffer("=begin x");
    let mut cursor = buf.cursor();
    assert!(!cursor.eat_prefix(b"=end"));
    assert!(cursor.eat_prefix(b"=begin"));
    assert!(cursor.eat(b' '));
    assert!(!cursor.eat(b' '));
    assert_eq!(cursor.current(), b'x');
}

// === Scanning ===

#[test]
fn eat_while_and_whitespace() {
    let buf = buffer("abc123 \t\x0b\x0cx");
    let mut cursor = buf.cursor();
    cursor.eat_while(|b| b.is_ascii_alphabetic());
    assert_eq!(cursor.pos(), 3);
    cursor.eat_while(|b| b.is_ascii_digit());
    assert!(cursor.eat_whitespace());
    assert_eq!(cursor.current(), b'x');
    assert!(!cursor.eat_whitespace());
}

#[test]
fn eat_until_newline() {
    let buf = buffer("# comment\ncode");
    let mut cursor = buf.cursor();
    cursor.eat_until_newline_or_eof();
    assert_eq!(cursor.current(), b'\n');
    cursor.advance();
    cursor.eat_until_newline_or_eof();
    assert!(cursor.is_eof());
}

#[test]
fn find_is_relative_to_the_buffer() {
    let buf = buffer("ab\ncd\n");
    let mut cursor = buf.cursor();
    cursor.advance_n(3);
    assert_eq!(cursor.find(b'\n'), Some(5));
    assert_eq!(cursor.find(b'x'), None);
}

#[test]
fn utf8_width() {
    assert_eq!(crate::Cursor::utf8_char_width(b'a'), 1);
    assert_eq!(crate::Cursor::utf8_char_width(0xC3), 2);
    assert_eq!(crate::Cursor::utf8_char_width(0xE3), 3);
    assert_eq!(crate::Cursor::utf8_char_width(0xF0), 4);
    assert_eq!(crate::Cursor::utf8_char_width(0x80), 1);
}

proptest! {
    #[test]
    fn find_matches_linear_search(source in "[a-e#\n]{0,64}") {
        let buf = buffer(&source);
        let cursor = buf.cursor();
        let expected = source.bytes().position(|b| b == b'#');
        prop_assert_eq!(cursor.find(b'#').map(|p| p as usize), expected);
    }

    #[test]
    fn position_never_exceeds_source(source in ".{0,32}", steps in proptest::collection::vec(0u32..8, 0..16)) {
        let buf = buffer(&source);
        let mut cursor = buf.cursor();
        for n in steps {
            cursor.advance_n(n);
            prop_assert!(cursor.pos() <= cursor.source_len());
        }
    }
}
