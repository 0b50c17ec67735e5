use super::*;
use proptest::prelude::*;

// === Linear scan ===

#[test]
fn test_line_from_offset_multiple_lines() {
    let source = b"line1\nline2\nline3";
    assert_eq!(line_from_offset(source, 0), 1);
    assert_eq!(line_from_offset(source, 5), 1); // the '\n' itself
    assert_eq!(line_from_offset(source, 6), 2);
    assert_eq!(line_from_offset(source, 12), 3);
}

#[test]
fn test_line_number_from_span() {
    let source = b"line1\nline2\nline3";
    assert_eq!(line_number(source, Span::new(6, 11)), 2);
}

#[test]
fn test_offset_to_line_col_multibyte() {
    let source = "αβγ\nδε".as_bytes();
    assert_eq!(offset_to_line_col(source, 0), (1, 1));
    assert_eq!(offset_to_line_col(source, 4), (1, 3));
    assert_eq!(offset_to_line_col(source, 7), (2, 1));
}

#[test]
fn test_offset_to_line_col_invalid_utf8() {
    // A lone continuation byte still counts as nothing; 0xFF counts as one.
    let source = b"\xff\xffa";
    assert_eq!(offset_to_line_col(source, 2), (1, 3));
}

#[test]
fn test_offset_past_end_clamps() {
    assert_eq!(offset_to_line_col(b"ab", 10), (1, 3));
    assert_eq!(offset_to_line_col(b"", 0), (1, 1));
}

// === LineOffsetTable ===

#[test]
fn test_table_build() {
    let table = LineOffsetTable::build(b"line1\nline2\n");
    assert_eq!(table.line_count(), 3);
    assert_eq!(table.line_start_offset(0), None);
    assert_eq!(table.line_start_offset(2), Some(6));
    assert_eq!(table.line_start_offset(3), Some(12));
    assert_eq!(table.line_start_offset(4), None);
}

#[test]
fn test_table_line_bounds() {
    let source = b"ab\r\ncd\nef";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.line_bounds(source, 1), Some(Span::new(0, 2)));
    assert_eq!(table.line_bounds(source, 2), Some(Span::new(4, 6)));
    assert_eq!(table.line_bounds(source, 3), Some(Span::new(7, 9)));
    assert_eq!(table.line_bounds(source, 4), None);
    assert_eq!(table.line_text(source, 2), b"cd");
    assert_eq!(table.line_text(source, 9), b"");
}

#[test]
fn test_table_empty_trailing_line() {
    let source = b"a\n";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.line_bounds(source, 2), Some(Span::new(2, 2)));
    assert_eq!(table.offset_to_line_col(source, 2), (2, 1));
}

#[test]
fn test_char_width() {
    assert_eq!(char_width(b""), 0);
    assert_eq!(char_width(b"abc"), 3);
    assert_eq!(char_width("あい".as_bytes()), 2);
}

proptest! {
    #[test]
    fn table_matches_linear_scan(source in "[a-z\\n\u{3b1}]{0,40}", offset in 0u32..48) {
        let bytes = source.as_bytes();
        let table = LineOffsetTable::build(bytes);
        let offset = offset.min(u32::try_from(bytes.len()).unwrap_or(0));
        prop_assert_eq!(table.line_from_offset(offset), line_from_offset(bytes, offset));
        prop_assert_eq!(
            table.offset_to_line_col(bytes, offset),
            offset_to_line_col(bytes, offset)
        );
    }
}
