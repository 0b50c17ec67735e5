use super::*;
use garnet_lexer_core::SourceBuffer;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn string_ctx() -> EscapeContext {
    EscapeContext {
        term: b'"',
        encoding: Encoding::UTF_8,
        char_literal: false,
    }
}

/// Cook one escape at the start of `src`; returns the bytes, the errors and
/// the offset the cursor stopped at.
fn cook_with(src: &str, ctx: EscapeContext) -> (Vec<u8>, Vec<LexError>, u32) {
    let buf = SourceBuffer::new(src.as_bytes(), Encoding::UTF_8);
    let mut cursor = buf.cursor();
    let mut out = Vec::new();
    let mut errors = Vec::new();
    read_escape(&mut cursor, &ctx, &mut out, &mut errors);
    (out, errors, cursor.pos())
}

fn cook(src: &str) -> (Vec<u8>, Vec<LexError>, u32) {
    cook_with(src, string_ctx())
}

fn kinds(errors: &[LexError]) -> Vec<(LexErrorKind, Span)> {
    errors.iter().map(|e| (e.kind.clone(), e.span)).collect()
}

// === Simple escapes ===

#[test]
fn single_letter_escapes() {
    for (src, byte) in [
        (r"\n", b'\n'),
        (r"\t", b'\t'),
        (r"\s", b' '),
        (r"\e", 0x1b),
        (r"\a", 0x07),
        (r"\v", 0x0b),
    ] {
        let (out, errors, end) = cook(src);
        assert_eq!(out, vec![byte], "{src}");
        assert!(errors.is_empty());
        assert_eq!(end, 2);
    }
}

#[test]
fn unknown_letter_is_itself() {
    let (out, errors, _) = cook(r"\q");
    assert_eq!(out, b"q".to_vec());
    assert!(errors.is_empty());
}

#[test]
fn escaped_newline_is_continuation() {
    let (out, errors, end) = cook("\\\nx");
    assert!(out.is_empty());
    assert!(errors.is_empty());
    assert_eq!(end, 2);
}

#[test]
fn octal_reads_at_most_three_digits() {
    let (out, _, end) = cook(r"\1012");
    assert_eq!(out, b"A".to_vec());
    assert_eq!(end, 4);
}

// === Hex ===

#[test]
fn hex_escape() {
    let (out, errors, end) = cook(r"\x41B");
    assert_eq!(out, b"A".to_vec());
    assert!(errors.is_empty());
    assert_eq!(end, 4);
}

#[test]
fn hex_without_digits() {
    let (out, errors, _) = cook(r"\xg");
    assert!(out.is_empty());
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::InvalidHexEscape, Span::new(0, 2))]
    );
}

// === Unicode ===

#[test]
fn four_digit_unicode() {
    let (out, errors, _) = cook(r"\u00e9");
    assert_eq!(out, "é".as_bytes().to_vec());
    assert!(errors.is_empty());
}

#[test]
fn short_unicode_is_invalid() {
    let (_, errors, _) = cook(r"\u12");
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::InvalidUnicodeEscape, Span::new(0, 4))]
    );
}

#[test]
fn braced_unicode_list() {
    let (out, errors, end) = cook(r"\u{41 42  43}");
    assert_eq!(out, b"ABC".to_vec());
    assert!(errors.is_empty());
    assert_eq!(end, 13);
}

#[test]
fn braced_unicode_too_large() {
    let (_, errors, _) = cook(r"\u{110000}");
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::UnicodeTooLarge, Span::new(3, 9))]
    );
}

#[test]
fn braced_unicode_too_many_digits() {
    let (_, errors, _) = cook(r"\u{0000041}");
    assert_eq!(errors[0].kind, LexErrorKind::InvalidUnicodeEscape);
}

#[test]
fn surrogate_is_invalid() {
    let (out, errors, _) = cook(r"\u{d800}");
    assert!(out.is_empty());
    assert_eq!(errors[0].kind, LexErrorKind::InvalidUnicodeEscape);
}

#[test]
fn braced_unicode_stops_at_terminator() {
    let (_, errors, end) = cook("\\u{41\"");
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::UnterminatedUnicodeEscape, Span::new(5, 6))]
    );
    assert_eq!(end, 5);
}

#[test]
fn bad_char_with_closing_brace() {
    let (_, errors, end) = cook(r"\u{g}x");
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::InvalidUnicodeEscape, Span::new(3, 4))]
    );
    assert_eq!(end, 5);
}

#[test]
fn bad_char_without_closing_brace() {
    let (_, errors, _) = cook("\\u{g\n");
    assert_eq!(
        kinds(&errors),
        vec![
            (LexErrorKind::UnterminatedUnicodeEscape, Span::new(3, 4)),
            (LexErrorKind::InvalidUnicodeEscape, Span::new(3, 4)),
        ]
    );
}

#[test]
fn char_literal_rejects_multiple_codepoints() {
    let ctx = EscapeContext {
        term: 0,
        encoding: Encoding::UTF_8,
        char_literal: true,
    };
    let (_, errors, _) = cook_with(r"\u{41 42}", ctx);
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::MultipleCodepoints, Span::new(0, 9))]
    );
}

// === Control and meta ===

#[test]
fn control_and_meta_values() {
    assert_eq!(cook(r"\C-a").0, vec![0x01]);
    assert_eq!(cook(r"\ca").0, vec![0x01]);
    assert_eq!(cook(r"\M-a").0, vec![0xe1]);
    assert_eq!(cook(r"\M-\C-a").0, vec![0x81]);
    assert_eq!(cook(r"\C-\M-a").0, vec![0x81]);
    assert_eq!(cook(r"\c?").0, vec![0x7f]);
    assert_eq!(cook(r"\C-?").0, vec![0x7f]);
}

#[test]
fn meta_without_dash() {
    let (out, errors, end) = cook(r"\M1");
    assert!(out.is_empty());
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::InvalidEscapeSyntax, Span::new(0, 3))]
    );
    assert_eq!(end, 3);
}

#[test]
fn unicode_inside_control_is_invalid() {
    let (_, errors, _) = cook(r"\c\u0041");
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::InvalidEscapeSyntax, Span::new(0, 4))]
    );
    let (_, errors, _) = cook(r"\C-\u0041");
    assert_eq!(errors[0].span, Span::new(0, 5));
}

#[test]
fn duplicate_prefix_is_invalid() {
    let (_, errors, _) = cook(r"\M-\M-a");
    assert_eq!(errors[0].kind, LexErrorKind::InvalidEscapeSyntax);
}

#[test]
fn raw_control_byte_operand_is_invalid() {
    let (_, errors, _) = cook("\\C-\x01");
    assert_eq!(errors[0].kind, LexErrorKind::InvalidEscapeSyntax);
}

#[test]
fn space_operand_warns_with_prefix() {
    let (out, errors, _) = cook(r"\C-\M- ");
    assert_eq!(out, vec![0x80]);
    assert_eq!(
        errors[0].kind,
        LexErrorKind::DeprecatedEscape {
            suggestion: "\\C-\\M-\\s".to_string()
        }
    );
}

#[test]
fn tab_operand_suggestion() {
    let (_, errors, _) = cook("\\M-\t");
    assert_eq!(errors[0].message(), "invalid character syntax; use \\M-\\t");
    let (_, errors, _) = cook("\\C-\t");
    assert_eq!(errors[0].message(), "invalid character syntax; use \\t");
}

#[test]
fn char_literal_suggestion_has_question_mark() {
    let ctx = EscapeContext {
        term: 0,
        encoding: Encoding::UTF_8,
        char_literal: true,
    };
    let (_, errors, _) = cook_with(r"\M- ", ctx);
    assert_eq!(errors[0].message(), "invalid character syntax; use ?\\M-\\s");
}

// === Multibyte ===

#[test]
fn escaped_multibyte_is_copied() {
    let (out, errors, _) = cook("\\あ");
    assert_eq!(out, "あ".as_bytes().to_vec());
    assert!(errors.is_empty());
}

#[test]
fn invalid_multibyte_reported_once() {
    let buf = SourceBuffer::new(b"\xff\xfe!", Encoding::UTF_8);
    let mut cursor = buf.cursor();
    let mut out = Vec::new();
    let mut errors = Vec::new();
    assert!(!push_multibyte(
        &mut cursor,
        Encoding::UTF_8,
        &mut out,
        &mut errors
    ));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "invalid multibyte char (UTF-8)");
    assert_eq!(cursor.current(), b'!');
}

// === Regexp ===

fn copy_regexp(src: &str) -> (Vec<u8>, Vec<LexError>) {
    let buf = SourceBuffer::new(src.as_bytes(), Encoding::UTF_8);
    let mut cursor = buf.cursor();
    let mut out = Vec::new();
    let mut errors = Vec::new();
    copy_regexp_escape(&mut cursor, b'/', Encoding::UTF_8, &mut out, &mut errors);
    (out, errors)
}

#[test]
fn regexp_escapes_stay_verbatim() {
    assert_eq!(copy_regexp(r"\d").0, br"\d".to_vec());
    assert_eq!(copy_regexp(r"\/").0, b"/".to_vec());
    assert_eq!(copy_regexp(r"\u{41}").0, br"\u{41}".to_vec());
}

#[test]
fn regexp_short_unicode() {
    let (_, errors) = copy_regexp(r"\u12");
    assert_eq!(
        kinds(&errors),
        vec![(LexErrorKind::TooShortEscape, Span::new(0, 4))]
    );
}

#[test]
fn regexp_unicode_list_across_lines() {
    let (_, errors) = copy_regexp("\\u{41\n}");
    assert_eq!(errors[0].kind, LexErrorKind::InvalidUnicodeList);
}

// === Properties ===

proptest! {
    #[test]
    fn hex_and_octal_escapes_produce_the_byte(byte in any::<u8>()) {
        let (out, errors, _) = cook(&format!("\\x{byte:02x}"));
        prop_assert_eq!(out, vec![byte]);
        prop_assert!(errors.is_empty());
        let (out, _, _) = cook(&format!("\\{byte:03o}"));
        prop_assert_eq!(out, vec![byte]);
    }

    #[test]
    fn braced_unicode_encodes_any_scalar(ch in any::<char>()) {
        let (out, errors, _) = cook(&format!("\\u{{{:x}}}", ch as u32));
        prop_assert!(errors.is_empty());
        prop_assert_eq!(out, ch.to_string().into_bytes());
    }
}
