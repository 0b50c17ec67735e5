use super::*;
use garnet_ir::TokenKind;
use garnet_lexer_core::SourceBuffer;
use pretty_assertions::assert_eq;

/// Lex all of `src`; returns the magic settings, the errors and the
/// directives the parser would see.
fn run(src: &[u8]) -> (MagicComments, Vec<(LexErrorKind, Span)>, Vec<(ShareableMode, Span)>) {
    let buf = SourceBuffer::new(src, Encoding::UTF_8);
    let mut lexer = Lexer::new(&buf);
    while lexer.next_token().kind != TokenKind::Eof {}
    let errors = lexer
        .take_errors()
        .into_iter()
        .map(|e| (e.kind, e.span))
        .collect();
    let directives = lexer.take_directives();
    (lexer.magic().clone(), errors, directives)
}

// === Parsing ===

#[test]
fn plain_form() {
    let src = b"# Frozen-String-Literal: true";
    let pairs = parse_magic(src, 1, 29);
    assert_eq!(
        pairs,
        vec![MagicPair {
            key: "frozen_string_literal".into(),
            value: Span::new(25, 29),
        }]
    );
}

#[test]
fn plain_form_rejects_spaced_values() {
    let src = b"# note: not magic";
    assert!(parse_magic(src, 1, 17).is_empty());
}

#[test]
fn emacs_form_splits_on_semicolons() {
    let src = b"# -*- coding: binary; mode: ruby -*-";
    let keys: Vec<_> = parse_magic(src, 1, 36)
        .into_iter()
        .map(|p| p.key)
        .collect();
    assert_eq!(keys, vec!["coding".to_string(), "mode".to_string()]);
}

#[test]
fn emacs_form_needs_closing_marker() {
    let src = b"# -*- coding: binary";
    assert!(parse_magic(src, 1, 20).is_empty());
}

// === Encoding ===

#[test]
fn coding_on_first_line() {
    let (magic, errors, _) = run(b"# coding: binary\n");
    assert_eq!(magic.encoding, Some(Encoding::BINARY));
    assert!(errors.is_empty());
}

#[test]
fn coding_after_shebang() {
    let (magic, _, _) = run(b"#!/usr/bin/env garnet\n# -*- encoding: binary -*-\n");
    assert_eq!(magic.encoding, Some(Encoding::BINARY));
}

#[test]
fn coding_below_the_top_is_ignored() {
    let (magic, errors, _) = run(b"x\n# coding: binary\n");
    assert_eq!(magic.encoding, None);
    assert!(errors.is_empty());
}

#[test]
fn vim_style_fileencoding() {
    let (magic, _, _) = run(b"# vim: set fileencoding=binary :\n");
    assert_eq!(magic.encoding, Some(Encoding::BINARY));
}

#[test]
fn unknown_encoding_points_at_name() {
    let (_, errors, _) = run(b"# coding: foo");
    assert_eq!(
        errors,
        vec![(
            LexErrorKind::UnknownEncoding { name: "foo".into() },
            Span::new(10, 13)
        )]
    );
    let (_, errors, _) = run(b"# coding = foo");
    assert_eq!(errors[0].1, Span::new(11, 14));
}

#[test]
fn process_default_encoding_is_unusable() {
    let (_, errors, _) = run(b"# coding: locale");
    assert!(matches!(
        errors[0].0,
        LexErrorKind::UnusableEncoding { .. }
    ));
}

#[test]
fn bom_fixes_the_encoding() {
    let (magic, errors, _) = run(b"\xEF\xBB\xBF# coding: binary\n");
    assert_eq!(magic.encoding, None);
    assert!(errors.is_empty());
}

// === Flags ===

#[test]
fn frozen_string_literal() {
    let (magic, _, _) = run(b"# frozen_string_literal: true\nx");
    assert_eq!(magic.frozen_string_literal, Some(true));
}

#[test]
fn frozen_string_literal_after_tokens() {
    let (magic, errors, _) = run(b"x\n# frozen_string_literal: true\n");
    assert_eq!(magic.frozen_string_literal, None);
    assert_eq!(
        errors[0].0,
        LexErrorKind::MagicIgnoredAfterTokens {
            key: "frozen_string_literal"
        }
    );
}

#[test]
fn frozen_string_literal_bad_value() {
    let (_, errors, _) = run(b"# frozen_string_literal: maybe\n");
    assert_eq!(
        errors,
        vec![(
            LexErrorKind::MagicInvalidValue {
                key: "frozen_string_literal",
                value: "maybe".into()
            },
            Span::new(25, 30)
        )]
    );
}

#[test]
fn warn_indent() {
    let (magic, _, _) = run(b"# warn_indent: false\n");
    assert_eq!(magic.warn_indent, Some(false));
}

// === shareable_constant_value ===

#[test]
fn shareable_directive() {
    let (magic, errors, directives) = run(b"# shareable_constant_value: literal\nA = 1\n");
    assert!(errors.is_empty());
    assert_eq!(
        directives,
        vec![(ShareableMode::Literal, Span::new(0, 35))]
    );
    assert_eq!(magic.shareable_constant_value, directives);
}

#[test]
fn shareable_needs_comment_only_line() {
    let (_, errors, directives) = run(b"x = 1 # shareable_constant_value: literal\n");
    assert!(directives.is_empty());
    assert_eq!(
        errors[0].0,
        LexErrorKind::MagicNotCommentOnly {
            key: "shareable_constant_value"
        }
    );
}

#[test]
fn shareable_bad_value() {
    let (_, errors, _) = run(b"# shareable_constant_value: bogus\n");
    assert_eq!(
        errors[0].0,
        LexErrorKind::MagicInvalidValue {
            key: "shareable_constant_value",
            value: "bogus".into()
        }
    );
}
