//! Lexer errors as seen through a parse.

use garnet_ir::{NodeKind, TokenKind};
use garnet_parse::{parse, ParseOptions};

use crate::common::{parse_err, parse_ok, single, syntax_error};

#[test]
fn unterminated_heredoc_names_its_terminator() {
    let err = syntax_error("x = 1\ny = <<FOO\nbody\nmore\n");
    assert_eq!(err.messages()[0], "can't find string \"FOO\" anywhere before EOF");
    // Anchored at the opening line, not at end of file.
    assert!(err.rendered().starts_with("-:2: "), "{}", err.rendered());
}

#[test]
fn heredoc_body_follows_the_rest_of_the_line() {
    let node = single("foo(<<A, 1)\nbody\nA\n");
    let Some(call) = node.as_call() else {
        panic!("not a call: {:?}", node.kind);
    };
    assert_eq!(call.args.len(), 2);
}

#[test]
fn multiple_codepoints_in_character_literal() {
    assert_eq!(
        syntax_error("?\\u{41 42}").messages(),
        vec!["Multiple codepoints at single character literal"]
    );
}

#[test]
fn escape_errors() {
    parse_err("\"\\xZ\"", "invalid hex escape");
    parse_err("\"\\u{41\"", "unterminated Unicode escape");
    parse_err("\"\\u12\"", "invalid Unicode escape sequence");
}

#[test]
fn numeric_errors() {
    parse_err("1_", "trailing '_' in number");
    parse_err("0x", "numeric literal without digits");
}

#[test]
fn doubled_underscore_is_one_error() {
    assert_eq!(
        syntax_error("x = 1__2").messages(),
        vec!["trailing '_' in number"]
    );
}

#[test]
fn percent_literal_errors() {
    parse_err("%z(a)", "unknown type of %string");
    parse_err("%w(a b", "unterminated list meets end of file");
}

#[test]
fn embedded_document_needs_end() {
    parse_err("=begin\ndoc\n", "embedded document meets end of file");
}

#[test]
fn invalid_byte_is_quoted_in_hex() {
    parse_err("x = \x01", "Invalid char '\\x01' in expression");
}

#[test]
fn invalid_byte_is_reported_once() {
    assert_eq!(
        syntax_error("\"\\x01\"\n\x01").messages(),
        vec!["Invalid char '\\x01' in expression"]
    );
    assert_eq!(syntax_error("x = \x01").messages().len(), 1);
}

#[test]
fn soft_end_of_input() {
    let Ok(out) = parse(b"x = 1\n\x04 this is ignored (", &ParseOptions::default()) else {
        panic!("^D should end the input");
    };
    let NodeKind::Seq(stmts) = &out.ast.kind else {
        panic!("root is not a sequence");
    };
    assert_eq!(stmts.len(), 1);
    parse_ok("x = 1\n__END__\n( not code");
}

#[test]
fn unknown_encoding_is_fatal() {
    parse_err("# coding: no-such-thing\n", "unknown encoding name: no-such-thing");
}

#[test]
fn token_stream_for_tools() {
    let out = garnet_lexer::lex(b"x = <<A\nbody\nA\n");
    assert!(out.diagnostics.is_empty());
    assert_eq!(out.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}
