//! Shared test utilities for phase tests.

use garnet_ir::{Node, NodeKind};
use garnet_parse::{parse_str, ParseOptions, ParseOutput, SyntaxError, Verbosity};

/// Parse `source` with default options and assert it succeeds.
pub fn parse_ok(source: &str) -> ParseOutput {
    parse_ok_with(source, &ParseOptions::default())
}

pub fn parse_ok_with(source: &str, options: &ParseOptions) -> ParseOutput {
    match parse_str(source, options) {
        Ok(output) => output,
        Err(err) => panic!("Expected successful parse, but got errors:\n{err}\nSource:\n{source}"),
    }
}

/// Parse `source` and assert it fails.
pub fn syntax_error(source: &str) -> SyntaxError {
    match parse_str(source, &ParseOptions::default()) {
        Ok(_) => panic!("Expected a syntax error, but parsing succeeded.\nSource: {source}"),
        Err(err) => err,
    }
}

/// Parse `source` and assert one of its errors contains `expected`.
pub fn parse_err(source: &str, expected: &str) {
    let err = syntax_error(source);
    assert!(
        err.messages().iter().any(|m| m.contains(expected)),
        "Expected parse error containing '{expected}', but got:\n{err}"
    );
}

/// Messages of every warning at the verbose level.
pub fn warnings_of(source: &str) -> Vec<String> {
    let options = ParseOptions::default().with_verbosity(Verbosity::Verbose);
    parse_ok_with(source, &options)
        .warnings
        .into_iter()
        .map(|w| w.message)
        .collect()
}

/// Top-level statements of a successful parse.
pub fn statements(source: &str) -> Vec<Node> {
    match parse_ok(source).ast.kind {
        NodeKind::Seq(stmts) => stmts,
        other => panic!("root is not a sequence: {other:?}"),
    }
}

/// The only top-level statement.
pub fn single(source: &str) -> Node {
    let mut stmts = statements(source);
    assert_eq!(stmts.len(), 1, "expected one statement in {source:?}");
    match stmts.pop() {
        Some(node) => node,
        None => panic!("{source:?} has no statements"),
    }
}
