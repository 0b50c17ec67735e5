use super::*;
use pretty_assertions::assert_eq;

// === ParseError ===

#[test]
fn unexpected_without_expectation() {
    let err = ParseError::unexpected(&TokenKind::Eof, Span::point(3), None);
    assert_eq!(err.message, "unexpected end-of-input");
    assert!(err.is_unexpected_token());
}

#[test]
fn unexpected_with_expectation() {
    let err = ParseError::unexpected(
        &TokenKind::Ident("e".into()),
        Span::new(1, 2),
        Some("end-of-input"),
    );
    assert_eq!(
        err.message,
        "unexpected local variable or method, expecting end-of-input"
    );
}

#[test]
fn inner_context_wins() {
    let err = ParseError::new(ErrorCode::E1001, "x", Span::point(0))
        .with_context(ErrorContext::Params)
        .with_context(ErrorContext::MethodDef);
    assert_eq!(err.context, Some(ErrorContext::Params));
}

#[test]
fn diagnostic_carries_note_and_help() {
    let diag = ParseError::new(ErrorCode::E1004, "bad", Span::new(2, 5))
        .with_context(ErrorContext::Params)
        .with_help("use a local variable name")
        .to_diagnostic();
    assert!(diag.is_error());
    assert_eq!(diag.code, ErrorCode::E1004);
    assert_eq!(diag.primary_span(), Some(Span::new(2, 5)));
    assert_eq!(diag.notes, vec!["while parsing a parameter list".to_string()]);
    assert_eq!(diag.suggestions.len(), 1);
}

// === ParseWarning ===

#[test]
fn warning_messages() {
    assert_eq!(
        ParseWarning::LiteralInCondition { what: "string" }.message(),
        "string literal in condition"
    );
    assert_eq!(
        ParseWarning::LiteralInCondition { what: "" }.message(),
        "literal in condition"
    );
    assert_eq!(
        ParseWarning::UselessUse { what: "a literal" }.message(),
        "possibly useless use of a literal in void context"
    );
    assert_eq!(
        ParseWarning::UnusedVariable { name: "a".into() }.message(),
        "assigned but unused variable - a"
    );
    assert_eq!(
        ParseWarning::ComparisonAfterComparison { op: "<" }.message(),
        "comparison '<' after comparison"
    );
}

#[test]
fn warning_levels() {
    assert_eq!(ParseWarning::StringInFlipFlop.level(), Verbosity::Normal);
    assert_eq!(
        ParseWarning::LiteralAssignInCondition.level(),
        Verbosity::Normal
    );
    assert_eq!(
        ParseWarning::UselessUse { what: "nil" }.level(),
        Verbosity::Verbose
    );
}

#[test]
fn warning_diagnostic_is_not_an_error() {
    let diag = ParseWarning::StringInFlipFlop.to_diagnostic(Span::new(0, 4));
    assert!(!diag.is_error());
    assert_eq!(diag.code, ErrorCode::W2001);
}

// === SyntaxError ===

#[test]
fn syntax_error_displays_rendered_text() {
    let diag = ParseError::new(ErrorCode::E1011, "class/module name must be CONSTANT", Span::new(6, 9))
        .to_diagnostic();
    let err = SyntaxError::new("-:1: syntax error found".into(), vec![diag], Vec::new());
    assert_eq!(err.to_string(), "-:1: syntax error found");
    assert_eq!(err.messages(), vec!["class/module name must be CONSTANT"]);
    assert!(err.warnings().is_empty());
}
