use super::*;
use crate::ErrorCode;
use garnet_ir::Span;
use pretty_assertions::assert_eq;

fn err(msg: &str, start: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(msg)
        .with_label(Span::new(start, start + 1), "")
}

fn warn(msg: &str, start: u32) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W2004)
        .with_message(msg)
        .with_label(Span::new(start, start + 1), "")
}

fn messages(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().map(|d| d.message.as_str()).collect()
}

// === Ordering ===

#[test]
fn test_flush_sorts_by_position() {
    let mut queue = DiagnosticQueue::new();
    queue.add(err("third", 20), 3, 1);
    queue.add(err("first", 0), 1, 1);
    queue.add(err("second", 10), 2, 5);

    assert_eq!(messages(&queue.flush()), vec!["first", "second", "third"]);
}

#[test]
fn test_flush_is_stable_for_equal_positions() {
    let mut queue = DiagnosticQueue::new();
    queue.add(err("b", 5), 2, 1);
    queue.add(err("a", 5), 1, 1);
    queue.add(err("c", 5), 2, 1);

    assert_eq!(messages(&queue.flush()), vec!["a", "b", "c"]);
}

#[test]
fn test_flush_resets_state() {
    let mut queue = DiagnosticQueue::new();
    queue.add(err("x", 0), 1, 1);
    assert!(queue.has_errors());
    let _ = queue.flush();
    assert!(!queue.has_errors());
    assert!(queue.is_empty());
    // the same diagnostic is accepted again after a flush
    assert!(queue.add(err("x", 0), 1, 1));
}

// === Limits ===

#[test]
fn test_error_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::default().with_error_limit(2));
    assert!(queue.add(err("a", 0), 1, 1));
    assert!(queue.add(err("b", 1), 1, 2));
    assert!(queue.limit_reached());
    assert!(!queue.add(err("c", 2), 1, 3));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_warnings_ignore_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::default().with_error_limit(1));
    queue.add(err("a", 0), 1, 1);
    assert!(queue.add(warn("w", 4), 1, 5));
    assert_eq!(queue.warning_count(), 1);
}

#[test]
fn test_unlimited() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    for i in 0..50 {
        assert!(queue.add(err("same", 0), 1, i + 1));
    }
    assert_eq!(queue.error_count(), 50);
}

// === Deduplication ===

#[test]
fn test_exact_duplicates_dropped() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err("dup", 3), 1, 4));
    assert!(!queue.add(err("dup", 3), 1, 4));
    // same message, different span
    assert!(queue.add(err("dup", 7), 1, 8));
    assert_eq!(queue.flush().len(), 2);
}

#[test]
fn test_add_with_table_computes_position() {
    let source = b"a\nbc d\n";
    let table = LineOffsetTable::build(source);
    let mut queue = DiagnosticQueue::new();
    queue.add_with_table(err("late", 5), &table, source);
    queue.add_with_table(err("early", 2), &table, source);
    assert_eq!(messages(&queue.flush()), vec!["early", "late"]);
}
