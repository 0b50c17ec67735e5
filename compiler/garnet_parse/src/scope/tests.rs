use super::*;
use pretty_assertions::assert_eq;

fn name(s: &str) -> Name {
    Name::new(s)
}

#[test]
fn assignment_declares_once() {
    let mut scopes = ScopeStack::new();
    assert!(scopes.assign(&name("a"), Span::new(0, 1)));
    assert!(!scopes.assign(&name("a"), Span::new(5, 6)));
    assert!(scopes.is_local("a"));
    assert!(!scopes.is_local("b"));
}

#[test]
fn blocks_see_enclosing_locals() {
    let mut scopes = ScopeStack::new();
    scopes.assign(&name("a"), Span::new(0, 1));
    scopes.push(ScopeKind::Block);
    assert!(scopes.is_local("a"));
    assert!(!scopes.assign(&name("a"), Span::new(9, 10)));
    scopes.assign(&name("b"), Span::new(12, 13));
    scopes.pop();
    assert!(!scopes.is_local("b"));
}

#[test]
fn methods_hide_enclosing_locals() {
    let mut scopes = ScopeStack::new();
    scopes.assign(&name("a"), Span::new(0, 1));
    scopes.push(ScopeKind::Def);
    assert!(!scopes.is_local("a"));
    scopes.push(ScopeKind::Block);
    assert!(!scopes.is_local("a"));
}

#[test]
fn pop_reports_unused_in_source_order() {
    let mut scopes = ScopeStack::new();
    scopes.push(ScopeKind::Def);
    scopes.assign(&name("z"), Span::new(20, 21));
    scopes.assign(&name("a"), Span::new(10, 11));
    scopes.assign(&name("_skip"), Span::new(30, 35));
    scopes.assign(&name("used"), Span::new(40, 44));
    scopes.mark_used("used");
    let unused = scopes.pop();
    assert_eq!(
        unused,
        vec![(name("a"), Span::new(10, 11)), (name("z"), Span::new(20, 21))]
    );
}

#[test]
fn params_are_never_unused() {
    let mut scopes = ScopeStack::new();
    scopes.push(ScopeKind::Def);
    scopes.declare_param(&name("x"), Span::new(0, 1));
    assert!(scopes.pop().is_empty());
}

#[test]
fn use_in_block_marks_outer_local() {
    let mut scopes = ScopeStack::new();
    scopes.push(ScopeKind::Def);
    scopes.assign(&name("a"), Span::new(0, 1));
    scopes.push(ScopeKind::Block);
    scopes.mark_used("a");
    assert!(scopes.pop().is_empty());
    assert!(scopes.pop().is_empty());
}

#[test]
fn file_scope_is_never_popped() {
    let mut scopes = ScopeStack::new();
    scopes.assign(&name("a"), Span::new(0, 1));
    assert!(scopes.pop().is_empty());
    assert_eq!(scopes.depth(), 1);
    assert!(scopes.is_local("a"));
}

#[test]
fn lexer_lookup_uses_visible_locals() {
    let mut scopes = ScopeStack::new();
    scopes.assign(&name("x"), Span::new(0, 1));
    assert!(LocalLookup::is_local(&scopes, b"x"));
    assert!(!LocalLookup::is_local(&scopes, b"y"));
    assert!(!LocalLookup::is_local(&scopes, b"\xff"));
}
