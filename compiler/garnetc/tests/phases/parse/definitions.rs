//! Method, class and module definitions.

use garnet_ir::NodeKind;

use crate::common::{parse_err, single, syntax_error};

#[test]
fn singleton_methods_on_literals() {
    for source in [
        "def (\"#{42}\").foo; end",
        "def (1).foo; end",
        "def (:sym).foo; end",
        "def ([]).foo; end",
        "def (__FILE__).foo; end",
        "def (1; 2).foo; end",
    ] {
        parse_err(source, "can't define singleton method for literals");
    }
}

#[test]
fn singleton_methods_on_expressions() {
    for source in [
        "def (begin; end).foo; end",
        "def (begin; rescue; ensure; end).foo; end",
        "def (a = Object.new).foo; end",
        "def self.foo; end",
    ] {
        let node = single(source);
        assert!(matches!(node.kind, NodeKind::Def(_)), "{source}");
    }
}

#[test]
fn else_without_rescue_in_singleton_target() {
    parse_err("def (begin; else; end).foo; end", "else without rescue is useless");
}

#[test]
fn duplicated_parameters() {
    assert_eq!(
        syntax_error("def foo(a, a); end").messages(),
        vec!["duplicated argument name"]
    );
    assert_eq!(
        syntax_error("proc { |a, a| }").messages(),
        vec!["duplicated argument name"]
    );
    parse_err("def foo(a, b: 1, a: 2); end", "duplicated argument name");
}

#[test]
fn underscore_parameters_may_repeat() {
    single("proc { |_a, _a| }");
    single("def foo(_, _); end");
}

#[test]
fn invalid_block_parameter_is_not_a_duplicate() {
    let err = syntax_error("proc { |&b?| }");
    assert!(!err.messages().contains(&"duplicated argument name"));
}

#[test]
fn parameter_kinds_are_named() {
    parse_err("def f(A); end", "formal argument cannot be a constant");
    parse_err("def f(@a); end", "formal argument cannot be an instance variable");
    parse_err("def f($a); end", "formal argument cannot be a global variable");
    parse_err("def f(@@a); end", "formal argument cannot be a class variable");
}

#[test]
fn definitions_in_method_bodies() {
    parse_err("def f; class C; end; end", "class definition in method body");
    parse_err("def f; module M; end; end", "module definition in method body");
}
