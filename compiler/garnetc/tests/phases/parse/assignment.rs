//! Assignment target rules.

use garnet_ir::NodeKind;

use crate::common::{parse_err, single, syntax_error};

#[test]
fn read_only_targets_are_named() {
    for (source, message) in [
        ("self = 1", "Can't change the value of self"),
        ("nil = 1", "Can't assign to nil"),
        ("true = 1", "Can't assign to true"),
        ("false = 1", "Can't assign to false"),
        ("__FILE__ = 1", "Can't assign to __FILE__"),
        ("__LINE__ = 1", "Can't assign to __LINE__"),
        ("__ENCODING__ = 1", "Can't assign to __ENCODING__"),
        ("$& = 1", "Can't set variable $&"),
        ("$1 = 1", "Can't set variable $1"),
    ] {
        assert_eq!(syntax_error(source).messages(), vec![message], "{source}");
    }
}

#[test]
fn read_only_targets_inside_larger_statements() {
    parse_err("a, self = 1, 2", "Can't change the value of self");
    parse_err("x = (nil = 1)", "Can't assign to nil");
    parse_err("nil += 1", "Can't assign to nil");
}

#[test]
fn dynamic_constants_in_methods() {
    for source in [
        "def f; A = 1; end",
        "def f; ::A = 1; end",
        "def f; A::B = 1; end",
        "def f; a, B = 1, 2; end",
        "def f; A ||= 1; end",
    ] {
        parse_err(source, "dynamic constant assignment");
    }
}

#[test]
fn constants_outside_methods_are_fine() {
    let node = single("class C; A = 1; end");
    assert!(matches!(node.kind, NodeKind::Class { .. }));
    single("::A = 1");
}

#[test]
fn block_argument_in_index_op_assign() {
    parse_err("a[&b] += 1", "block arg given in index assignment");
}

#[test]
fn void_value_on_the_right() {
    parse_err("x = return", "void value expression");
    parse_err("def f; x = (return 1); end", "void value expression");
}

#[test]
fn void_value_is_reported_once() {
    let err = syntax_error(
        "def f\n  x = begin\n    return\n  rescue\n    return\n  else\n    return\n  end\nend",
    );
    assert_eq!(err.messages(), vec!["void value expression"]);
}

#[test]
fn rescue_path_with_value_is_accepted() {
    single("def f\n  x = begin\n    return\n  rescue\n    1\n  end\n  x\nend");
}
