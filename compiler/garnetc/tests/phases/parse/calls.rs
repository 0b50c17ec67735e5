//! Command calls and block binding.

use garnet_ir::{Call, CallForm, Node, NodeKind};

use crate::common::{single, statements};

fn call(node: &Node) -> &Call {
    match node.as_call() {
        Some(call) => call,
        None => panic!("not a call: {:?}", node.kind),
    }
}

#[test]
fn do_block_then_method_call() {
    // (foo(1) { 42 }).to_s
    let node = single("foo 1 do 42 end.to_s");
    let outer = call(&node);
    assert_eq!(outer.method.as_str(), "to_s");
    let Some(receiver) = &outer.receiver else {
        panic!("to_s has no receiver");
    };
    let foo = call(receiver);
    assert_eq!(foo.method.as_str(), "foo");
    assert_eq!(foo.args.len(), 1);
    assert!(foo.block.is_some());
}

#[test]
fn brace_block_goes_to_the_argument() {
    let node = single("foo bar { 42 }");
    let foo = call(&node);
    assert!(foo.block.is_none());
    assert!(call(&foo.args[0]).block.is_some());
}

#[test]
fn do_block_goes_to_the_command() {
    let node = single("foo bar do 42 end");
    let foo = call(&node);
    assert!(foo.block.is_some());
    assert!(call(&foo.args[0]).block.is_none());
}

#[test]
fn nested_command_with_receiver() {
    let node = single("obj.each_slice 2 do |a, b| end");
    let each = call(&node);
    assert_eq!(each.form, CallForm::Command);
    assert!(each.receiver.is_some());
    assert!(matches!(
        each.block.as_ref().map(|b| &b.kind),
        Some(NodeKind::Block(_))
    ));
}

#[test]
fn local_versus_method() {
    let stmts = statements("puts [1]\nputs = 1\nputs [1]");
    assert_eq!(call(&stmts[0]).form, CallForm::Command);
    assert_eq!(call(&stmts[2]).form, CallForm::Index);
}
