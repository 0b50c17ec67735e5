use super::*;

#[test]
fn test_default_context() {
    let ctx = ParseContext::new();
    assert_eq!(ctx, ParseContext::NONE);
    assert!(ctx.allows_do_block());
    assert!(!ctx.in_def());
    assert!(!ctx.allows_loop_jump());
    assert!(!ctx.allows_yield());
}

#[test]
fn test_with_and_without() {
    let ctx = ParseContext::new()
        .with(ParseContext::IN_LOOP)
        .with(ParseContext::NO_DO_BLOCK);
    assert!(ctx.allows_loop_jump());
    assert!(!ctx.allows_do_block());

    let ctx = ctx.without(ParseContext::NO_DO_BLOCK);
    assert!(ctx.allows_do_block());
    assert!(ctx.allows_loop_jump());
}

#[test]
fn test_block_allows_loop_jumps() {
    let ctx = ParseContext::new().with(ParseContext::IN_BLOCK);
    assert!(ctx.allows_loop_jump());
    assert!(!ctx.allows_retry());
}

#[test]
fn test_def_reset_clears_enclosing_state() {
    let outer = ParseContext::new()
        .with(ParseContext::IN_CLASS)
        .with(ParseContext::IN_LOOP)
        .with(ParseContext::IN_RESCUE);
    let body = outer
        .without(ParseContext::DEF_RESET)
        .with(ParseContext::IN_DEF);
    assert!(body.in_def());
    assert!(!body.in_class_body());
    assert!(!body.allows_loop_jump());
    assert!(!body.allows_retry());
    assert!(body.allows_yield());
}

#[test]
fn test_return_in_class_body() {
    let class = ParseContext::new().with(ParseContext::IN_CLASS);
    assert!(class.return_in_class_body());
    assert!(!class.with(ParseContext::IN_BLOCK).return_in_class_body());
    assert!(!class.with(ParseContext::IN_DEF).return_in_class_body());
}

#[test]
fn test_union() {
    let a = ParseContext::new().with(ParseContext::IN_DEF);
    let b = ParseContext::new().with(ParseContext::IN_LOOP);
    let both = a.union(b);
    assert!(both.in_def());
    assert!(both.allows_loop_jump());
}
