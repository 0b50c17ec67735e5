use super::*;

fn string_mode() -> Mode {
    Mode::Literal(LiteralMode {
        flavor: StringFlavor::Plain,
        open: 0,
        close: b'"',
        nesting: 0,
        interpolates: true,
        label_ok: false,
        opener: Span::new(0, 1),
    })
}

#[test]
fn floor_is_normal_and_never_pops() {
    let mut stack = ModeStack::new();
    assert_eq!(stack.top(), &Mode::Normal);
    assert_eq!(stack.pop(), None);
    assert_eq!(stack.depth(), 1);
}

#[test]
fn push_and_pop_in_order() {
    let mut stack = ModeStack::new();
    stack.push(string_mode());
    stack.push(Mode::Interp { brace_depth: 0 });
    assert!(stack.in_interpolation());
    assert_eq!(stack.pop(), Some(Mode::Interp { brace_depth: 0 }));
    assert_eq!(stack.pop(), Some(string_mode()));
    assert_eq!(stack.top(), &Mode::Normal);
}

#[test]
fn innermost_literal_skips_interpolation() {
    let mut stack = ModeStack::new();
    assert!(stack.innermost_literal().is_none());
    stack.push(string_mode());
    stack.push(Mode::Interp { brace_depth: 2 });
    assert_eq!(stack.innermost_literal(), Some(&string_mode()));
}

#[test]
fn top_mut_updates_frame() {
    let mut stack = ModeStack::new();
    stack.push(Mode::Interp { brace_depth: 0 });
    if let Mode::Interp { brace_depth } = stack.top_mut() {
        *brace_depth += 1;
    }
    assert_eq!(stack.top(), &Mode::Interp { brace_depth: 1 });
}

#[test]
fn unterminated_nouns() {
    let mut lit = LiteralMode {
        flavor: StringFlavor::Words,
        open: b'[',
        close: b']',
        nesting: 0,
        interpolates: false,
        label_ok: false,
        opener: Span::new(0, 3),
    };
    assert!(lit.is_list());
    assert_eq!(lit.unterminated_noun(), "list");
    lit.flavor = StringFlavor::Regexp;
    assert_eq!(lit.unterminated_noun(), "regexp");
    lit.flavor = StringFlavor::Symbol;
    assert_eq!(lit.unterminated_noun(), "quoted string");
}
