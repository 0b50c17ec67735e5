//! Warnings and verbosity levels.

use garnet_parse::{parse_str, ParseOptions, Verbosity};
use pretty_assertions::assert_eq;

use crate::common::{parse_ok, warnings_of};

#[test]
fn literal_conditions() {
    assert_eq!(warnings_of("x if 'a'"), vec!["string literal in condition"]);
    assert_eq!(warnings_of("x if /a/"), vec!["regex literal in condition"]);
    assert_eq!(warnings_of("x if :a"), vec!["symbol literal in condition"]);
    assert_eq!(warnings_of("x if 1"), vec!["literal in condition"]);
    assert_eq!(warnings_of("x if 1 == y"), Vec::<String>::new());
}

#[test]
fn literal_assignment_in_condition() {
    assert_eq!(
        warnings_of("if x = 1\n  x\nend"),
        vec!["found '= literal' in conditional, should be =="]
    );
    assert_eq!(warnings_of("if x = y\n  x\nend"), Vec::<String>::new());
}

#[test]
fn string_flip_flop() {
    assert_eq!(
        warnings_of("x if 'a'..'b'"),
        vec!["string literal in flip-flop"]
    );
}

#[test]
fn unused_variables_outside_top_level() {
    assert_eq!(
        warnings_of("def f\n  x = 1\n  _y = 2\nend"),
        vec!["assigned but unused variable - x"]
    );
    assert_eq!(warnings_of("x = 1"), Vec::<String>::new());
}

#[test]
fn comparison_chains() {
    assert_eq!(
        warnings_of("a < b < c"),
        vec!["comparison '<' after comparison"]
    );
}

#[test]
fn useless_literals() {
    assert_eq!(
        warnings_of("1\nfoo"),
        vec!["possibly useless use of a literal in void context"]
    );
}

#[test]
fn verbosity_levels() {
    let source = "def f\n  x = 1\n  y if 'a'\nend";
    let count = |verbosity| match parse_str(
        source,
        &ParseOptions::default().with_verbosity(verbosity),
    ) {
        Ok(out) => out.warnings.len(),
        Err(err) => panic!("{err}"),
    };
    assert_eq!(count(Verbosity::Silent), 0);
    assert_eq!(count(Verbosity::Normal), 1);
    assert_eq!(count(Verbosity::Verbose), 2);
}

#[test]
fn warnings_do_not_fail_a_parse() {
    let out = parse_ok("x if 'a'");
    assert_eq!(out.warnings.len(), 1);
}
