use super::*;
use pretty_assertions::assert_eq;

fn check_plain(source: &str, options: &ParseOptions) -> FileReport {
    check_source(source.as_bytes(), options, ColorMode::Never, false)
}

#[test]
fn clean_source_has_no_output() {
    let report = check_plain("x = 1\n", &ParseOptions::default());
    assert!(report.ok());
    assert_eq!(report.output, "");
}

#[test]
fn warnings_do_not_fail_the_check() {
    let options = ParseOptions::default().with_filename("a.rb");
    let report = check_plain("x if 'a'\n", &options);
    assert!(report.ok());
    assert_eq!(report.warnings, 1);
    assert_eq!(report.output, "a.rb:1: warning: string literal in condition\n");
}

#[test]
fn errors_render_after_warnings() {
    let options = ParseOptions::default().with_filename("a.rb");
    let report = check_plain("x if 'a'\nclass a; end\n", &options);
    assert!(!report.ok());
    assert_eq!(report.errors, 1);
    assert_eq!(
        report.output,
        [
            "a.rb:1: warning: string literal in condition",
            "a.rb:2: syntax error found",
            "> 2 | class a; end",
            "    |       ^ class/module name must be CONSTANT",
            "",
        ]
        .join("\n")
    );
}

#[test]
fn forced_colors_reach_the_output() {
    let report = check_source(
        b"class a; end",
        &ParseOptions::default(),
        ColorMode::Always,
        false,
    );
    assert!(report.output.contains("\x1b["));
}

#[test]
fn unreadable_inputs_fail() {
    let report = FileReport::unreadable("gone.rb".to_string(), "gone.rb: not found".to_string());
    assert!(!report.ok());
    assert_eq!(report.output, "error: gone.rb: not found\n");
}
