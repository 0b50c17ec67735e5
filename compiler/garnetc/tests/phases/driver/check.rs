//! `garnet check` without a process.

use garnet_diagnostic::emitter::ColorMode;
use garnetc::commands::{check_source, read_input};
use garnetc::{parse_args, Input, Invocation};
use pretty_assertions::assert_eq;

fn invocation(args: &[&str]) -> Invocation {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(err) => panic!("{args:?} rejected: {err}"),
    }
}

fn check_inline(args: &[&str]) -> garnetc::commands::FileReport {
    let inv = invocation(args);
    let input = &inv.inputs[0];
    let source = match read_input(input) {
        Ok(source) => source,
        Err(err) => panic!("{err}"),
    };
    check_source(&source, &inv.options_for(input), ColorMode::Never, false)
}

#[test]
fn inline_program_is_checked() {
    let report = check_inline(&["check", "-e", "x = 1", "-e", "p x"]);
    assert!(report.ok());
    assert_eq!(report.name, "-e");
}

#[test]
fn flags_reach_the_report() {
    let report = check_inline(&[
        "check",
        "--file",
        "view.erb",
        "--line",
        "20",
        "-e",
        "\nclass a; end",
    ]);
    assert!(!report.ok());
    assert!(
        report.output.starts_with("view.erb:21: syntax error found"),
        "{}",
        report.output
    );
}

#[test]
fn warning_level_flag() {
    let source = "def f\n  x = 1\nend";
    assert_eq!(check_inline(&["check", "-e", source]).warnings, 0);
    let report = check_inline(&["check", "-W2", "-e", source]);
    assert_eq!(report.warnings, 1);
    assert_eq!(
        report.output,
        "-e:2: warning: assigned but unused variable - x\n"
    );
}

#[test]
fn error_limit_flag() {
    let program = "class a; end\n".repeat(5);
    let report = check_inline(&["check", "--max-errors", "2", "-e", &program]);
    assert_eq!(report.errors, 2);
}

#[test]
fn missing_file_is_an_error() {
    let inv = invocation(&["check", "definitely/not/here.rb"]);
    assert!(matches!(&inv.inputs[0], Input::File(_)));
    let Err(message) = read_input(&inv.inputs[0]) else {
        panic!("read a file that does not exist");
    };
    assert!(message.starts_with("definitely/not/here.rb: "), "{message}");
}
