use super::*;
use pretty_assertions::assert_eq;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

fn ok(list: &[&str]) -> Invocation {
    match parse_args(&args(list)) {
        Ok(invocation) => invocation,
        Err(err) => panic!("{list:?} rejected: {err}"),
    }
}

// === Commands ===

#[test]
fn no_arguments_is_help() {
    assert_eq!(ok(&[]).command, Command::Help);
}

#[test]
fn commands_and_aliases() {
    assert_eq!(ok(&["check", "a.rb"]).command, Command::Check);
    assert_eq!(ok(&["lex", "a.rb"]).command, Command::Lex);
    assert_eq!(ok(&["--version"]).command, Command::Version);
    assert_eq!(ok(&["-h"]).command, Command::Help);
}

#[test]
fn unknown_command() {
    assert_eq!(
        parse_args(&args(&["run", "a.rb"])),
        Err(ArgError::UnknownCommand("run".to_string()))
    );
}

// === Flags ===

#[test]
fn warning_levels() {
    assert_eq!(ok(&["check", "-W0", "a.rb"]).options.verbosity, Verbosity::Silent);
    assert_eq!(ok(&["check", "-W1", "a.rb"]).options.verbosity, Verbosity::Normal);
    assert_eq!(ok(&["check", "-W2", "a.rb"]).options.verbosity, Verbosity::Verbose);
    assert_eq!(ok(&["check", "a.rb"]).options.verbosity, Verbosity::Normal);
}

#[test]
fn numeric_flags() {
    let inv = ok(&["check", "--max-errors", "3", "--width", "40", "--line", "-2", "a.rb"]);
    assert_eq!(inv.options.max_errors, 3);
    assert_eq!(inv.options.max_line_width, 40);
    assert_eq!(inv.options.first_line, -2);
}

#[test]
fn bad_numbers_are_rejected() {
    assert_eq!(
        parse_args(&args(&["check", "--width", "wide", "a.rb"])),
        Err(ArgError::InvalidValue {
            flag: "--width".to_string(),
            value: "wide".to_string(),
        })
    );
}

#[test]
fn color_modes() {
    assert_eq!(ok(&["check", "a.rb"]).color, ColorMode::Auto);
    assert_eq!(
        ok(&["check", "--color", "never", "a.rb"]).color,
        ColorMode::Never
    );
    assert!(parse_args(&args(&["check", "--color", "sometimes", "a.rb"])).is_err());
}

#[test]
fn encoding_flag() {
    let inv = ok(&["parse", "--encoding", "binary", "a.rb"]);
    assert_eq!(inv.options.default_encoding, Encoding::BINARY);
}

#[test]
fn missing_flag_value() {
    assert_eq!(
        parse_args(&args(&["check", "a.rb", "--file"])),
        Err(ArgError::MissingValue("--file".to_string()))
    );
}

#[test]
fn unknown_flag() {
    assert_eq!(
        parse_args(&args(&["check", "--fast", "a.rb"])),
        Err(ArgError::UnknownOption("--fast".to_string()))
    );
}

// === Inputs ===

#[test]
fn inline_programs_join_lines() {
    let inv = ok(&["check", "-e", "x = 1", "-e", "p x"]);
    assert_eq!(inv.inputs, vec![Input::Inline("x = 1\np x".to_string())]);
    assert_eq!(inv.options_for(&inv.inputs[0]).filename, "-e");
}

#[test]
fn files_keep_their_order() {
    let inv = ok(&["check", "b.rb", "-", "a.rb"]);
    assert_eq!(
        inv.inputs,
        vec![
            Input::File(PathBuf::from("b.rb")),
            Input::Stdin,
            Input::File(PathBuf::from("a.rb")),
        ]
    );
}

#[test]
fn file_flag_renames_inputs() {
    let inv = ok(&["check", "--file", "app.rb", "tmp1.rb"]);
    assert_eq!(inv.options_for(&inv.inputs[0]).filename, "app.rb");
    let inv = ok(&["check", "tmp1.rb"]);
    assert_eq!(inv.options_for(&inv.inputs[0]).filename, "tmp1.rb");
}

#[test]
fn inputs_are_required() {
    assert_eq!(
        parse_args(&args(&["check", "-W2"])),
        Err(ArgError::NoInput)
    );
}
