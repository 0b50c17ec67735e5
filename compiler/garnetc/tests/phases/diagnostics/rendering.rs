//! Rendered error reports.

use garnet_parse::{parse_str, ParseOptions};
use pretty_assertions::assert_eq;

fn report(source: &str, options: &ParseOptions) -> String {
    match parse_str(source, options) {
        Ok(_) => panic!("expected a syntax error in {source:?}"),
        Err(err) => err.to_string(),
    }
}

#[test]
fn single_error_report() {
    let options = ParseOptions::default().with_filename("app.rb");
    assert_eq!(
        report("x = 1\ndef f(A); end\n", &options),
        [
            "app.rb:2: syntax error found",
            "> 2 | def f(A); end",
            "    |       ^ formal argument cannot be a constant",
        ]
        .join("\n")
    );
}

#[test]
fn errors_are_counted_and_ordered() {
    let options = ParseOptions::default().with_filename("app.rb");
    let text = report("class a; end\nx = 1\nmodule b; end\n", &options);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "app.rb:1: 2 syntax errors found");
    assert_eq!(lines[1], "> 1 | class a; end");
    assert_eq!(lines[3], "> 3 | module b; end");
}

#[test]
fn first_line_offset_applies_to_every_number() {
    let options = ParseOptions::default().with_first_line(100);
    let text = report("\n\nclass a; end\n", &options);
    assert!(text.starts_with("-:102: syntax error found"), "{text}");
    assert!(text.contains("> 102 | class a; end"), "{text}");
}

#[test]
fn unterminated_string_shows_end_of_input() {
    assert_eq!(
        report("x = \"abc\ny = 2\n", &ParseOptions::default()),
        [
            "-:1: syntax error found",
            "> 1 | x = \"abc",
            "    |     ^ unterminated string meets end of file",
            "> 3 |",
            "    | ^ end of input",
        ]
        .join("\n")
    );
}

#[test]
fn unterminated_heredoc_shows_end_of_input() {
    let text = report("x = <<EOS\nbody\n", &ParseOptions::default());
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("-:1: "), "{text}");
    assert_eq!(lines[lines.len() - 2], "> 3 |");
    assert_eq!(lines[lines.len() - 1], "    | ^ end of input");
}

#[test]
fn escape_errors_underline_only_the_escape() {
    let text = report("x = \"abc\\xZdef\"", &ParseOptions::default());
    let Some(caret_row) = text.lines().last() else {
        panic!("empty report");
    };
    let (marks, message) = match caret_row.split_once(' ') {
        Some((_, rest)) => {
            let rest = rest.trim_start_matches(|c| c == ' ' || c == '|');
            let end = rest.find(' ').unwrap_or(rest.len());
            (&rest[..end], &rest[end..])
        }
        None => panic!("no caret row in {text}"),
    };
    assert_eq!(marks, "^~");
    assert_eq!(message.trim(), "invalid hex escape");
}

#[test]
fn long_lines_are_truncated() {
    let padding = "a".repeat(200);
    let source = format!("x = [{padding}, 1 +]");
    let options = ParseOptions::default().with_max_line_width(40);
    let text = report(&source, &options);
    for line in text.lines().filter(|l| l.starts_with('>')) {
        assert!(line.chars().count() <= 60, "line too long: {line:?}");
    }
    assert!(text.contains("..."), "{text}");
}

#[test]
fn message_text_is_separate_from_report() {
    let Err(err) = parse_str("class a; end", &ParseOptions::default()) else {
        panic!("expected a syntax error");
    };
    assert_eq!(err.messages(), vec!["class/module name must be CONSTANT"]);
    assert!(err.rendered().contains("class/module name must be CONSTANT"));
    assert!(err.rendered().contains("> 1 |"));
}

#[test]
fn error_cap() {
    let source = "class a; end\n".repeat(20);
    let Err(err) = parse_str(&source, &ParseOptions::default()) else {
        panic!("expected syntax errors");
    };
    assert_eq!(err.messages().len(), 10);
    let Err(err) = parse_str(&source, &ParseOptions::default().with_max_errors(0)) else {
        panic!("expected syntax errors");
    };
    assert_eq!(err.messages().len(), 20);
}
