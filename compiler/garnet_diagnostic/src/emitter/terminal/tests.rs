use super::*;
use crate::ErrorCode;
use garnet_ir::Span;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E1003)
        .with_message("dynamic constant assignment")
        .with_label(Span::new(8, 11), "")
        .with_secondary_label(Span::new(0, 7), "method body starts here")
        .with_note("constants are assigned once, at class level")
        .with_suggestion("use an instance variable instead")
}

fn emit_to_string(mode: ColorMode, f: impl FnOnce(&mut TerminalEmitter<&mut Vec<u8>>)) -> String {
    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, mode, false);
        f(&mut emitter);
        emitter.flush();
    }
    String::from_utf8_lossy(&output).into_owned()
}

// === Fallback (no source) ===

#[test]
fn test_plain_no_color() {
    let text = emit_to_string(ColorMode::Never, |e| e.emit(&sample_diagnostic()));
    assert!(text.starts_with("error [E1003]: dynamic constant assignment\n"));
    assert!(text.contains("  --> 8..11\n"));
    assert!(text.contains("method body starts here"));
    assert!(text.contains("note: constants are assigned once"));
    assert!(text.contains("help: use an instance variable"));
}

#[test]
fn test_plain_with_color() {
    let text = emit_to_string(ColorMode::Always, |e| e.emit(&sample_diagnostic()));
    assert!(text.contains("\x1b["));
    assert!(text.contains("E1003"));
}

// === With source ===

#[test]
fn test_emit_all_with_source() {
    let source = b"x = 1\ny = )";
    let diags = vec![
        Diagnostic::warning(ErrorCode::W2004)
            .with_message("assigned but unused variable - x")
            .with_label(Span::new(0, 1), ""),
        Diagnostic::error(ErrorCode::E1001)
            .with_message("unexpected ')'")
            .with_label(Span::new(10, 11), ""),
    ];
    let options = RenderOptions {
        filename: "t.rb".to_string(),
        ..RenderOptions::default()
    };

    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false)
            .with_source(source, options);
        emitter.emit_all(&diags);
        emitter.flush();
    }
    let text = String::from_utf8_lossy(&output);
    let expected = [
        "t.rb:1: warning: assigned but unused variable - x",
        "t.rb:2: syntax error found",
        "> 2 | y = )",
        "    |     ^ unexpected ')'",
        "",
    ]
    .join("\n");
    assert_eq!(text, expected);
}

// === Summary ===

#[test]
fn test_emit_summary_errors() {
    let text = emit_to_string(ColorMode::Never, |e| e.emit_summary(2, 1));
    assert_eq!(text, "error: aborting due to 2 previous errors; 1 warning emitted\n");
}

#[test]
fn test_emit_summary_single_error() {
    let text = emit_to_string(ColorMode::Never, |e| e.emit_summary(1, 0));
    assert_eq!(text, "error: aborting due to previous error\n");
}

#[test]
fn test_emit_summary_warnings_only() {
    let text = emit_to_string(ColorMode::Never, |e| e.emit_summary(0, 3));
    assert_eq!(text, "warning: 3 warnings emitted\n");
}

#[test]
fn test_emit_summary_nothing() {
    assert!(emit_to_string(ColorMode::Never, |e| e.emit_summary(0, 0)).is_empty());
}

// === ColorMode ===

#[test]
fn test_color_mode_resolution() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
    assert_eq!(ColorMode::default(), ColorMode::Auto);
}

#[test]
fn test_color_mode_from_flag() {
    assert_eq!(ColorMode::from_flag("always"), Some(ColorMode::Always));
    assert_eq!(ColorMode::from_flag("never"), Some(ColorMode::Never));
    assert_eq!(ColorMode::from_flag("sometimes"), None);
}
