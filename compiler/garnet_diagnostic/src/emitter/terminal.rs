//! Terminal Emitter
//!
//! Renders syntax errors as caret excerpts when the source is attached, and
//! falls back to a compact `error [CODE]: message` form without it.

use std::io::{self, Write};

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Severity};

use super::excerpt::{render_syntax_errors, render_warning, RenderOptions};
use super::{colors, DiagnosticEmitter};

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when the output is a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// For `Auto`, `is_tty` decides; the other modes ignore it.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    pub fn from_flag(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

struct SourceContext {
    source: Vec<u8>,
    table: LineOffsetTable,
    options: RenderOptions,
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    context: Option<SourceContext>,
}

impl<W: Write> TerminalEmitter<W> {
    /// * `is_tty` - Whether output is a TTY (used for `ColorMode::Auto`)
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            context: None,
        }
    }

    /// Attach the source the diagnostics refer to, enabling excerpts.
    #[must_use]
    pub fn with_source(mut self, source: &[u8], mut options: RenderOptions) -> Self {
        options.colors = self.colors;
        self.context = Some(SourceContext {
            source: source.to_vec(),
            table: LineOffsetTable::build(source),
            options,
        });
        self
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_hints(&mut self, diagnostic: &Diagnostic) {
        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }
        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "  = ");
            self.write_colored("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }
    }

    fn emit_plain(&mut self, diagnostic: &Diagnostic) {
        let color = match diagnostic.severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
        };
        self.write_colored(&diagnostic.severity.to_string(), color);
        let _ = write!(self.writer, " ");
        self.write_colored(&format!("[{}]", diagnostic.code), colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);
        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let _ = write!(self.writer, "  {marker} {:?}", label.span);
            if !label.message.is_empty() {
                let _ = write!(self.writer, ": {}", label.message);
            }
            let _ = writeln!(self.writer);
        }
        self.write_hints(diagnostic);
    }
}

impl TerminalEmitter<io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.emit_all(std::slice::from_ref(diagnostic));
    }

    /// With a source attached, warnings print one line each and all errors
    /// share a single excerpt block.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        let Some(context) = self.context.take() else {
            for diag in diagnostics {
                self.emit_plain(diag);
            }
            return;
        };

        for warning in diagnostics.iter().filter(|d| !d.is_error()) {
            let text = render_warning(&context.table, warning, &context.options);
            let _ = writeln!(self.writer, "{text}");
        }

        if diagnostics.iter().any(Diagnostic::is_error) {
            let text = render_syntax_errors(
                &context.source,
                &context.table,
                diagnostics,
                &context.options,
            );
            let _ = writeln!(self.writer, "{text}");
            for diag in diagnostics.iter().filter(|d| d.is_error()) {
                self.write_hints(diag);
            }
        }

        self.context = Some(context);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}

#[cfg(test)]
mod tests;
