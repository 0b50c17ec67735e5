//! Diagnostic Emitters
//!
//! - `excerpt`: caret-annotated source excerpts, the text of a syntax error
//! - `terminal`: human-readable output to a writer, with optional colors

mod excerpt;
mod terminal;

pub use excerpt::{display_line, render_syntax_errors, render_warning, RenderOptions, DEFAULT_MAX_WIDTH};
pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// ANSI color codes for terminal output.
pub(crate) mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
