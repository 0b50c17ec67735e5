//! Command handlers.
//!
//! Each handler returns the process exit code: 0 on success, 1 when any
//! input has errors or cannot be read.

mod check;
mod lex;
mod parse;

use std::io::{IsTerminal, Read};

use garnet_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use garnet_diagnostic::Diagnostic;
use garnet_parse::ParseOptions;

use crate::args::Input;

pub use check::{check, check_source, FileReport};
pub use lex::lex;
pub use parse::parse;

/// Read one input's bytes.
pub fn read_input(input: &Input) -> Result<Vec<u8>, String> {
    match input {
        Input::File(path) => {
            std::fs::read(path).map_err(|err| format!("{}: {err}", path.display()))
        }
        Input::Stdin => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|err| format!("-: {err}"))?;
            Ok(bytes)
        }
        Input::Inline(code) => Ok(code.clone().into_bytes()),
    }
}

/// Render diagnostics for `source`: warnings one per line, errors as one
/// excerpt block.
pub fn render(
    diagnostics: &[Diagnostic],
    source: &[u8],
    options: &ParseOptions,
    color: ColorMode,
    is_tty: bool,
) -> String {
    let mut out = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut out, color, is_tty)
            .with_source(source, options.render_options());
        emitter.emit_all(diagnostics);
        emitter.flush();
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn stderr_is_tty() -> bool {
    std::io::stderr().is_terminal()
}
