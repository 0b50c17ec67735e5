//! `garnet check`: syntax-check files in parallel.
//!
//! Each input is read, parsed and rendered on the rayon pool; reports are
//! printed afterwards in argument order so output never interleaves.

use garnet_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use garnet_parse::ParseOptions;
use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::args::Invocation;

use super::{read_input, render, stderr_is_tty};

/// Outcome of checking one input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub errors: usize,
    pub warnings: usize,
    /// Rendered diagnostics, empty when there are none.
    pub output: String,
}

impl FileReport {
    pub fn ok(&self) -> bool {
        self.errors == 0
    }

    fn unreadable(name: String, message: String) -> Self {
        FileReport {
            name,
            errors: 1,
            warnings: 0,
            output: format!("error: {message}\n"),
        }
    }
}

/// Parse `source` and render what it reports.
pub fn check_source(
    source: &[u8],
    options: &ParseOptions,
    color: ColorMode,
    is_tty: bool,
) -> FileReport {
    let _span = info_span!("check", file = %options.filename).entered();
    let (diagnostics, errors, warnings) = match garnet_parse::parse(source, options) {
        Ok(out) => {
            let count = out.warnings.len();
            (out.warnings, 0, count)
        }
        Err(err) => {
            let mut diagnostics = err.warnings().to_vec();
            diagnostics.extend_from_slice(err.diagnostics());
            (diagnostics, err.diagnostics().len(), err.warnings().len())
        }
    };
    debug!(errors, warnings, "checked");

    let mut output = String::new();
    if !diagnostics.is_empty() {
        output = render(&diagnostics, source, options, color, is_tty);
        if !output.ends_with('\n') {
            output.push('\n');
        }
    }
    FileReport {
        name: options.filename.clone(),
        errors,
        warnings,
        output,
    }
}

pub fn check(invocation: &Invocation) -> i32 {
    let is_tty = stderr_is_tty();
    let reports: Vec<FileReport> = invocation
        .inputs
        .par_iter()
        .map(|input| {
            let options = invocation.options_for(input);
            match read_input(input) {
                Ok(source) => check_source(&source, &options, invocation.color, is_tty),
                Err(message) => FileReport::unreadable(options.filename, message),
            }
        })
        .collect();

    let many = reports.len() > 1;
    for report in &reports {
        eprint!("{}", report.output);
        if report.ok() {
            if many {
                println!("{}: Syntax OK", report.name);
            } else {
                println!("Syntax OK");
            }
        }
    }

    if many {
        let errors = reports.iter().map(|r| r.errors).sum();
        let warnings = reports.iter().map(|r| r.warnings).sum();
        let mut emitter = TerminalEmitter::stderr(invocation.color, is_tty);
        emitter.emit_summary(errors, warnings);
        emitter.flush();
    }

    i32::from(!reports.iter().all(FileReport::ok))
}

#[cfg(test)]
mod tests;
