//! Diagnostic system for syntax errors and warnings.
//!
//! Both the lexer and the parser report into this crate:
//! - `ErrorCode` gives every diagnostic a stable, searchable identifier
//! - `Diagnostic` carries severity, message, spans and an optional hint
//! - `DiagnosticQueue` sorts by position, caps errors, drops exact duplicates
//! - `emitter` renders caret-annotated source excerpts
//!
//! Rendering never touches global state; the same diagnostics and source
//! always produce the same text.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
