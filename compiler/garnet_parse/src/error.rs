//! Parse error and warning types.
//!
//! - [`ParseError`]: a grammar error. Errors that stop the current
//!   statement travel up as `Err(ParseError)` to the statement loop, which
//!   records them and resynchronizes; checks that do not disturb the parse
//!   (bad assignment targets, duplicated parameters, ...) are recorded
//!   directly and parsing carries on.
//! - [`ParseWarning`]: never fatal; filtered by verbosity before reporting.
//! - [`SyntaxError`]: what a failed parse returns, with every error
//!   rendered as a caret-annotated excerpt.

use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::{Span, TokenKind};

use crate::Verbosity;

/// What was being parsed when an error occurred.
///
/// Rendered as a "while parsing ..." note on the diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    MethodDef,
    ClassDef,
    ModuleDef,
    Params,
    Block,
    Lambda,
    Args,
    Array,
    Hash,
    If,
    Loop,
    Case,
    Begin,
    Interpolation,
}

impl ErrorContext {
    /// Noun phrase for the note.
    pub fn description(self) -> &'static str {
        match self {
            ErrorContext::MethodDef => "a method definition",
            ErrorContext::ClassDef => "a class definition",
            ErrorContext::ModuleDef => "a module definition",
            ErrorContext::Params => "a parameter list",
            ErrorContext::Block => "a block",
            ErrorContext::Lambda => "a lambda",
            ErrorContext::Args => "an argument list",
            ErrorContext::Array => "an array literal",
            ErrorContext::Hash => "a hash literal",
            ErrorContext::If => "a conditional",
            ErrorContext::Loop => "a loop",
            ErrorContext::Case => "a case expression",
            ErrorContext::Begin => "a begin block",
            ErrorContext::Interpolation => "a string interpolation",
        }
    }
}

/// A grammar error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    /// Innermost construct being parsed, if known.
    pub context: Option<ErrorContext>,
    pub help: Vec<String>,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            context: None,
            help: Vec::new(),
        }
    }

    /// `unexpected X` or `unexpected X, expecting Y`.
    #[cold]
    pub fn unexpected(found: &TokenKind, span: Span, expecting: Option<&str>) -> Self {
        let message = match expecting {
            Some(expected) => format!("unexpected {}, expecting {expected}", found.describe()),
            None => format!("unexpected {}", found.describe()),
        };
        Self::new(ErrorCode::E1001, message, span)
    }

    /// Record the construct being parsed; an inner context wins.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    pub fn is_unexpected_token(&self) -> bool {
        self.code == ErrorCode::E1001
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, "");
        if let Some(context) = self.context {
            diag = diag.with_note(format!("while parsing {}", context.description()));
        }
        for help in &self.help {
            diag = diag.with_suggestion(help.clone());
        }
        diag
    }
}

/// A parser warning.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParseWarning {
    /// `what` is "string", "regex", "symbol" or empty for other literals.
    LiteralInCondition { what: &'static str },
    StringInFlipFlop,
    /// `if x = 1`
    LiteralAssignInCondition,
    UselessUse { what: &'static str },
    UnusedVariable { name: String },
    /// `a < b < c`
    ComparisonAfterComparison { op: &'static str },
}

impl ParseWarning {
    /// Lowest verbosity at which the warning is reported.
    pub fn level(&self) -> Verbosity {
        match self {
            ParseWarning::LiteralInCondition { what } if what.is_empty() || *what == "symbol" => {
                Verbosity::Verbose
            }
            ParseWarning::LiteralInCondition { .. }
            | ParseWarning::StringInFlipFlop
            | ParseWarning::LiteralAssignInCondition => Verbosity::Normal,
            ParseWarning::UselessUse { .. }
            | ParseWarning::UnusedVariable { .. }
            | ParseWarning::ComparisonAfterComparison { .. } => Verbosity::Verbose,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseWarning::LiteralInCondition { .. } | ParseWarning::StringInFlipFlop => {
                ErrorCode::W2001
            }
            ParseWarning::LiteralAssignInCondition => ErrorCode::W2002,
            ParseWarning::UselessUse { .. } => ErrorCode::W2003,
            ParseWarning::UnusedVariable { .. } => ErrorCode::W2004,
            ParseWarning::ComparisonAfterComparison { .. } => ErrorCode::W2005,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ParseWarning::LiteralInCondition { what } if what.is_empty() => {
                "literal in condition".to_string()
            }
            ParseWarning::LiteralInCondition { what } => format!("{what} literal in condition"),
            ParseWarning::StringInFlipFlop => "string literal in flip-flop".to_string(),
            ParseWarning::LiteralAssignInCondition => {
                "found '= literal' in conditional, should be ==".to_string()
            }
            ParseWarning::UselessUse { what } => {
                format!("possibly useless use of {what} in void context")
            }
            ParseWarning::UnusedVariable { name } => {
                format!("assigned but unused variable - {name}")
            }
            ParseWarning::ComparisonAfterComparison { op } => {
                format!("comparison '{op}' after comparison")
            }
        }
    }

    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        Diagnostic::warning(self.code())
            .with_message(self.message())
            .with_label(span, "")
    }
}

/// A parse that found at least one error.
///
/// `Display` is the rendered report:
///
/// ```text
/// -:1: syntax error found
/// > 1 | class xxx end
///     |       ^~~ class/module name must be CONSTANT
/// ```
#[derive(Clone, Debug, thiserror::Error)]
#[error("{rendered}")]
pub struct SyntaxError {
    rendered: String,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl SyntaxError {
    pub(crate) fn new(rendered: String, errors: Vec<Diagnostic>, warnings: Vec<Diagnostic>) -> Self {
        SyntaxError {
            rendered,
            errors,
            warnings,
        }
    }

    /// Error messages in source order, without excerpts.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Warnings reported before the parse failed.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

#[cfg(test)]
mod tests;
