//! Parse options.

use garnet_diagnostic::emitter::{RenderOptions, DEFAULT_MAX_WIDTH};
use garnet_diagnostic::DiagnosticConfig;
use garnet_lexer_core::Encoding;

/// Which warnings a parse reports.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Verbosity {
    /// No warnings at all (`-W0`).
    Silent,
    /// Warnings that are always reported (`-W1`).
    #[default]
    Normal,
    /// Also the verbose-only warnings: useless expressions, unused
    /// variables, chained comparisons (`-W2`).
    Verbose,
}

impl Verbosity {
    /// Map a `-W` level; anything above 2 is verbose.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Silent,
            1 => Verbosity::Normal,
            _ => Verbosity::Verbose,
        }
    }
}

/// Options for one parse.
///
/// ```text
/// let options = ParseOptions::default()
///     .with_filename("lib/app.rb")
///     .with_verbosity(Verbosity::Verbose);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOptions {
    /// Name used in message headers.
    pub filename: String,
    /// Number reported for the buffer's first line; may be zero or negative.
    pub first_line: i64,
    pub verbosity: Verbosity,
    /// Errors kept before the rest are dropped (0 = unlimited).
    pub max_errors: usize,
    /// Excerpt lines wider than this are truncated.
    pub max_line_width: usize,
    /// String literals are frozen unless a magic comment says otherwise.
    pub frozen_string_literal: bool,
    /// Encoding assumed when there is no BOM or `coding:` comment.
    pub default_encoding: Encoding,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            filename: "-".to_string(),
            first_line: 1,
            verbosity: Verbosity::Normal,
            max_errors: 10,
            max_line_width: DEFAULT_MAX_WIDTH,
            frozen_string_literal: false,
            default_encoding: Encoding::UTF_8,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    #[must_use]
    pub fn with_first_line(mut self, line: i64) -> Self {
        self.first_line = line;
        self
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors = max;
        self
    }

    #[must_use]
    pub fn with_max_line_width(mut self, width: usize) -> Self {
        self.max_line_width = width;
        self
    }

    #[must_use]
    pub fn with_frozen_string_literal(mut self, frozen: bool) -> Self {
        self.frozen_string_literal = frozen;
        self
    }

    #[must_use]
    pub fn with_default_encoding(mut self, encoding: Encoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    /// Layout for rendering this parse's diagnostics without colors.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            filename: self.filename.clone(),
            first_line: self.first_line,
            max_width: self.max_line_width,
            colors: false,
        }
    }

    pub(crate) fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig::default().with_error_limit(self.max_errors)
    }

    /// Whether a warning of `level` is reported.
    pub(crate) fn reports(&self, level: Verbosity) -> bool {
        self.verbosity != Verbosity::Silent && level <= self.verbosity
    }
}
