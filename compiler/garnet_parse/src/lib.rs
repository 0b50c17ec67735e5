//! Recursive descent parser for Garnet.
//!
//! The parser drives the lexer one token at a time, owns the local
//! variable scopes the lexer consults, and builds a [`Node`] tree. Grammar
//! errors never abort the parse: a broken statement is recorded and skipped
//! (see [`recovery`]) so one run reports every independent error.
//!
//! Entry points are [`parse`] and [`parse_str`]. A parse either succeeds
//! with a [`ParseOutput`] (tree plus warnings) or fails with a
//! [`SyntaxError`] whose `Display` is the rendered error report.

mod checks;
mod context;
mod cursor;
mod error;
mod grammar;
mod options;
mod recovery;
mod scope;
mod shareable;
mod stack;

use garnet_diagnostic::emitter::{render_syntax_errors, render_warning};
use garnet_diagnostic::span_utils::LineOffsetTable;
use garnet_diagnostic::{Diagnostic, DiagnosticQueue};
use garnet_ir::{Keyword, Node, NodeKind, ShareableMode, Span, Token, TokenKind};
use garnet_lexer::LexState;
use garnet_lexer_core::{Encoding, SourceBuffer};
use tracing::debug;

pub use context::ParseContext;
pub use error::{ErrorContext, ParseError, ParseWarning, SyntaxError};
pub use garnet_lexer::MagicComments;
pub use options::{ParseOptions, Verbosity};

use cursor::TokenCursor;
use scope::ScopeStack;

/// A successful parse.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    /// The file as a `Seq` of top-level statements.
    pub ast: Node,
    /// Warnings allowed by the verbosity, in source order.
    pub warnings: Vec<Diagnostic>,
    /// Source encoding after BOM and magic comment detection.
    pub encoding: Encoding,
    pub magic: MagicComments,
}

impl ParseOutput {
    /// One `FILE:LINE: warning: MESSAGE` line per warning.
    pub fn render_warnings(&self, source: &[u8], options: &ParseOptions) -> Vec<String> {
        let table = LineOffsetTable::build(source);
        let render = options.render_options();
        self.warnings
            .iter()
            .map(|w| render_warning(&table, w, &render))
            .collect()
    }
}

/// Parse `source` as one file.
pub fn parse(source: &[u8], options: &ParseOptions) -> Result<ParseOutput, SyntaxError> {
    debug!(file = %options.filename, len = source.len(), "parse");
    let buffer = SourceBuffer::new(source, options.default_encoding);
    Parser::new(&buffer, options).parse_program()
}

/// [`parse`] for UTF-8 text.
pub fn parse_str(source: &str, options: &ParseOptions) -> Result<ParseOutput, SyntaxError> {
    parse(source.as_bytes(), options)
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: TokenCursor<'a>,
    scopes: ScopeStack,
    context: ParseContext,
    /// `shareable_constant_value` in effect.
    shareable: ShareableMode,
    options: &'a ParseOptions,
    source: &'a [u8],
    lines: LineOffsetTable,
    queue: DiagnosticQueue,
    /// `break`/`next`/`redo` outside a loop, held back until it is known
    /// that no `while`/`until` modifier encloses them.
    pending_jumps: Vec<(Span, &'static str)>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(buffer: &'a SourceBuffer, options: &'a ParseOptions) -> Self {
        let scopes = ScopeStack::new();
        let cursor = TokenCursor::new(buffer, &scopes);
        let source = buffer.as_bytes();
        let mut parser = Parser {
            cursor,
            scopes,
            context: ParseContext::new(),
            shareable: ShareableMode::None,
            options,
            source,
            lines: LineOffsetTable::build(source),
            queue: DiagnosticQueue::with_config(options.diagnostic_config()),
            pending_jumps: Vec::new(),
        };
        parser.flush_lex_errors();
        parser.apply_directives();
        parser
    }

    /// Parse the whole buffer.
    pub(crate) fn parse_program(mut self) -> Result<ParseOutput, SyntaxError> {
        let stmts = self.parse_stmts(recovery::Closers::EOF);
        self.flush_pending_jumps(Vec::new());
        self.flush_lex_errors();
        let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
        let ast = Node::new(NodeKind::Seq(stmts), Span::new(0, end));

        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.queue.flush().into_iter().partition(Diagnostic::is_error);
        if errors.is_empty() {
            debug!(warnings = warnings.len(), "parse ok");
            return Ok(ParseOutput {
                ast,
                warnings,
                encoding: self.cursor.encoding(),
                magic: self.cursor.magic().clone(),
            });
        }
        debug!(errors = errors.len(), "parse failed");
        let rendered = render_syntax_errors(
            self.source,
            &self.lines,
            &errors,
            &self.options.render_options(),
        );
        Err(SyntaxError::new(rendered, errors, warnings))
    }

    // === Token access ===

    #[inline]
    fn current(&self) -> &Token {
        self.cursor.current()
    }

    #[inline]
    fn kind(&self) -> &TokenKind {
        self.cursor.kind()
    }

    #[inline]
    fn span(&self) -> Span {
        self.cursor.span()
    }

    #[inline]
    fn prev_span(&self) -> Span {
        self.cursor.prev_span()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.kind() == kind
    }

    #[inline]
    fn check_kw(&self, kw: Keyword) -> bool {
        self.cursor.kind().is_keyword(kw)
    }

    /// Consume the current token.
    fn advance(&mut self) -> Token {
        let token = self.cursor.advance(&self.scopes);
        self.flush_lex_errors();
        self.apply_directives();
        token
    }

    fn peek(&mut self) -> &Token {
        self.cursor.peek(&self.scopes)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        if self.check_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expecting: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Some(expecting)))
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> Result<Token, ParseError> {
        if self.check_kw(kw) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Some(match kw {
                Keyword::End => "'end'",
                Keyword::In => "'in'",
                Keyword::When => "'when'",
                _ => "keyword",
            })))
        }
    }

    /// Error for the current token.
    #[cold]
    fn unexpected(&self, expecting: Option<&str>) -> ParseError {
        ParseError::unexpected(self.kind(), self.span(), expecting)
    }

    /// Skip significant newlines (where the grammar allows line breaks).
    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skip `;` and newlines.
    fn skip_terminators(&mut self) {
        while self.kind().is_terminator() {
            self.advance();
        }
    }

    /// Override how the token after the current one is lexed.
    fn set_lex_state(&mut self, state: LexState) {
        if !self.cursor.set_lex_state(state) {
            debug!(?state, "lexer state override after lookahead ignored");
        }
    }

    // === Context ===

    /// Run `f` with `add` set and `remove` cleared, restoring afterwards.
    fn with_context<T>(
        &mut self,
        add: ParseContext,
        remove: ParseContext,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.context;
        self.context = self.context.without(remove).with(add);
        let result = f(self);
        self.context = saved;
        result
    }

    // === Reporting ===

    /// Record an error without interrupting the parse.
    fn report(&mut self, err: ParseError) {
        // An unterminated literal already explains a premature end of input.
        if err.is_unexpected_token() && self.cursor.lex_failed() && self.cursor.at_eof() {
            debug!(message = %err.message, "suppressed at end of input");
            return;
        }
        // The lexer reports every invalid byte itself.
        if err.is_unexpected_token() && matches!(self.kind(), TokenKind::InvalidByte(_)) {
            debug!(message = %err.message, "suppressed at invalid byte");
            return;
        }
        self.queue
            .add_with_table(err.to_diagnostic(), &self.lines, self.source);
    }

    fn warn(&mut self, warning: ParseWarning, span: Span) {
        if self.options.reports(warning.level()) {
            self.queue
                .add_with_table(warning.to_diagnostic(span), &self.lines, self.source);
        }
    }

    fn flush_lex_errors(&mut self) {
        for error in self.cursor.take_errors() {
            if error.is_warning() && !self.options.reports(Verbosity::Normal) {
                continue;
            }
            self.queue
                .add_with_table(error.into_diagnostic(), &self.lines, self.source);
        }
    }

    fn apply_directives(&mut self) {
        if let Some(mode) = self.cursor.directive_before(self.span().start) {
            debug!(mode = mode.as_str(), "shareable_constant_value");
            self.shareable = mode;
        }
    }

    /// Report held-back jumps and restore the enclosing list.
    fn flush_pending_jumps(&mut self, outer: Vec<(Span, &'static str)>) {
        let pending = std::mem::replace(&mut self.pending_jumps, outer);
        for (span, keyword) in pending {
            self.report(ParseError::new(
                garnet_diagnostic::ErrorCode::E1010,
                format!("Invalid {keyword}"),
                span,
            ));
        }
    }

    /// Whether string literals are frozen in this file.
    fn frozen_strings(&self) -> bool {
        self.cursor
            .magic()
            .frozen_string_literal
            .unwrap_or(self.options.frozen_string_literal)
    }
}
