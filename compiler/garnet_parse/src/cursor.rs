//! Token cursor over the lexer.
//!
//! The lexer runs on demand: it needs the parser's scopes to classify
//! identifiers, and the parser sometimes overrides its state (after
//! `def recv.` and between `alias` operands). The cursor keeps the current
//! token plus at most one token of lookahead, and queues what the lexer
//! reports on the side (errors, `shareable_constant_value` directives).

use std::collections::VecDeque;

use garnet_ir::{ShareableMode, Span, Token, TokenKind};
use garnet_lexer::{LexError, LexState, Lexer, LocalLookup, MagicComments};
use garnet_lexer_core::{Encoding, SourceBuffer};

pub(crate) struct TokenCursor<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
    prev_span: Span,
    errors: Vec<LexError>,
    directives: VecDeque<(ShareableMode, Span)>,
    /// A fatal lexer error has been seen.
    lex_failed: bool,
}

impl<'a> TokenCursor<'a> {
    pub(crate) fn new(buffer: &'a SourceBuffer, locals: &dyn LocalLookup) -> Self {
        let mut lexer = Lexer::new(buffer);
        let current = lexer.next_token_with(locals);
        let mut cursor = TokenCursor {
            lexer,
            current,
            peeked: None,
            prev_span: Span::point(0),
            errors: Vec::new(),
            directives: VecDeque::new(),
            lex_failed: false,
        };
        cursor.drain_lexer();
        cursor
    }

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.current
    }

    #[inline]
    pub(crate) fn kind(&self) -> &TokenKind {
        &self.current.kind
    }

    #[inline]
    pub(crate) fn span(&self) -> Span {
        self.current.span
    }

    /// Span of the token consumed last.
    #[inline]
    pub(crate) fn prev_span(&self) -> Span {
        self.prev_span
    }

    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    /// Consume the current token and return it.
    pub(crate) fn advance(&mut self, locals: &dyn LocalLookup) -> Token {
        let next = match self.peeked.take() {
            Some(token) => token,
            None => {
                let token = self.lexer.next_token_with(locals);
                self.drain_lexer();
                token
            }
        };
        self.prev_span = self.current.span;
        std::mem::replace(&mut self.current, next)
    }

    /// The token after the current one.
    pub(crate) fn peek(&mut self, locals: &dyn LocalLookup) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => {
                let token = self.lexer.next_token_with(locals);
                self.drain_lexer();
                token
            }
        };
        self.peeked.insert(token)
    }

    /// Override the lexer state for the token after the current one.
    /// Has no effect once that token has been peeked.
    pub(crate) fn set_lex_state(&mut self, state: LexState) -> bool {
        if self.peeked.is_some() {
            return false;
        }
        self.lexer.set_state(state);
        true
    }

    fn drain_lexer(&mut self) {
        for error in self.lexer.take_errors() {
            self.lex_failed |= !error.is_warning();
            self.errors.push(error);
        }
        self.directives.extend(self.lexer.take_directives());
    }

    /// Lexer errors and warnings reported since the last call.
    pub(crate) fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub(crate) fn lex_failed(&self) -> bool {
        self.lex_failed
    }

    /// The last directive written before `offset`, removing it and any
    /// earlier ones from the queue.
    pub(crate) fn directive_before(&mut self, offset: u32) -> Option<ShareableMode> {
        let mut mode = None;
        while let Some(&(next, span)) = self.directives.front() {
            if span.start >= offset {
                break;
            }
            mode = Some(next);
            self.directives.pop_front();
        }
        mode
    }

    pub(crate) fn magic(&self) -> &MagicComments {
        self.lexer.magic()
    }

    pub(crate) fn encoding(&self) -> Encoding {
        self.lexer.encoding()
    }
}
