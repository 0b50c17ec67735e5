//! Error recovery.
//!
//! A statement that fails to parse is abandoned: the statement loop records
//! the error and asks [`Parser::synchronize`] to skip to the next statement
//! boundary. Skipping tracks bracket and `end` nesting so a broken statement
//! containing a whole `def ... end` is skipped as one piece. The result is
//! an explicit [`Recovery`] instruction the loop acts on.

use bitflags::bitflags;
use garnet_ir::{Keyword, Token, TokenFlags, TokenKind};
use tracing::debug;

use crate::Parser;

bitflags! {
    /// Tokens that end a statement sequence.
    ///
    /// End of input ends every sequence.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub(crate) struct Closers: u16 {
        const EOF = 1 << 0;
        const END = 1 << 1;
        const ELSE = 1 << 2;
        const ELSIF = 1 << 3;
        const WHEN = 1 << 4;
        const RESCUE = 1 << 5;
        const ENSURE = 1 << 6;
        const RPAREN = 1 << 7;
        const RBRACE = 1 << 8;
        const INTERP_END = 1 << 9;
    }
}

impl Closers {
    /// Body of `begin`, `def`, `class`, `module` and `do` blocks.
    pub(crate) const BODY: Closers = Closers::END
        .union(Closers::RESCUE)
        .union(Closers::ELSE)
        .union(Closers::ENSURE);
    /// Branch of `if`/`unless`.
    pub(crate) const BRANCH: Closers = Closers::END.union(Closers::ELSE).union(Closers::ELSIF);
    /// Body of a `when` clause.
    pub(crate) const WHEN_BODY: Closers = Closers::END.union(Closers::ELSE).union(Closers::WHEN);

    pub(crate) fn matches(self, kind: &TokenKind) -> bool {
        match kind {
            TokenKind::Eof => true,
            TokenKind::Keyword(Keyword::End) => self.contains(Closers::END),
            TokenKind::Keyword(Keyword::Else) => self.contains(Closers::ELSE),
            TokenKind::Keyword(Keyword::Elsif) => self.contains(Closers::ELSIF),
            TokenKind::Keyword(Keyword::When) => self.contains(Closers::WHEN),
            TokenKind::Keyword(Keyword::Rescue) => self.contains(Closers::RESCUE),
            TokenKind::Keyword(Keyword::Ensure) => self.contains(Closers::ENSURE),
            TokenKind::RParen => self.contains(Closers::RPAREN),
            TokenKind::RBrace => self.contains(Closers::RBRACE),
            TokenKind::InterpEnd => self.contains(Closers::INTERP_END),
            _ => false,
        }
    }

    /// The `expecting ...` text for a token that cannot follow a statement.
    pub(crate) fn expecting(self) -> &'static str {
        if self.contains(Closers::RPAREN) {
            "')'"
        } else if self.intersects(Closers::RBRACE.union(Closers::INTERP_END)) {
            "'}'"
        } else if self.contains(Closers::END) {
            "'end'"
        } else {
            "end-of-input"
        }
    }
}

/// What the statement loop does after an error.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Recovery {
    /// Positioned at the start of the next statement or at a closer.
    Resume,
    /// End of input reached.
    Stop,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Nesting {
    Open,
    Close,
    Flat,
}

fn nesting(token: &Token) -> Nesting {
    match &token.kind {
        TokenKind::LParen
        | TokenKind::LBracket
        | TokenKind::LBrace
        | TokenKind::StringBegin(_)
        | TokenKind::InterpBegin => Nesting::Open,
        TokenKind::RParen
        | TokenKind::RBracket
        | TokenKind::RBrace
        | TokenKind::StringEnd
        | TokenKind::LabelEnd
        | TokenKind::RegexpEnd(_)
        | TokenKind::InterpEnd
        | TokenKind::Keyword(Keyword::End) => Nesting::Close,
        TokenKind::Keyword(
            Keyword::Def
            | Keyword::Class
            | Keyword::Module
            | Keyword::Begin
            | Keyword::Case
            | Keyword::For
            | Keyword::Do,
        ) => Nesting::Open,
        // Only statement-initial forms open a body; the rest are modifiers.
        TokenKind::Keyword(Keyword::If | Keyword::Unless | Keyword::While | Keyword::Until)
            if token.flags.contains(TokenFlags::CMD_START) =>
        {
            Nesting::Open
        }
        _ => Nesting::Flat,
    }
}

impl Parser<'_> {
    /// Skip to the start of the next statement of a sequence ending at
    /// `closers`.
    pub(crate) fn synchronize(&mut self, closers: Closers) -> Recovery {
        let from = self.cursor.span();
        let mut depth: u32 = 0;
        loop {
            let token = self.cursor.current();
            if matches!(token.kind, TokenKind::Eof) {
                debug!(from = from.start, "recovery reached end of input");
                return Recovery::Stop;
            }
            if depth == 0 {
                if token.kind.is_terminator() {
                    self.advance();
                    debug!(from = from.start, to = self.cursor.span().start, "recovered");
                    return Recovery::Resume;
                }
                if closers.matches(&token.kind) {
                    debug!(from = from.start, to = token.span.start, "recovered at closer");
                    return Recovery::Resume;
                }
            }
            match nesting(token) {
                Nesting::Open => depth += 1,
                Nesting::Close => depth = depth.saturating_sub(1),
                Nesting::Flat => {}
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests;
