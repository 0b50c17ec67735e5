//! Stateful lexer for Garnet source.
//!
//! Garnet's grammar is context sensitive: whether `/` divides or opens a
//! regexp, whether `foo [1]` indexes or passes an array, whether `<<X`
//! starts a heredoc, all depend on what came before. The [`Lexer`] keeps a
//! [`LexState`] describing that context, plus a stack of [`Mode`]s for the
//! nested literals it is inside, and the parser drives it one token at a
//! time through [`Lexer::next_token_with`].
//!
//! Errors do not stop lexing. They accumulate as [`LexError`]s and are
//! drained by the parser, which turns them into diagnostics.
//!
//! [`lex`] tokenizes a whole buffer without a parser, guessing local
//! variables from assignments; it backs `garnetc lex`.

mod cook_escape;
mod lex_error;
mod lexer;
mod mode;
mod state;

use garnet_diagnostic::Diagnostic;
use garnet_ir::{Name, Token, TokenKind};
use garnet_lexer_core::{Encoding, SourceBuffer};
use rustc_hash::FxHashSet;

pub use lex_error::{LexError, LexErrorKind, VarKind};
pub use lexer::{Lexer, LocalLookup, MagicComments, NoLocals};
pub use mode::{HeredocMode, LiteralMode, Mode, ModeStack};
pub use state::LexState;

/// Result of lexing a whole buffer.
#[derive(Clone)]
pub struct LexOutput {
    /// Every token, ending with `Eof`.
    pub tokens: Vec<Token>,
    /// Lexer errors and warnings in the order found.
    pub diagnostics: Vec<Diagnostic>,
    pub magic: MagicComments,
}

/// Names seen as the target of `=` or `op=`.
#[derive(Default)]
struct AssignedNames(FxHashSet<Name>);

impl LocalLookup for AssignedNames {
    fn is_local(&self, name: &[u8]) -> bool {
        std::str::from_utf8(name).is_ok_and(|name| self.0.contains(name))
    }
}

/// Tokenize UTF-8 (or BOM/magic-comment declared) `source` without a parser.
///
/// Locals are approximated: an identifier counts as a local once it has
/// been followed by `=` or an assignment operator.
pub fn lex(source: &[u8]) -> LexOutput {
    let buffer = SourceBuffer::new(source, Encoding::UTF_8);
    let mut lexer = Lexer::new(&buffer);
    let mut locals = AssignedNames::default();
    let mut tokens: Vec<Token> = Vec::new();
    loop {
        let token = lexer.next_token_with(&locals);
        if matches!(token.kind, TokenKind::Assign | TokenKind::OpAssign(_)) {
            if let Some(TokenKind::Ident(name)) = tokens.last().map(|t| &t.kind) {
                locals.0.insert(name.clone());
            }
        }
        let done = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if done {
            break;
        }
    }
    let diagnostics = lexer
        .take_errors()
        .into_iter()
        .map(LexError::into_diagnostic)
        .collect();
    LexOutput {
        tokens,
        diagnostics,
        magic: lexer.magic().clone(),
    }
}
