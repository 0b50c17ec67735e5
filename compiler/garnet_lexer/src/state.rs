//! Lexer state: what kind of token the grammar expects next.
//!
//! A handful of characters mean different things at the start of an
//! expression than after a value (`/` regexp vs. division, `<<` heredoc vs.
//! shift, `?` character literal vs. ternary, `%` literal vs. modulo, `::`
//! top-level vs. scope). The state records enough about the previous token
//! to decide those cases; everything else is left to the parser through
//! [`garnet_ir::TokenFlags`].

use garnet_ir::Keyword;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum LexState {
    /// Start of an expression.
    #[default]
    Beg,
    /// After `return`, `break`, `next` or `rescue`: an operand may follow,
    /// but a newline still ends the statement.
    Mid,
    /// After a complete value.
    End,
    /// After a method name in a definition, before its parameters.
    EndFn,
    /// After a method name that may take unparenthesized arguments.
    Arg,
    /// Like `Arg`, for a name at the start of a statement.
    CmdArg,
    /// After `def`, `alias` or `undef`: operator and setter names allowed.
    Fname,
    /// After `.`, `&.` or `::`: keywords are method names.
    Dot,
    /// After `class`: `<<` opens a singleton class.
    Class,
}

impl LexState {
    /// Expression-start states.
    #[inline]
    pub fn is_beg(self) -> bool {
        matches!(self, LexState::Beg | LexState::Mid | LexState::Class)
    }

    #[inline]
    pub fn is_arg(self) -> bool {
        matches!(self, LexState::Arg | LexState::CmdArg)
    }

    #[inline]
    pub fn is_end(self) -> bool {
        matches!(self, LexState::End | LexState::EndFn)
    }

    /// Whether a newline in this state ends a statement.
    #[inline]
    pub fn newline_significant(self) -> bool {
        !matches!(
            self,
            LexState::Beg | LexState::Dot | LexState::Fname | LexState::Class
        )
    }

    /// State after an operator token.
    #[inline]
    pub fn after_operator(self) -> LexState {
        match self {
            LexState::Fname | LexState::Dot => LexState::Arg,
            _ => LexState::Beg,
        }
    }

    /// State after a reserved word.
    pub fn after_keyword(kw: Keyword) -> LexState {
        match kw {
            Keyword::Alias | Keyword::Undef | Keyword::Def => LexState::Fname,
            Keyword::Class => LexState::Class,
            Keyword::Break | Keyword::Next | Keyword::Return | Keyword::Rescue => LexState::Mid,
            Keyword::Defined | Keyword::Not | Keyword::Super | Keyword::Yield => LexState::Arg,
            Keyword::End
            | Keyword::False
            | Keyword::Nil
            | Keyword::True
            | Keyword::SelfKw
            | Keyword::File
            | Keyword::Line
            | Keyword::Encoding
            | Keyword::Redo
            | Keyword::Retry => LexState::End,
            _ => LexState::Beg,
        }
    }
}

/// Keywords after which a new statement (and so a command call) begins.
pub(crate) fn keyword_starts_command(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Begin
            | Keyword::Do
            | Keyword::Else
            | Keyword::Ensure
            | Keyword::Then
            | Keyword::BeginUpper
            | Keyword::EndUpper
    )
}
