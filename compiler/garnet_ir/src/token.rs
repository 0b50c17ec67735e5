//! Token types produced by the lexer.
//!
//! Tokens are immutable once produced. Literal tokens carry their decoded
//! payload so the parser never re-reads the source buffer; strings arrive as
//! a begin/content/end sequence so interpolation can nest arbitrarily.

use std::fmt;

use bitflags::bitflags;

use super::{Name, Span};

/// A token with its source position.
///
/// `line` and `column` are 1-based and relative to the start of the buffer;
/// the caller's `first_line` offset is applied only when rendering.
#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub flags: TokenFlags,
    pub line: u32,
    pub column: u32,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span, flags: TokenFlags, line: u32, column: u32) -> Self {
        Token {
            kind,
            span,
            flags,
            line,
            column,
        }
    }

    /// Token with no position, for tests.
    pub fn dummy(kind: TokenKind) -> Self {
        Token::new(kind, Span::DUMMY, TokenFlags::empty(), 1, 1)
    }

    #[inline]
    pub fn has_space_before(&self) -> bool {
        self.flags.contains(TokenFlags::SPACE_BEFORE)
    }

    #[inline]
    pub fn is_command_start(&self) -> bool {
        self.flags.contains(TokenFlags::CMD_START)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)?;
        if !self.flags.is_empty() {
            write!(f, " {:?}", self.flags)?;
        }
        Ok(())
    }
}

bitflags! {
    /// Layout facts about the text preceding a token.
    ///
    /// The lexer only records these; whether a space before `(` or `[`
    /// starts an argument is decided by the parser.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TokenFlags: u8 {
        /// Spaces, tabs or an escaped newline preceded this token.
        const SPACE_BEFORE = 1 << 0;
        /// A newline the lexer treated as insignificant preceded this token.
        const NEWLINE_BEFORE = 1 << 1;
        /// Token sits where a statement (and so a command call) may begin.
        const CMD_START = 1 << 2;
        /// First token on its physical line.
        const LINE_START = 1 << 3;
    }
}

/// Reserved words.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Keyword {
    Alias,
    And,
    Begin,
    BeginUpper,
    Break,
    Case,
    Class,
    Def,
    Defined,
    Do,
    Else,
    Elsif,
    End,
    EndUpper,
    Ensure,
    False,
    For,
    If,
    In,
    Module,
    Next,
    Nil,
    Not,
    Or,
    Redo,
    Rescue,
    Retry,
    Return,
    SelfKw,
    Super,
    Then,
    True,
    Undef,
    Unless,
    Until,
    When,
    While,
    Yield,
    File,
    Line,
    Encoding,
}

impl Keyword {
    /// Keyword for an identifier's text, if it is reserved.
    pub fn from_bytes(text: &[u8]) -> Option<Keyword> {
        Some(match text {
            b"alias" => Keyword::Alias,
            b"and" => Keyword::And,
            b"begin" => Keyword::Begin,
            b"BEGIN" => Keyword::BeginUpper,
            b"break" => Keyword::Break,
            b"case" => Keyword::Case,
            b"class" => Keyword::Class,
            b"def" => Keyword::Def,
            b"defined?" => Keyword::Defined,
            b"do" => Keyword::Do,
            b"else" => Keyword::Else,
            b"elsif" => Keyword::Elsif,
            b"end" => Keyword::End,
            b"END" => Keyword::EndUpper,
            b"ensure" => Keyword::Ensure,
            b"false" => Keyword::False,
            b"for" => Keyword::For,
            b"if" => Keyword::If,
            b"in" => Keyword::In,
            b"module" => Keyword::Module,
            b"next" => Keyword::Next,
            b"nil" => Keyword::Nil,
            b"not" => Keyword::Not,
            b"or" => Keyword::Or,
            b"redo" => Keyword::Redo,
            b"rescue" => Keyword::Rescue,
            b"retry" => Keyword::Retry,
            b"return" => Keyword::Return,
            b"self" => Keyword::SelfKw,
            b"super" => Keyword::Super,
            b"then" => Keyword::Then,
            b"true" => Keyword::True,
            b"undef" => Keyword::Undef,
            b"unless" => Keyword::Unless,
            b"until" => Keyword::Until,
            b"when" => Keyword::When,
            b"while" => Keyword::While,
            b"yield" => Keyword::Yield,
            b"__FILE__" => Keyword::File,
            b"__LINE__" => Keyword::Line,
            b"__ENCODING__" => Keyword::Encoding,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Alias => "alias",
            Keyword::And => "and",
            Keyword::Begin => "begin",
            Keyword::BeginUpper => "BEGIN",
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Class => "class",
            Keyword::Def => "def",
            Keyword::Defined => "defined?",
            Keyword::Do => "do",
            Keyword::Else => "else",
            Keyword::Elsif => "elsif",
            Keyword::End => "end",
            Keyword::EndUpper => "END",
            Keyword::Ensure => "ensure",
            Keyword::False => "false",
            Keyword::For => "for",
            Keyword::If => "if",
            Keyword::In => "in",
            Keyword::Module => "module",
            Keyword::Next => "next",
            Keyword::Nil => "nil",
            Keyword::Not => "not",
            Keyword::Or => "or",
            Keyword::Redo => "redo",
            Keyword::Rescue => "rescue",
            Keyword::Retry => "retry",
            Keyword::Return => "return",
            Keyword::SelfKw => "self",
            Keyword::Super => "super",
            Keyword::Then => "then",
            Keyword::True => "true",
            Keyword::Undef => "undef",
            Keyword::Unless => "unless",
            Keyword::Until => "until",
            Keyword::When => "when",
            Keyword::While => "while",
            Keyword::Yield => "yield",
            Keyword::File => "__FILE__",
            Keyword::Line => "__LINE__",
            Keyword::Encoding => "__ENCODING__",
        }
    }

    /// Pseudo-variables that can never be assigned.
    pub fn is_pseudo_variable(self) -> bool {
        matches!(
            self,
            Keyword::SelfKw
                | Keyword::Nil
                | Keyword::True
                | Keyword::False
                | Keyword::File
                | Keyword::Line
                | Keyword::Encoding
        )
    }
}

/// Operators usable in compound assignment (`a += 1`, `a ||= b`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    AndAnd,
    OrOr,
}

impl AssignOp {
    /// Operator text without the trailing `=`.
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Add => "+",
            AssignOp::Sub => "-",
            AssignOp::Mul => "*",
            AssignOp::Div => "/",
            AssignOp::Mod => "%",
            AssignOp::Pow => "**",
            AssignOp::Shl => "<<",
            AssignOp::Shr => ">>",
            AssignOp::BitAnd => "&",
            AssignOp::BitOr => "|",
            AssignOp::BitXor => "^",
            AssignOp::AndAnd => "&&",
            AssignOp::OrOr => "||",
        }
    }
}

/// Numeric literal payload.
#[derive(Clone, PartialEq, Debug)]
pub struct NumberLit {
    pub value: NumberValue,
    /// `r` suffix.
    pub rational: bool,
    /// `i` suffix.
    pub imaginary: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub enum NumberValue {
    /// Digits with separators removed, in `radix`.
    Int { digits: Box<str>, radix: u32 },
    Float(f64),
}

impl NumberLit {
    pub fn int(digits: &str, radix: u32) -> Self {
        NumberLit {
            value: NumberValue::Int {
                digits: digits.into(),
                radix,
            },
            rational: false,
            imaginary: false,
        }
    }

    pub fn float(value: f64) -> Self {
        NumberLit {
            value: NumberValue::Float(value),
            rational: false,
            imaginary: false,
        }
    }

    /// Integer value when it fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.value {
            NumberValue::Int { digits, radix } => i64::from_str_radix(digits, *radix).ok(),
            NumberValue::Float(_) => None,
        }
    }

    /// Token class name used in "unexpected ..." messages.
    pub fn describe(&self) -> &'static str {
        if self.imaginary {
            "imaginary literal"
        } else if self.rational {
            "rational literal"
        } else {
            match self.value {
                NumberValue::Int { .. } => "integer literal",
                NumberValue::Float(_) => "float literal",
            }
        }
    }

    /// Same literal with its sign flipped.
    #[must_use]
    pub fn negated(&self) -> Self {
        let value = match &self.value {
            NumberValue::Int { digits, radix } => {
                let digits = match digits.strip_prefix('-') {
                    Some(rest) => rest.into(),
                    None => format!("-{digits}").into(),
                };
                NumberValue::Int {
                    digits,
                    radix: *radix,
                }
            }
            NumberValue::Float(f) => NumberValue::Float(-f),
        };
        NumberLit {
            value,
            rational: self.rational,
            imaginary: self.imaginary,
        }
    }
}

/// What a string-like literal produces once closed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StringFlavor {
    /// `"..."`, `'...'`, `%q`, `%Q`, `%()`
    Plain,
    /// `` `...` ``, `%x`
    Command,
    /// `:"..."`, `%s`
    Symbol,
    /// `/.../`, `%r`
    Regexp,
    /// `%w`, `%W`
    Words,
    /// `%i`, `%I`
    Symbols,
    /// `<<ID`, `<<-ID`, `<<~ID`
    Heredoc,
}

/// Opening of a string-like literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct StringOpen {
    pub flavor: StringFlavor,
    /// Escapes and `#{}` are processed.
    pub interpolates: bool,
    /// Heredoc body is a command (backquoted identifier).
    pub command: bool,
}

/// Token kinds.
#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    // Names
    /// Local variable or method name; may end in `?`, `!` or (in method-name
    /// position) `=`.
    Ident(Name),
    Const(Name),
    IVar(Name),
    CVar(Name),
    GVar(Name),
    /// `$&`, `` $` ``, `$'`, `$+`
    BackRef(u8),
    /// `$1`, `$2`, ...
    NthRef(u32),
    /// `foo:` in argument or hash position.
    Label(Name),
    Keyword(Keyword),

    // Literals
    Number(Box<NumberLit>),
    /// `?a` character literal (encoded bytes).
    Char(Vec<u8>),
    /// `:foo`, `:+`, `:@x`
    Symbol(Name),
    StringBegin(StringOpen),
    StringContent(Vec<u8>),
    /// `#{` inside an interpolating literal.
    InterpBegin,
    /// `}` closing an interpolation.
    InterpEnd,
    /// `#` before `@ivar`, `@@cvar` or `$gvar` inside an interpolating literal.
    InterpVar,
    /// Whitespace between words of `%w`/`%i` style literals.
    WordSep,
    StringEnd,
    /// `":` closing a string used as a hash key.
    LabelEnd,
    /// `/` (or `%r` closer) plus option letters.
    RegexpEnd(Box<str>),

    // Punctuation
    Plus,
    Minus,
    Star,
    Pow,
    Slash,
    Percent,
    Assign,
    EqEq,
    EqEqEq,
    NotEq,
    Match,
    NotMatch,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Cmp,
    AndAnd,
    OrOr,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    OpAssign(AssignOp),
    Dot,
    AndDot,
    /// `::`; scope or top-level depending on position.
    ColonColon,
    Colon,
    Question,
    DotDot,
    DotDotDot,
    Comma,
    Semi,
    Arrow,
    Lambda,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Newline,
    /// A byte that cannot start any token; already reported by the lexer.
    InvalidByte(u8),
    Eof,
}

impl TokenKind {
    #[inline]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == kw)
    }

    /// Statement terminator (`;` or significant newline).
    #[inline]
    pub fn is_terminator(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Semi)
    }

    /// Name of the token's class as used in "unexpected X" messages.
    pub fn describe(&self) -> String {
        let s: &str = match self {
            TokenKind::Ident(name) => {
                if name.as_str().ends_with(|c| c == '?' || c == '!') {
                    "method"
                } else {
                    "local variable or method"
                }
            }
            TokenKind::Const(_) => "constant",
            TokenKind::IVar(_) => "instance variable",
            TokenKind::CVar(_) => "class variable",
            TokenKind::GVar(_) => "global variable",
            TokenKind::BackRef(_) => "back reference",
            TokenKind::NthRef(_) => "numbered reference",
            TokenKind::Label(_) => "label",
            TokenKind::Keyword(k) => return format!("'{}'", k.as_str()),
            TokenKind::Number(n) => n.describe(),
            TokenKind::Char(_) => "char literal",
            TokenKind::Symbol(_) => "symbol literal",
            TokenKind::StringBegin(open) => match open.flavor {
                StringFlavor::Regexp => "regexp literal",
                StringFlavor::Symbol => "symbol literal",
                StringFlavor::Command => "backtick literal",
                StringFlavor::Words | StringFlavor::Symbols => "word list",
                StringFlavor::Plain | StringFlavor::Heredoc => "string literal",
            },
            TokenKind::StringContent(_) => "string content",
            TokenKind::InterpBegin => "'#{'",
            TokenKind::InterpEnd => "'}'",
            TokenKind::InterpVar => "'#'",
            TokenKind::WordSep => "word separator",
            TokenKind::StringEnd | TokenKind::LabelEnd => "string literal end",
            TokenKind::RegexpEnd(_) => "regexp literal end",
            TokenKind::OpAssign(_) => "operator-assignment",
            TokenKind::Newline => "'\\n'",
            TokenKind::InvalidByte(_) => "invalid character",
            TokenKind::Eof => "end-of-input",
            other => return other.punct_description(),
        };
        s.to_owned()
    }

    fn punct_description(&self) -> String {
        let text = self.punct_str().unwrap_or("?");
        if text.len() == 1 {
            format!("'{text}'")
        } else {
            text.to_owned()
        }
    }

    /// Source text of a punctuation token.
    pub fn punct_str(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Pow => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Assign => "=",
            TokenKind::EqEq => "==",
            TokenKind::EqEqEq => "===",
            TokenKind::NotEq => "!=",
            TokenKind::Match => "=~",
            TokenKind::NotMatch => "!~",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Cmp => "<=>",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Dot => ".",
            TokenKind::AndDot => "&.",
            TokenKind::ColonColon => "::",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::DotDot => "..",
            TokenKind::DotDotDot => "...",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Arrow => "=>",
            TokenKind::Lambda => "->",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
