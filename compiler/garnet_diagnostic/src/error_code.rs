//! Error codes for all front-end diagnostics.
//!
//! The first character and digit identify the reporting phase:
//! - E0xxx: lexical errors
//! - E1xxx: grammar errors
//! - W2xxx: warnings (never fatal)
//! - E3xxx: source encoding errors

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string, list, symbol or regexp literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Malformed numeric literal
    E0003,
    /// Malformed character literal
    E0004,
    /// Invalid escape sequence
    E0005,
    /// Heredoc terminator not found or malformed identifier
    E0006,
    /// Unterminated embedded document
    E0007,
    /// Invalid variable name after a sigil
    E0008,
    /// Unknown percent-literal type
    E0009,
    /// Invalid multibyte character
    E0010,
    /// Stray backslash
    E0011,
    /// Unknown regexp option
    E0012,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Assignment to a pseudo-variable or read-only global
    E1002,
    /// Constant assignment inside a method body
    E1003,
    /// Formal argument is not a local variable name
    E1004,
    /// Duplicated argument name
    E1005,
    /// Void value used as a value
    E1006,
    /// Singleton method defined on a literal
    E1007,
    /// `else` without `rescue`
    E1008,
    /// Conflicting block arguments
    E1009,
    /// Jump statement outside a valid context
    E1010,
    /// Invalid class or module definition
    E1011,
    /// Alias of a numbered reference
    E1012,

    // Warnings (W2xxx)
    /// Literal used as a condition
    W2001,
    /// Assignment of a literal inside a condition
    W2002,
    /// Value computed in void context
    W2003,
    /// Local variable assigned but never used
    W2004,
    /// Chained comparison
    W2005,
    /// Deprecated escape spelling
    W2006,
    /// Float literal out of range
    W2007,
    /// Magic comment ignored or malformed
    W2008,
    /// Carriage return in the middle of a line
    W2009,

    // Encoding Errors (E3xxx)
    /// Unknown encoding name in a magic comment
    E3001,
    /// Encoding name refers to a process default or dummy encoding
    E3002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            ErrorCode::E0011 => "E0011",
            ErrorCode::E0012 => "E0012",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E1012 => "E1012",
            ErrorCode::W2001 => "W2001",
            ErrorCode::W2002 => "W2002",
            ErrorCode::W2003 => "W2003",
            ErrorCode::W2004 => "W2004",
            ErrorCode::W2005 => "W2005",
            ErrorCode::W2006 => "W2006",
            ErrorCode::W2007 => "W2007",
            ErrorCode::W2008 => "W2008",
            ErrorCode::W2009 => "W2009",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
        }
    }

    /// One-line explanation for `garnet explain`-style lookups.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "a literal was opened but its closing delimiter never appeared",
            ErrorCode::E0002 => "a byte that cannot start any token appeared in code",
            ErrorCode::E0003 => "a numeric literal is malformed",
            ErrorCode::E0004 => "a `?x` character literal is malformed",
            ErrorCode::E0005 => "a backslash escape inside a literal is malformed",
            ErrorCode::E0006 => "a here document is malformed or never terminated",
            ErrorCode::E0007 => "an `=begin` block has no matching `=end`",
            ErrorCode::E0008 => "a sigil (`@`, `@@`, `$`) is not followed by a valid name",
            ErrorCode::E0009 => "the character after `%` does not select a literal type",
            ErrorCode::E0010 => "bytes do not form a character in the source encoding",
            ErrorCode::E0011 => "a backslash outside a literal does not continue a line",
            ErrorCode::E0012 => "a regexp literal has an unknown option letter",
            ErrorCode::E1001 => "the token cannot appear at this point of the grammar",
            ErrorCode::E1002 => "the assignment target can never be assigned",
            ErrorCode::E1003 => "constants cannot be assigned inside a method body",
            ErrorCode::E1004 => "method and block parameters must be local variable names",
            ErrorCode::E1005 => "the same parameter name appears twice in one list",
            ErrorCode::E1006 => "a jump statement is used where a value is required",
            ErrorCode::E1007 => "singleton methods cannot be defined on literal values",
            ErrorCode::E1008 => "an `else` clause only makes sense after `rescue`",
            ErrorCode::E1009 => "a block argument conflicts with another block or is not allowed",
            ErrorCode::E1010 => "break/next/redo/retry/yield/return used outside a valid context",
            ErrorCode::E1011 => "a class or module definition is malformed or misplaced",
            ErrorCode::E1012 => "numbered match references cannot be aliased",
            ErrorCode::W2001 => "a literal in a condition is always true or always false",
            ErrorCode::W2002 => "`=` of a literal in a condition is probably a mistyped `==`",
            ErrorCode::W2003 => "a value is computed and then discarded",
            ErrorCode::W2004 => "a local variable is assigned but never read",
            ErrorCode::W2005 => "`a < b < c` compares a boolean with a value",
            ErrorCode::W2006 => "an escape uses a deprecated spelling",
            ErrorCode::W2007 => "a float literal exceeds the representable range",
            ErrorCode::W2008 => "a magic comment is misplaced or has an invalid value",
            ErrorCode::W2009 => "a carriage return appears before the end of a line",
            ErrorCode::E3001 => "the encoding named by a magic comment is unknown",
            ErrorCode::E3002 => "the encoding named by a magic comment cannot be used for source",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }

    pub fn is_encoding_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
