//! Lexer error types.
//!
//! Every problem the lexer finds is a `LexError`: a span plus a kind. Most
//! kinds are fatal; a few (deprecated escape spellings, magic comment
//! problems, out-of-range floats, stray carriage returns) are warnings and
//! never fail a parse. `into_diagnostic` maps both onto the shared
//! diagnostic type.

use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::Span;

/// A lexer error or warning with its location.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
    /// Offset where input ran out, for literals still open at the end.
    pub end_of_input: Option<u32>,
}

/// Which kind of variable a sigil introduces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VarKind {
    Instance,
    Class,
    Global,
}

impl VarKind {
    /// Article and noun as used in messages: "an instance".
    pub fn describe(self) -> &'static str {
        match self {
            VarKind::Instance => "an instance",
            VarKind::Class => "a class",
            VarKind::Global => "a global",
        }
    }

    pub fn sigil(self) -> &'static str {
        match self {
            VarKind::Instance => "@",
            VarKind::Class => "@@",
            VarKind::Global => "$",
        }
    }
}

/// What went wrong.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LexErrorKind {
    // === Literals ===
    /// `what` is "string", "list", "regexp" or "quoted string".
    UnterminatedLiteral { what: &'static str },
    UnterminatedHeredoc { ident: String },
    UnterminatedHeredocIdent,
    UnterminatedEmbeddedDoc,
    UnknownPercentType,
    UnknownRegexpOptions { options: String },
    IncompleteCharSyntax,

    // === Escapes ===
    InvalidHexEscape,
    InvalidUnicodeEscape,
    UnterminatedUnicodeEscape,
    UnicodeTooLarge,
    InvalidUnicodeList,
    TooShortEscape,
    MultipleCodepoints,
    InvalidEscapeSyntax,

    // === Numbers ===
    TrailingUnderscore,
    NumericWithoutDigits,
    InvalidOctalDigit,
    FractionAfterNumeric,
    LeadingDotFloat,

    // === Names and bytes ===
    VarWithoutName { kind: VarKind },
    InvalidVarName { name: String, kind: VarKind },
    InvalidChar { byte: u8 },
    InvalidMultibyte { encoding: &'static str },
    /// `escaped` names what follows the backslash ("space", "horizontal
    /// tab", ...), or is empty for a plain "invalid backslash".
    InvalidBackslash { escaped: &'static str },

    // === Encoding ===
    UnknownEncoding { name: String },
    UnusableEncoding { message: String },

    // === Warnings ===
    DeprecatedEscape { suggestion: String },
    FloatOutOfRange { text: String },
    CarriageReturn,
    MagicIgnoredAfterTokens { key: &'static str },
    MagicNotCommentOnly { key: &'static str },
    MagicInvalidValue { key: &'static str, value: String },
}

impl LexErrorKind {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            LexErrorKind::DeprecatedEscape { .. }
                | LexErrorKind::FloatOutOfRange { .. }
                | LexErrorKind::CarriageReturn
                | LexErrorKind::MagicIgnoredAfterTokens { .. }
                | LexErrorKind::MagicNotCommentOnly { .. }
                | LexErrorKind::MagicInvalidValue { .. }
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LexErrorKind::UnterminatedLiteral { .. } => ErrorCode::E0001,
            LexErrorKind::InvalidChar { .. } => ErrorCode::E0002,
            LexErrorKind::TrailingUnderscore
            | LexErrorKind::NumericWithoutDigits
            | LexErrorKind::InvalidOctalDigit
            | LexErrorKind::FractionAfterNumeric
            | LexErrorKind::LeadingDotFloat => ErrorCode::E0003,
            LexErrorKind::IncompleteCharSyntax | LexErrorKind::MultipleCodepoints => {
                ErrorCode::E0004
            }
            LexErrorKind::InvalidHexEscape
            | LexErrorKind::InvalidUnicodeEscape
            | LexErrorKind::UnterminatedUnicodeEscape
            | LexErrorKind::UnicodeTooLarge
            | LexErrorKind::InvalidUnicodeList
            | LexErrorKind::TooShortEscape
            | LexErrorKind::InvalidEscapeSyntax => ErrorCode::E0005,
            LexErrorKind::UnterminatedHeredoc { .. } | LexErrorKind::UnterminatedHeredocIdent => {
                ErrorCode::E0006
            }
            LexErrorKind::UnterminatedEmbeddedDoc => ErrorCode::E0007,
            LexErrorKind::VarWithoutName { .. } | LexErrorKind::InvalidVarName { .. } => {
                ErrorCode::E0008
            }
            LexErrorKind::UnknownPercentType => ErrorCode::E0009,
            LexErrorKind::InvalidMultibyte { .. } => ErrorCode::E0010,
            LexErrorKind::InvalidBackslash { .. } => ErrorCode::E0011,
            LexErrorKind::UnknownRegexpOptions { .. } => ErrorCode::E0012,
            LexErrorKind::UnknownEncoding { .. } => ErrorCode::E3001,
            LexErrorKind::UnusableEncoding { .. } => ErrorCode::E3002,
            LexErrorKind::DeprecatedEscape { .. } => ErrorCode::W2006,
            LexErrorKind::FloatOutOfRange { .. } => ErrorCode::W2007,
            LexErrorKind::MagicIgnoredAfterTokens { .. }
            | LexErrorKind::MagicNotCommentOnly { .. }
            | LexErrorKind::MagicInvalidValue { .. } => ErrorCode::W2008,
            LexErrorKind::CarriageReturn => ErrorCode::W2009,
        }
    }

    /// User-facing message text.
    pub fn message(&self) -> String {
        match self {
            LexErrorKind::UnterminatedLiteral { what } => {
                format!("unterminated {what} meets end of file")
            }
            LexErrorKind::UnterminatedHeredoc { ident } => {
                format!("can't find string \"{ident}\" anywhere before EOF")
            }
            LexErrorKind::UnterminatedHeredocIdent => {
                "unterminated here document identifier".to_string()
            }
            LexErrorKind::UnterminatedEmbeddedDoc => {
                "embedded document meets end of file".to_string()
            }
            LexErrorKind::UnknownPercentType => "unknown type of %string".to_string(),
            LexErrorKind::UnknownRegexpOptions { options } => {
                format!("unknown regexp options - {options}")
            }
            LexErrorKind::IncompleteCharSyntax => "incomplete character syntax".to_string(),
            LexErrorKind::InvalidHexEscape => "invalid hex escape".to_string(),
            LexErrorKind::InvalidUnicodeEscape => "invalid Unicode escape sequence".to_string(),
            LexErrorKind::UnterminatedUnicodeEscape => "unterminated Unicode escape".to_string(),
            LexErrorKind::UnicodeTooLarge => "invalid Unicode codepoint (too large)".to_string(),
            LexErrorKind::InvalidUnicodeList => "invalid Unicode list".to_string(),
            LexErrorKind::TooShortEscape => "too short escape sequence".to_string(),
            LexErrorKind::MultipleCodepoints => {
                "Multiple codepoints at single character literal".to_string()
            }
            LexErrorKind::InvalidEscapeSyntax => "Invalid escape character syntax".to_string(),
            LexErrorKind::TrailingUnderscore => "trailing '_' in number".to_string(),
            LexErrorKind::NumericWithoutDigits => "numeric literal without digits".to_string(),
            LexErrorKind::InvalidOctalDigit => "Invalid octal digit".to_string(),
            LexErrorKind::FractionAfterNumeric => {
                "unexpected fraction part after numeric literal".to_string()
            }
            LexErrorKind::LeadingDotFloat => {
                "no .<digit> floating literal anymore; put 0 before dot".to_string()
            }
            LexErrorKind::VarWithoutName { kind } => format!(
                "'{}' without identifiers is not allowed as {} variable name",
                kind.sigil(),
                kind.describe()
            ),
            LexErrorKind::InvalidVarName { name, kind } => {
                format!("'{name}' is not allowed as {} variable name", kind.describe())
            }
            LexErrorKind::InvalidChar { byte } => {
                format!("Invalid char '\\x{byte:02X}' in expression")
            }
            LexErrorKind::InvalidMultibyte { encoding } => {
                format!("invalid multibyte char ({encoding})")
            }
            LexErrorKind::InvalidBackslash { escaped } => {
                if escaped.is_empty() {
                    "invalid backslash".to_string()
                } else {
                    format!("invalid escaped {escaped}")
                }
            }
            LexErrorKind::UnknownEncoding { name } => format!("unknown encoding name: {name}"),
            LexErrorKind::UnusableEncoding { message } => message.clone(),
            LexErrorKind::DeprecatedEscape { suggestion } => {
                format!("invalid character syntax; use {suggestion}")
            }
            LexErrorKind::FloatOutOfRange { text } => format!("Float {text} out of range"),
            LexErrorKind::CarriageReturn => {
                "encountered \\r in middle of line, treated as a mere space".to_string()
            }
            LexErrorKind::MagicIgnoredAfterTokens { key } => {
                format!("'{key}' is ignored after any tokens")
            }
            LexErrorKind::MagicNotCommentOnly { key } => {
                format!("'{key}' is ignored unless in comment-only line")
            }
            LexErrorKind::MagicInvalidValue { key, value } => {
                format!("invalid value for {key}: {value}")
            }
        }
    }
}

impl LexError {
    #[cold]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError {
            span,
            kind,
            end_of_input: None,
        }
    }

    /// Mark the end-of-input position so the report shows both ends of an
    /// unterminated construct.
    pub fn with_end_of_input(mut self, pos: u32) -> Self {
        self.end_of_input = Some(pos);
        self
    }

    pub fn is_warning(&self) -> bool {
        self.kind.is_warning()
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// Convert into a diagnostic with the primary label on `span`.
    pub fn into_diagnostic(self) -> Diagnostic {
        let code = self.kind.code();
        let base = if self.kind.is_warning() {
            Diagnostic::warning(code)
        } else {
            Diagnostic::error(code)
        };
        let mut diag = base
            .with_message(self.kind.message())
            .with_label(self.span, "");
        if let Some(end) = self.end_of_input {
            diag = diag.with_secondary_label(Span::point(end), "end of input");
        }
        match &self.kind {
            LexErrorKind::UnterminatedHeredoc { ident } => {
                diag.with_suggestion(format!("add a line containing only `{ident}`"))
            }
            LexErrorKind::InvalidChar { .. } => {
                diag.with_note("control characters cannot appear outside literals")
            }
            LexErrorKind::LeadingDotFloat => diag.with_suggestion("write `0.` before the digits"),
            _ => diag,
        }
    }
}
