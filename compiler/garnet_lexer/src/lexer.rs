//! The lexer: mode dispatch, trivia, operators and names.
//!
//! One call to [`Lexer::next_token`] produces one token. The top of the
//! mode stack picks the scanner: quoted literals and heredoc bodies have
//! their own (see `literal` and `heredoc`), everything else goes through
//! `lex_normal`, which skips trivia and then dispatches on the first byte.
//!
//! Heredoc bodies are read out of line: when `<<ID` is seen, the cursor
//! jumps to the next physical line, the body tokens are produced, and the
//! cursor jumps back to just after `<<ID`. The newline ending the opener's
//! line then skips over the consumed body via `heredoc_end`.

mod heredoc;
mod literal;
mod magic_comment;
mod number;

use garnet_diagnostic::span_utils::LineOffsetTable;
use garnet_ir::{
    AssignOp, Keyword, Name, ShareableMode, Span, StringFlavor, Token, TokenFlags, TokenKind,
};
use garnet_lexer_core::{Cursor, Encoding, SourceBuffer};

pub use magic_comment::MagicComments;

use crate::lex_error::{LexError, LexErrorKind, VarKind};
use crate::mode::{Mode, ModeStack};
use crate::state::{keyword_starts_command, LexState};

/// Answers whether a name is a local variable in the current scope.
///
/// Scopes belong to the parser. The lexer only asks, because `x -1` and
/// `x /y/` lex differently when `x` is a local.
pub trait LocalLookup {
    fn is_local(&self, name: &[u8]) -> bool;
}

/// A scope with no locals.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoLocals;

impl LocalLookup for NoLocals {
    fn is_local(&self, _name: &[u8]) -> bool {
        false
    }
}

#[inline]
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0b | 0x0c | b'\r' | b'\n')
}

/// Bytes that end input outside literals: NUL, `^D`, `^Z`.
#[inline]
fn is_soft_eof(b: u8) -> bool {
    matches!(b, 0x00 | 0x04 | 0x1a)
}

/// Operator method names usable as `:sym`, longest first.
const OPERATOR_SYMBOLS: &[&str] = &[
    "[]=", "[]", "<=>", "===", "==", "=~", "!=", "!~", "**", "+@", "-@", "<<", ">>", "<=", ">=",
    "!", "+", "-", "*", "/", "%", "<", ">", "&", "|", "^", "~", "`",
];

/// Tokenizer over one source buffer.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    source: &'a [u8],
    content_start: u32,
    encoding: Encoding,
    /// A BOM fixed the encoding; `coding:` comments are ignored.
    encoding_locked: bool,
    lines: LineOffsetTable,
    modes: ModeStack,
    state: LexState,
    /// The next token starts a statement.
    command_start: bool,
    /// The current token starts a statement.
    cmd_state: bool,
    /// A `name:` label may follow.
    label_ok: bool,
    pending_flags: TokenFlags,
    at_line_begin: bool,
    /// End of the heredoc bodies read from the current line.
    heredoc_end: Option<u32>,
    /// `#@var` seen in a literal; the variable is the next token.
    interp_var: bool,
    seen_token: bool,
    /// The unterminated literal at EOF has been reported.
    eof_reported: bool,
    /// A soft end-of-input marker or `__END__` was reached.
    done: bool,
    errors: Vec<LexError>,
    directives: Vec<(ShareableMode, Span)>,
    magic: MagicComments,
}

impl<'a> Lexer<'a> {
    pub fn new(buffer: &'a SourceBuffer) -> Self {
        let source = buffer.as_bytes();
        let mut lexer = Lexer {
            cursor: buffer.cursor(),
            source,
            content_start: buffer.content_start(),
            encoding: buffer.encoding(),
            encoding_locked: buffer.has_bom(),
            lines: LineOffsetTable::build(source),
            modes: ModeStack::new(),
            state: LexState::Beg,
            command_start: true,
            cmd_state: false,
            label_ok: false,
            pending_flags: TokenFlags::empty(),
            at_line_begin: true,
            heredoc_end: None,
            interp_var: false,
            seen_token: false,
            eof_reported: false,
            done: false,
            errors: Vec::new(),
            directives: Vec::new(),
            magic: MagicComments::default(),
        };
        for issue in buffer.encoding_issues() {
            lexer.errors.push(LexError::new(
                LexErrorKind::UnusableEncoding {
                    message: format!("{} is not ASCII compatible", issue.kind.encoding_name()),
                },
                Span::new(issue.pos, issue.pos + issue.len),
            ));
            lexer.done = true;
        }
        lexer
    }

    // === Public API ===

    /// Next token with no local-variable information.
    pub fn next_token(&mut self) -> Token {
        self.next_token_with(&NoLocals)
    }

    /// Next token, asking `locals` whether identifiers are local variables.
    pub fn next_token_with(&mut self, locals: &dyn LocalLookup) -> Token {
        if std::mem::take(&mut self.interp_var) {
            return self.lex_interp_var();
        }
        match self.modes.top() {
            Mode::Literal(_) => self.lex_literal(),
            Mode::Heredoc(_) => self.lex_heredoc_body(),
            Mode::Normal | Mode::Interp { .. } => self.lex_normal(locals),
        }
    }

    pub fn state(&self) -> LexState {
        self.state
    }

    /// Override the state; the parser does this after `def recv.`.
    pub fn set_state(&mut self, state: LexState) {
        self.state = state;
    }

    /// Current source encoding (after any magic comment).
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// `shareable_constant_value` directives seen since the last call.
    pub fn take_directives(&mut self) -> Vec<(ShareableMode, Span)> {
        std::mem::take(&mut self.directives)
    }

    pub fn magic(&self) -> &MagicComments {
        &self.magic
    }

    // === Token construction ===

    fn error(&mut self, kind: LexErrorKind, span: Span) {
        self.errors.push(LexError::new(kind, span));
    }

    /// An error for a construct still open when the input ran out.
    fn error_at_eof(&mut self, kind: LexErrorKind, span: Span) {
        let end = self.cursor.source_len();
        self.errors.push(LexError::new(kind, span).with_end_of_input(end));
    }

    fn finish(&mut self, kind: TokenKind, start: u32) -> Token {
        let span = Span::new(start, self.cursor.pos());
        self.emit(kind, span)
    }

    fn emit(&mut self, kind: TokenKind, span: Span) -> Token {
        let mut flags = std::mem::take(&mut self.pending_flags);
        if self.cmd_state {
            flags |= TokenFlags::CMD_START;
        }
        if std::mem::take(&mut self.at_line_begin) {
            flags |= TokenFlags::LINE_START;
        }
        let (line, column) = self.lines.offset_to_line_col(self.source, span.start);
        if !matches!(kind, TokenKind::Eof) {
            self.seen_token = true;
        }
        Token::new(kind, span, flags, line, column)
    }

    fn at_line_head(&self) -> bool {
        self.cursor.pos() == self.content_start || self.cursor.at_line_start()
    }

    // === End of input ===

    /// Close whatever is still open, one frame per call, then `Eof`.
    fn lex_eof(&mut self) -> Token {
        if !self.eof_reported {
            let error = match self.modes.innermost_literal() {
                Some(Mode::Literal(lit)) => Some(LexError::new(
                    LexErrorKind::UnterminatedLiteral {
                        what: lit.unterminated_noun(),
                    },
                    lit.opener,
                )
                .with_end_of_input(self.cursor.source_len())),
                Some(Mode::Heredoc(doc)) => Some(LexError::new(
                    LexErrorKind::UnterminatedHeredoc {
                        ident: String::from_utf8_lossy(&doc.ident).into_owned(),
                    },
                    doc.decl,
                )
                .with_end_of_input(self.cursor.source_len())),
                _ => None,
            };
            if let Some(error) = error {
                self.errors.push(error);
                self.eof_reported = true;
            }
        }
        let end = Span::point(self.cursor.pos());
        match self.modes.top() {
            Mode::Interp { .. } => {
                self.modes.pop();
                self.emit(TokenKind::InterpEnd, end)
            }
            Mode::Literal(lit) => {
                let kind = if lit.flavor == StringFlavor::Regexp {
                    TokenKind::RegexpEnd("".into())
                } else {
                    TokenKind::StringEnd
                };
                self.modes.pop();
                self.state = LexState::End;
                self.emit(kind, end)
            }
            // Heredoc bodies handle their own end of input.
            Mode::Heredoc(_) => self.lex_heredoc_body(),
            Mode::Normal => self.emit(TokenKind::Eof, end),
        }
    }

    // === Normal mode ===

    fn lex_normal(&mut self, locals: &dyn LocalLookup) -> Token {
        self.cmd_state = std::mem::take(&mut self.command_start);
        let label_ok = std::mem::take(&mut self.label_ok);
        loop {
            if let Some(newline) = self.skip_trivia() {
                return newline;
            }
            if self.done || self.cursor.is_eof() {
                return self.lex_eof();
            }
            let start = self.cursor.pos();
            let c = self.cursor.current();
            if c == b'.' && self.cursor.peek().is_ascii_digit() {
                self.skip_dot_fraction(start);
                continue;
            }
            if let Some(token) = self.lex_token(c, start, label_ok, locals) {
                return token;
            }
        }
    }

    /// Skip whitespace, comments and insignificant newlines. Returns a
    /// `Newline` token when a newline ends a statement.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            if self.done {
                return None;
            }
            if self.at_line_head() && self.skip_line_markers() {
                continue;
            }
            if self.cursor.is_eof() {
                return None;
            }
            match self.cursor.current() {
                b' ' | b'\t' | 0x0b | 0x0c => {
                    self.cursor.eat_whitespace();
                    self.pending_flags |= TokenFlags::SPACE_BEFORE;
                }
                b'\r' if self.cursor.peek() == b'\n' => {
                    self.cursor.advance();
                    if let Some(token) = self.newline() {
                        return Some(token);
                    }
                }
                b'\r' => {
                    let pos = self.cursor.pos();
                    self.error(LexErrorKind::CarriageReturn, Span::new(pos, pos + 1));
                    self.cursor.advance();
                    self.pending_flags |= TokenFlags::SPACE_BEFORE;
                }
                b'\\' if self.cursor.peek() == b'\n' => {
                    self.cursor.advance_n(2);
                    self.pending_flags |= TokenFlags::SPACE_BEFORE;
                }
                b'\\' if self.cursor.peek() == b'\r' && self.cursor.peek_at(2) == b'\n' => {
                    self.cursor.advance_n(3);
                    self.pending_flags |= TokenFlags::SPACE_BEFORE;
                }
                b'#' => self.skip_comment(),
                b'\n' => {
                    if let Some(token) = self.newline() {
                        return Some(token);
                    }
                }
                c if is_soft_eof(c) => {
                    self.done = true;
                    return None;
                }
                _ => return None,
            }
        }
    }

    /// `=begin` documents and `__END__`, recognized only at line start.
    fn skip_line_markers(&mut self) -> bool {
        if self.cursor.starts_with(b"=begin") && self.marker_ends(6) {
            self.skip_embedded_doc();
            return true;
        }
        if self.cursor.starts_with(b"__END__")
            && (self.cursor.pos() + 7 >= self.cursor.source_len()
                || matches!(self.cursor.peek_at(7), b'\n' | b'\r'))
        {
            self.done = true;
        }
        false
    }

    /// Whether the marker of length `len` at the cursor is followed by
    /// whitespace, a line end or the end of input.
    fn marker_ends(&self, len: u32) -> bool {
        self.cursor.pos() + len >= self.cursor.source_len()
            || matches!(
                self.cursor.peek_at(len),
                b' ' | b'\t' | b'\n' | b'\r' | 0x00 | 0x04 | 0x1a
            )
    }

    fn skip_embedded_doc(&mut self) {
        let start = self.cursor.pos();
        loop {
            match self.cursor.find(b'\n') {
                Some(nl) => self.cursor.set_pos(nl + 1),
                None => {
                    self.cursor.set_pos(self.cursor.source_len());
                    self.error_at_eof(
                        LexErrorKind::UnterminatedEmbeddedDoc,
                        Span::new(start, start + 6),
                    );
                    return;
                }
            }
            if self.cursor.starts_with(b"=end") && self.marker_ends(4) {
                self.cursor.eat_until_newline_or_eof();
                return;
            }
        }
    }

    fn skip_comment(&mut self) {
        let hash = self.cursor.pos();
        self.cursor.eat_until_newline_or_eof();
        let end = self.cursor.pos();
        let end = if end > hash && self.source.get(end as usize - 1) == Some(&b'\r') {
            end - 1
        } else {
            end
        };
        self.process_comment(hash, end);
    }

    /// Cursor on `\n`.
    fn newline(&mut self) -> Option<Token> {
        let at = self.cursor.pos();
        self.cursor.advance();
        self.at_line_begin = true;
        if let Some(end) = self.heredoc_end.take() {
            tracing::trace!(from = at, to = end, "skip heredoc bodies");
            self.cursor.set_pos(end);
        }
        if self.state.newline_significant() && !self.continues_with_leading_dot() {
            let token = self.emit(TokenKind::Newline, Span::new(at, at + 1));
            self.at_line_begin = true;
            self.state = LexState::Beg;
            self.command_start = true;
            self.label_ok = false;
            return Some(token);
        }
        self.pending_flags |= TokenFlags::NEWLINE_BEFORE;
        None
    }

    /// The next code line starts with `.meth` or `&.meth`.
    fn continues_with_leading_dot(&self) -> bool {
        let mut c = self.cursor;
        loop {
            c.eat_whitespace();
            match c.current() {
                b'#' => c.eat_until_newline_or_eof(),
                b'\n' if !c.is_eof() => c.advance(),
                b'\r' if c.peek() == b'\n' => c.advance_n(2),
                b'&' => return c.peek() == b'.',
                b'.' => return c.peek() != b'.',
                _ => return false,
            }
        }
    }

    /// One token starting with `c` at `start`; `None` to rescan.
    fn lex_token(
        &mut self,
        c: u8,
        start: u32,
        label_ok: bool,
        locals: &dyn LocalLookup,
    ) -> Option<Token> {
        let last = self.state;
        let space = self.pending_flags.contains(TokenFlags::SPACE_BEFORE);
        // Operand position in a command argument: `foo -1`, `foo /re/`.
        let spcarg = last.is_arg() && space && !is_space(self.cursor.peek());
        let method_name = matches!(last, LexState::Fname | LexState::Dot);

        match c {
            b'0'..=b'9' => return Some(self.lex_number(start)),
            b'"' | b'\'' => {
                let label = self.label_possible(label_ok, last);
                return Some(self.open_quote(start, c, label));
            }
            b'`' if !method_name => return Some(self.open_quote(start, c, false)),
            b'?' => return Some(self.lex_question(start, last)),
            b'@' => {
                let kind = self.scan_ivar();
                self.state = LexState::End;
                return Some(self.finish(kind, start));
            }
            b'$' => {
                let kind = self.scan_gvar(last);
                self.state = LexState::End;
                return Some(self.finish(kind, start));
            }
            b'%' if last.is_beg() || (spcarg && self.cursor.peek() != b'=') => {
                return Some(self.open_percent(start));
            }
            b'/' if last.is_beg() || (spcarg && self.cursor.peek() != b'=') => {
                return Some(self.open_regexp(start));
            }
            b'\\' => {
                self.cursor.advance();
                let escaped = match self.cursor.current() {
                    b' ' => "space",
                    b'\t' => "horizontal tab",
                    0x0c => "form feed",
                    b'\r' => "carriage return",
                    0x0b => "vertical tab",
                    _ => "",
                };
                if !escaped.is_empty() {
                    self.cursor.advance();
                }
                self.error(
                    LexErrorKind::InvalidBackslash { escaped },
                    Span::new(start, self.cursor.pos()),
                );
                return None;
            }
            b'_' | b'a'..=b'z' | b'A'..=b'Z' | 0x80..=0xff => {
                return Some(self.lex_identifier(start, last, label_ok, locals));
            }
            _ => {}
        }

        self.cursor.advance();
        let after_op = last.after_operator();
        let kind = match c {
            b'*' => {
                if self.cursor.eat_prefix(b"*=") {
                    self.assign_op(AssignOp::Pow)
                } else if self.cursor.eat(b'*') {
                    self.state = after_op;
                    TokenKind::Pow
                } else if self.cursor.eat(b'=') {
                    self.assign_op(AssignOp::Mul)
                } else {
                    self.state = after_op;
                    TokenKind::Star
                }
            }
            b'!' => {
                self.state = after_op;
                if method_name && self.cursor.eat(b'@') {
                    TokenKind::Bang
                } else if self.cursor.eat(b'=') {
                    TokenKind::NotEq
                } else if self.cursor.eat(b'~') {
                    TokenKind::NotMatch
                } else {
                    TokenKind::Bang
                }
            }
            b'=' => {
                self.state = after_op;
                if self.cursor.eat(b'=') {
                    if self.cursor.eat(b'=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.cursor.eat(b'~') {
                    TokenKind::Match
                } else if self.cursor.eat(b'>') {
                    self.state = LexState::Beg;
                    TokenKind::Arrow
                } else {
                    self.state = LexState::Beg;
                    TokenKind::Assign
                }
            }
            b'<' => {
                let heredoc_ok = !matches!(last, LexState::Dot | LexState::Class)
                    && !last.is_end()
                    && (!last.is_arg() || space);
                if heredoc_ok && self.cursor.current() == b'<' && self.cursor.peek() != b'=' {
                    self.cursor.advance();
                    if let Some(token) = self.lex_heredoc_open(start) {
                        return Some(token);
                    }
                    self.state = after_op;
                    TokenKind::Shl
                } else {
                    self.state = after_op;
                    if last == LexState::Class {
                        self.command_start = true;
                    }
                    if self.cursor.eat(b'=') {
                        if self.cursor.eat(b'>') {
                            TokenKind::Cmp
                        } else {
                            TokenKind::LtEq
                        }
                    } else if self.cursor.eat_prefix(b"<=") {
                        self.assign_op(AssignOp::Shl)
                    } else if self.cursor.eat(b'<') {
                        TokenKind::Shl
                    } else {
                        TokenKind::Lt
                    }
                }
            }
            b'>' => {
                self.state = after_op;
                if self.cursor.eat(b'=') {
                    TokenKind::GtEq
                } else if self.cursor.eat_prefix(b">=") {
                    self.assign_op(AssignOp::Shr)
                } else if self.cursor.eat(b'>') {
                    TokenKind::Shr
                } else {
                    TokenKind::Gt
                }
            }
            b'`' => {
                self.state = if last == LexState::Fname {
                    LexState::EndFn
                } else if self.cmd_state {
                    LexState::CmdArg
                } else {
                    LexState::Arg
                };
                TokenKind::Ident(Name::new("`"))
            }
            b'&' => {
                if self.cursor.eat_prefix(b"&=") {
                    self.assign_op(AssignOp::AndAnd)
                } else if self.cursor.eat(b'&') {
                    self.state = LexState::Beg;
                    TokenKind::AndAnd
                } else if self.cursor.eat(b'=') {
                    self.assign_op(AssignOp::BitAnd)
                } else if self.cursor.eat(b'.') {
                    self.state = LexState::Dot;
                    TokenKind::AndDot
                } else {
                    self.state = after_op;
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.cursor.eat_prefix(b"|=") {
                    self.assign_op(AssignOp::OrOr)
                } else if self.cursor.eat(b'|') {
                    self.state = LexState::Beg;
                    TokenKind::OrOr
                } else if self.cursor.eat(b'=') {
                    self.assign_op(AssignOp::BitOr)
                } else {
                    self.state = after_op;
                    self.label_ok = true;
                    TokenKind::Pipe
                }
            }
            b'+' | b'-' => {
                let plus = c == b'+';
                if method_name && self.cursor.eat(b'@') {
                    self.state = LexState::Arg;
                    TokenKind::Ident(Name::new(if plus { "+@" } else { "-@" }))
                } else if self.cursor.eat(b'=') {
                    self.assign_op(if plus { AssignOp::Add } else { AssignOp::Sub })
                } else if !plus && self.cursor.eat(b'>') {
                    self.state = LexState::EndFn;
                    TokenKind::Lambda
                } else {
                    self.state = after_op;
                    if plus {
                        TokenKind::Plus
                    } else {
                        TokenKind::Minus
                    }
                }
            }
            b'.' => {
                if self.cursor.eat(b'.') {
                    self.state = LexState::Beg;
                    if self.cursor.eat(b'.') {
                        TokenKind::DotDotDot
                    } else {
                        TokenKind::DotDot
                    }
                } else {
                    self.state = LexState::Dot;
                    TokenKind::Dot
                }
            }
            b')' => {
                self.state = LexState::EndFn;
                TokenKind::RParen
            }
            b']' => {
                self.state = LexState::End;
                TokenKind::RBracket
            }
            b'}' => {
                if let Mode::Interp { brace_depth } = self.modes.top_mut() {
                    if *brace_depth == 0 {
                        self.modes.pop();
                        self.state = LexState::End;
                        return Some(self.finish(TokenKind::InterpEnd, start));
                    }
                    *brace_depth -= 1;
                }
                self.state = LexState::End;
                TokenKind::RBrace
            }
            b'{' => {
                if let Mode::Interp { brace_depth } = self.modes.top_mut() {
                    *brace_depth += 1;
                }
                let block = last.is_arg() || last.is_end();
                self.state = LexState::Beg;
                self.label_ok = !block;
                if block {
                    self.command_start = true;
                }
                TokenKind::LBrace
            }
            b'(' => {
                self.state = LexState::Beg;
                self.label_ok = true;
                TokenKind::LParen
            }
            b'[' => {
                if method_name && self.cursor.eat(b']') {
                    self.state = LexState::Arg;
                    if self.cursor.eat(b'=') {
                        TokenKind::Ident(Name::new("[]="))
                    } else {
                        TokenKind::Ident(Name::new("[]"))
                    }
                } else {
                    self.state = LexState::Beg;
                    self.label_ok = true;
                    TokenKind::LBracket
                }
            }
            b':' => {
                if self.cursor.eat(b':') {
                    let top_level = last.is_beg()
                        || last == LexState::Class
                        || (last.is_arg() && space && !is_space(self.cursor.current()));
                    self.state = if top_level {
                        LexState::Beg
                    } else {
                        LexState::Dot
                    };
                    TokenKind::ColonColon
                } else if last.is_end()
                    || self.cursor.is_eof()
                    || is_space(self.cursor.current())
                    || self.cursor.current() == b'#'
                {
                    self.state = LexState::Beg;
                    TokenKind::Colon
                } else if matches!(self.cursor.current(), b'"' | b'\'') {
                    let quote = self.cursor.current();
                    self.cursor.advance();
                    return Some(self.open_symbol_string(start, quote));
                } else {
                    self.lex_symbol()
                }
            }
            b'/' => {
                if self.cursor.eat(b'=') {
                    self.assign_op(AssignOp::Div)
                } else {
                    self.state = after_op;
                    TokenKind::Slash
                }
            }
            b'%' => {
                if self.cursor.eat(b'=') {
                    self.assign_op(AssignOp::Mod)
                } else {
                    self.state = after_op;
                    TokenKind::Percent
                }
            }
            b'^' => {
                if self.cursor.eat(b'=') {
                    self.assign_op(AssignOp::BitXor)
                } else {
                    self.state = after_op;
                    TokenKind::Caret
                }
            }
            b'~' => {
                if method_name {
                    self.cursor.eat(b'@');
                }
                self.state = after_op;
                TokenKind::Tilde
            }
            b';' => {
                self.state = LexState::Beg;
                self.command_start = true;
                TokenKind::Semi
            }
            b',' => {
                self.state = LexState::Beg;
                self.label_ok = true;
                TokenKind::Comma
            }
            _ => {
                self.error(
                    LexErrorKind::InvalidChar { byte: c },
                    Span::new(start, start + 1),
                );
                TokenKind::InvalidByte(c)
            }
        };
        Some(self.finish(kind, start))
    }

    fn assign_op(&mut self, op: AssignOp) -> TokenKind {
        self.state = LexState::Beg;
        TokenKind::OpAssign(op)
    }

    fn label_possible(&self, label_ok: bool, last: LexState) -> bool {
        ((label_ok || last == LexState::EndFn) && !self.cmd_state) || last.is_arg()
    }

    // === Names ===

    /// Consume one multibyte character, reporting it when invalid.
    fn eat_multibyte(&mut self) -> bool {
        if let Some(len) = self.encoding.char_len(self.cursor.rest()) {
            self.cursor.advance_n(u32::try_from(len).unwrap_or(1));
            return true;
        }
        let start = self.cursor.pos();
        while !self.cursor.is_eof()
            && self.cursor.current() >= 0x80
            && self.encoding.char_len(self.cursor.rest()).is_none()
        {
            self.cursor.advance();
        }
        self.error(
            LexErrorKind::InvalidMultibyte {
                encoding: self.encoding.name(),
            },
            Span::new(start, self.cursor.pos()),
        );
        false
    }

    fn scan_ident_chars(&mut self) {
        while !self.cursor.is_eof() {
            let c = self.cursor.current();
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.cursor.advance();
            } else if c >= 0x80 {
                self.eat_multibyte();
            } else {
                break;
            }
        }
    }

    /// Whether the character at the cursor is an uppercase letter.
    fn at_uppercase(&self) -> bool {
        let c = self.cursor.current();
        if c < 0x80 {
            return c.is_ascii_uppercase();
        }
        if !self.encoding.is_utf8() {
            return false;
        }
        let width = Cursor::utf8_char_width(c);
        let bytes = self.cursor.slice(self.cursor.pos(), self.cursor.pos() + width);
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .is_some_and(char::is_uppercase)
    }

    fn lex_identifier(
        &mut self,
        start: u32,
        last: LexState,
        label_ok: bool,
        locals: &dyn LocalLookup,
    ) -> Token {
        let is_const = self.at_uppercase();
        self.scan_ident_chars();

        let c = self.cursor.current();
        let peek = self.cursor.peek();
        let mut setter = false;
        if matches!(c, b'!' | b'?') && peek != b'=' {
            self.cursor.advance();
        } else if last == LexState::Fname
            && c == b'='
            && !matches!(peek, b'~' | b'>')
            && (peek != b'=' || self.cursor.peek_at(2) == b'>')
        {
            self.cursor.advance();
            setter = true;
        }
        let text = self.cursor.slice_from(start);

        if !setter
            && self.label_possible(label_ok, last)
            && self.cursor.current() == b':'
            && self.cursor.peek() != b':'
        {
            self.cursor.advance();
            self.state = LexState::Beg;
            return self.finish(TokenKind::Label(Name::from_bytes(text)), start);
        }

        if last != LexState::Dot {
            if let Some(kw) = Keyword::from_bytes(text) {
                if last == LexState::Fname {
                    self.state = LexState::EndFn;
                } else {
                    self.state = LexState::after_keyword(kw);
                    if keyword_starts_command(kw) {
                        self.command_start = true;
                    }
                }
                return self.finish(TokenKind::Keyword(kw), start);
            }
        }

        self.state = if last == LexState::Fname {
            LexState::EndFn
        } else if last == LexState::Dot {
            if self.cmd_state {
                LexState::CmdArg
            } else {
                LexState::Arg
            }
        } else if !is_const && locals.is_local(text) {
            LexState::End
        } else if last.is_beg() || last.is_arg() {
            if self.cmd_state {
                LexState::CmdArg
            } else {
                LexState::Arg
            }
        } else {
            LexState::End
        };
        let name = Name::from_bytes(text);
        let kind = if is_const {
            TokenKind::Const(name)
        } else {
            TokenKind::Ident(name)
        };
        self.finish(kind, start)
    }

    /// `@ivar` or `@@cvar` (cursor on `@`).
    fn scan_ivar(&mut self) -> TokenKind {
        let start = self.cursor.pos();
        self.cursor.advance();
        let kind = if self.cursor.eat(b'@') {
            VarKind::Class
        } else {
            VarKind::Instance
        };
        let c = self.cursor.current();
        if self.cursor.is_eof() || !is_ident_byte(c) {
            self.error(
                LexErrorKind::VarWithoutName { kind },
                Span::new(start, self.cursor.pos()),
            );
        } else {
            self.scan_ident_chars();
            if c.is_ascii_digit() {
                let name = String::from_utf8_lossy(self.cursor.slice_from(start)).into_owned();
                self.error(
                    LexErrorKind::InvalidVarName { name, kind },
                    Span::new(start, self.cursor.pos()),
                );
            }
        }
        let name = Name::from_bytes(self.cursor.slice_from(start));
        match kind {
            VarKind::Class => TokenKind::CVar(name),
            VarKind::Instance | VarKind::Global => TokenKind::IVar(name),
        }
    }

    /// `$gvar`, special globals, `$&` back-references and `$1` (cursor on `$`).
    fn scan_gvar(&mut self, last: LexState) -> TokenKind {
        let start = self.cursor.pos();
        self.cursor.advance();
        let c = self.cursor.current();
        let global = |lexer: &Self| TokenKind::GVar(Name::from_bytes(lexer.cursor.slice_from(start)));
        if self.cursor.is_eof() || is_space(c) {
            self.error(
                LexErrorKind::VarWithoutName {
                    kind: VarKind::Global,
                },
                Span::new(start, self.cursor.pos()),
            );
            return global(self);
        }
        match c {
            b'_' if !is_ident_byte(self.cursor.peek()) => {
                self.cursor.advance();
                global(self)
            }
            b'~' | b'*' | b'$' | b'?' | b'!' | b'@' | b'/' | b'\\' | b';' | b',' | b'.'
            | b'=' | b':' | b'<' | b'>' | b'"' => {
                self.cursor.advance();
                global(self)
            }
            b'-' => {
                self.cursor.advance();
                let next = self.cursor.current();
                if next >= 0x80 {
                    self.eat_multibyte();
                } else if is_ident_byte(next) {
                    self.cursor.advance();
                }
                global(self)
            }
            b'&' | b'`' | b'\'' | b'+' => {
                self.cursor.advance();
                if last == LexState::Fname {
                    global(self)
                } else {
                    TokenKind::BackRef(c)
                }
            }
            b'1'..=b'9' => {
                let digits_start = self.cursor.pos();
                self.cursor.eat_while(|b| b.is_ascii_digit());
                if last == LexState::Fname {
                    return global(self);
                }
                let digits = self.cursor.slice_from(digits_start);
                let n = std::str::from_utf8(digits)
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(u32::MAX);
                TokenKind::NthRef(n)
            }
            b'0' => {
                self.cursor.advance();
                if is_ident_byte(self.cursor.current()) && !self.cursor.is_eof() {
                    self.scan_ident_chars();
                    let name = String::from_utf8_lossy(self.cursor.slice_from(start)).into_owned();
                    self.error(
                        LexErrorKind::InvalidVarName {
                            name,
                            kind: VarKind::Global,
                        },
                        Span::new(start, self.cursor.pos()),
                    );
                }
                global(self)
            }
            _ if is_ident_byte(c) => {
                self.scan_ident_chars();
                global(self)
            }
            _ => {
                self.cursor.advance();
                let name = String::from_utf8_lossy(self.cursor.slice_from(start)).into_owned();
                self.error(
                    LexErrorKind::InvalidVarName {
                        name,
                        kind: VarKind::Global,
                    },
                    Span::new(start, self.cursor.pos()),
                );
                global(self)
            }
        }
    }

    /// The variable after `#` in `"#@ivar"`.
    fn lex_interp_var(&mut self) -> Token {
        let start = self.cursor.pos();
        let kind = if self.cursor.current() == b'@' {
            self.scan_ivar()
        } else {
            self.scan_gvar(LexState::Beg)
        };
        self.finish(kind, start)
    }

    /// `:name`, `:@ivar`, `:$gvar`, `:+` (cursor after `:`).
    fn lex_symbol(&mut self) -> TokenKind {
        let start = self.cursor.pos();
        let c = self.cursor.current();
        let name = match c {
            b'@' => match self.scan_ivar() {
                TokenKind::IVar(name) | TokenKind::CVar(name) => name,
                _ => Name::from_bytes(self.cursor.slice_from(start)),
            },
            b'$' => {
                self.scan_gvar(LexState::Fname);
                Name::from_bytes(self.cursor.slice_from(start))
            }
            _ if is_ident_byte(c) => {
                self.scan_ident_chars();
                let next = self.cursor.current();
                let peek = self.cursor.peek();
                if matches!(next, b'!' | b'?') && peek != b'=' {
                    self.cursor.advance();
                } else if next == b'='
                    && !matches!(peek, b'~' | b'>')
                    && (peek != b'=' || self.cursor.peek_at(2) == b'>')
                {
                    self.cursor.advance();
                }
                Name::from_bytes(self.cursor.slice_from(start))
            }
            _ => {
                let Some(op) = OPERATOR_SYMBOLS
                    .iter()
                    .find(|op| self.cursor.starts_with(op.as_bytes()))
                else {
                    self.state = LexState::Beg;
                    return TokenKind::Colon;
                };
                self.cursor.advance_n(u32::try_from(op.len()).unwrap_or(1));
                Name::new(op)
            }
        };
        self.state = LexState::End;
        TokenKind::Symbol(name)
    }
}

#[cfg(test)]
mod tests;
