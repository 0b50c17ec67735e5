//! Lexical mode stack.
//!
//! The top frame decides how the next bytes are scanned. `Normal` is the
//! floor and can never be popped; string-like literals, heredoc bodies and
//! `#{ }` interpolations push a frame on entry and pop it on their
//! terminator. Each frame carries exactly what is needed to resume scanning
//! in that mode, so there is no scanner state outside the stack.

use garnet_ir::{Span, StringFlavor};
use tracing::trace;

/// Scanning rules for a quoted literal (`"..."`, `%w[...]`, `/.../`, ...).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiteralMode {
    pub flavor: StringFlavor,
    /// Opening delimiter for nesting pairs like `(`/`)`, or 0.
    pub open: u8,
    pub close: u8,
    /// Unclosed nested openers seen so far.
    pub nesting: u32,
    pub interpolates: bool,
    /// A `":` closer would make this a hash label.
    pub label_ok: bool,
    /// Span of the opening delimiter, for "unterminated" errors.
    pub opener: Span,
}

impl LiteralMode {
    /// Whitespace-separated word list (`%w`, `%i` and friends).
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self.flavor, StringFlavor::Words | StringFlavor::Symbols)
    }

    /// Noun used in "unterminated X meets end of file".
    pub fn unterminated_noun(&self) -> &'static str {
        match self.flavor {
            StringFlavor::Words | StringFlavor::Symbols => "list",
            StringFlavor::Regexp => "regexp",
            StringFlavor::Symbol => "quoted string",
            StringFlavor::Plain | StringFlavor::Command | StringFlavor::Heredoc => "string",
        }
    }
}

/// Scanning rules for a heredoc body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeredocMode {
    pub ident: Box<[u8]>,
    pub interpolates: bool,
    /// `<<-` or `<<~`: the terminator may be indented.
    pub indented_end: bool,
    /// `<<~`: columns of common indentation to strip from each line.
    pub dedent: Option<u32>,
    /// Where lexing continues on the opener's line once the body is done.
    pub resume: u32,
    /// The `<<ID` token, where "can't find string" is reported.
    pub decl: Span,
    /// The next byte begins a body line.
    pub at_line_start: bool,
}

/// One frame of the mode stack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Normal,
    /// Inside `#{ }`; counts braces opened inside the interpolation.
    Interp { brace_depth: u32 },
    Literal(LiteralMode),
    Heredoc(HeredocMode),
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Interp { .. } => "interp",
            Mode::Literal(_) => "literal",
            Mode::Heredoc(_) => "heredoc",
        }
    }
}

/// Stack of active modes; never empty.
#[derive(Clone, Debug)]
pub struct ModeStack {
    frames: Vec<Mode>,
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeStack {
    pub fn new() -> Self {
        ModeStack {
            frames: vec![Mode::Normal],
        }
    }

    pub fn push(&mut self, mode: Mode) {
        trace!(mode = mode.name(), depth = self.frames.len(), "push lexer mode");
        self.frames.push(mode);
    }

    /// Pop the top frame. The `Normal` floor stays put and yields `None`.
    pub fn pop(&mut self) -> Option<Mode> {
        if self.frames.len() <= 1 {
            return None;
        }
        let mode = self.frames.pop();
        if let Some(m) = &mode {
            trace!(mode = m.name(), depth = self.frames.len(), "pop lexer mode");
        }
        mode
    }

    pub fn top(&self) -> &Mode {
        // `frames` always holds the floor.
        &self.frames[self.frames.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Mode {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Innermost frame that is a literal or heredoc.
    pub fn innermost_literal(&self) -> Option<&Mode> {
        self.frames
            .iter()
            .rev()
            .find(|m| matches!(m, Mode::Literal(_) | Mode::Heredoc(_)))
    }

    pub fn in_interpolation(&self) -> bool {
        matches!(self.top(), Mode::Interp { .. })
    }
}

#[cfg(test)]
mod tests;
