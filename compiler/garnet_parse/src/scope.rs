//! Local variable scopes.
//!
//! Method, class and module bodies open a hard scope: nothing outside is
//! visible. Blocks and lambdas open a soft scope that also sees the
//! enclosing locals. The lexer asks this stack whether an identifier is a
//! local (through [`LocalLookup`]), since `x -1` and `x [1]` mean different
//! things for locals and method calls.

use garnet_ir::{Name, Span};
use garnet_lexer::LocalLookup;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ScopeKind {
    /// The file itself.
    Top,
    /// `def` body.
    Def,
    /// `class`, `module` or `class <<` body.
    Class,
    /// Block or lambda body.
    Block,
}

impl ScopeKind {
    fn is_hard(self) -> bool {
        !matches!(self, ScopeKind::Block)
    }
}

#[derive(Clone, Debug)]
struct Local {
    /// First assignment or parameter.
    span: Span,
    used: bool,
}

#[derive(Clone, Debug)]
struct Frame {
    kind: ScopeKind,
    locals: FxHashMap<Name, Local>,
}

/// Stack of open scopes; the bottom frame is always [`ScopeKind::Top`].
#[derive(Clone, Debug)]
pub(crate) struct ScopeStack {
    frames: SmallVec<[Frame; 8]>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub(crate) fn new() -> Self {
        let mut frames = SmallVec::new();
        frames.push(Frame {
            kind: ScopeKind::Top,
            locals: FxHashMap::default(),
        });
        ScopeStack { frames }
    }

    pub(crate) fn push(&mut self, kind: ScopeKind) {
        self.frames.push(Frame {
            kind,
            locals: FxHashMap::default(),
        });
    }

    /// Close the innermost scope. Returns its assigned-but-never-read
    /// locals in source order; the file scope is never popped.
    pub(crate) fn pop(&mut self) -> Vec<(Name, Span)> {
        if self.frames.len() <= 1 {
            return Vec::new();
        }
        let Some(frame) = self.frames.pop() else {
            return Vec::new();
        };
        let mut unused: Vec<(Name, Span)> = frame
            .locals
            .into_iter()
            .filter(|(name, local)| !local.used && !name.is_underscore())
            .map(|(name, local)| (name, local.span))
            .collect();
        unused.sort_by_key(|(_, span)| span.start);
        unused
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    fn visible(&self) -> impl Iterator<Item = &Frame> {
        let mut done = false;
        self.frames.iter().rev().take_while(move |frame| {
            if done {
                return false;
            }
            done = frame.kind.is_hard();
            true
        })
    }

    pub(crate) fn is_local(&self, name: &str) -> bool {
        self.visible().any(|frame| frame.locals.contains_key(name))
    }

    /// Record an assignment to `name`. Returns `true` when this declares a
    /// new local in the innermost scope.
    pub(crate) fn assign(&mut self, name: &Name, span: Span) -> bool {
        if self.is_local(name.as_str()) {
            return false;
        }
        self.innermost().locals.insert(
            name.clone(),
            Local {
                span,
                used: false,
            },
        );
        true
    }

    /// Declare a parameter or block-local in the innermost scope.
    /// Parameters never count as unused.
    pub(crate) fn declare_param(&mut self, name: &Name, span: Span) {
        self.innermost()
            .locals
            .insert(name.clone(), Local { span, used: true });
    }

    /// Mark `name` as read.
    pub(crate) fn mark_used(&mut self, name: &str) {
        let depth = self.frames.len();
        let mut bottom = 0;
        for (i, frame) in self.frames.iter().enumerate().rev() {
            if frame.kind.is_hard() {
                bottom = i;
                break;
            }
        }
        for frame in self.frames[bottom..depth].iter_mut().rev() {
            if let Some(local) = frame.locals.get_mut(name) {
                local.used = true;
                return;
            }
        }
    }

    fn innermost(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}

impl LocalLookup for ScopeStack {
    fn is_local(&self, name: &[u8]) -> bool {
        std::str::from_utf8(name).is_ok_and(|name| ScopeStack::is_local(self, name))
    }
}

#[cfg(test)]
mod tests;
