//! Void value and void context analysis.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{BeginBody, Node, NodeFlags, NodeKind, Span};

use crate::{ParseError, ParseWarning, Parser};

/// Span of the jump that keeps `node` from producing a value.
pub(crate) fn void_value(node: &Node) -> Option<Span> {
    match &node.kind {
        NodeKind::Return(_)
        | NodeKind::Break(_)
        | NodeKind::Next(_)
        | NodeKind::Redo
        | NodeKind::Retry => Some(node.span),
        NodeKind::Parens(Some(inner)) => void_value(inner),
        NodeKind::Seq(stmts) => stmts.last().and_then(void_value),
        NodeKind::Begin(body) => begin_void(body),
        NodeKind::If {
            then_branch: Some(then_branch),
            else_branch: Some(else_branch),
            ..
        } => {
            let span = void_value(then_branch)?;
            void_value(else_branch).map(|_| span)
        }
        NodeKind::And(lhs, _) | NodeKind::Or(lhs, _) => void_value(lhs),
        _ => None,
    }
}

/// A void `ensure` voids everything; otherwise the body and every handler
/// must be void.
fn begin_void(body: &BeginBody) -> Option<Span> {
    if let Some(span) = body.ensure.as_ref().and_then(void_value) {
        return Some(span);
    }
    let head = body.body.as_ref().and_then(void_value)?;
    for rescue in &body.rescues {
        let NodeKind::RescueClause {
            body: Some(handler),
            ..
        } = &rescue.kind
        else {
            return None;
        };
        void_value(handler)?;
    }
    if let Some(else_branch) = &body.else_branch {
        void_value(else_branch)?;
    }
    Some(head)
}

impl Parser<'_> {
    /// Report `value` if it is used as a value but never produces one.
    /// Returns whether it was reported.
    pub(crate) fn check_value(&mut self, value: &mut Node) -> bool {
        if value.flags.contains(NodeFlags::VOID_REPORTED) {
            return true;
        }
        let Some(span) = void_value(value) else {
            return false;
        };
        self.report(ParseError::new(
            ErrorCode::E1006,
            "void value expression",
            span,
        ));
        value.flags |= NodeFlags::VOID_REPORTED;
        true
    }

    /// Warn about statements whose value is thrown away.
    pub(crate) fn warn_useless(&mut self, stmts: &[Node]) {
        for stmt in stmts {
            if let Some(what) = stmt.useless_description() {
                self.warn(ParseWarning::UselessUse { what }, stmt.span);
            }
        }
    }
}
