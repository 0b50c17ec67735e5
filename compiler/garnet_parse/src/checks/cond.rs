//! Conditions of `if`, `unless`, `while`, `until` and `?:`.

use garnet_ir::{Node, NodeKind};

use super::is_static_literal;
use crate::{ParseWarning, Parser};

fn is_string_literal(node: Option<&Node>) -> bool {
    node.is_some_and(|n| matches!(n.kind, NodeKind::Str(_) | NodeKind::DStr(_)))
}

impl Parser<'_> {
    /// Turn `node` into a condition. A range that is the whole condition
    /// (possibly through parentheses) becomes a flip-flop; literals draw
    /// warnings.
    pub(crate) fn cond(&mut self, mut node: Node) -> Node {
        self.check_cond(&mut node);
        node
    }

    fn check_cond(&mut self, node: &mut Node) {
        if matches!(node.kind, NodeKind::Range { .. }) {
            self.flip_flop(node);
            return;
        }
        let span = node.span;
        match &mut node.kind {
            NodeKind::Parens(Some(inner)) => self.check_cond(inner),
            NodeKind::Seq(stmts) if stmts.len() == 1 => self.check_cond(&mut stmts[0]),
            NodeKind::And(lhs, rhs) | NodeKind::Or(lhs, rhs) => {
                self.check_cond(lhs);
                self.check_cond(rhs);
            }
            NodeKind::Str(_) | NodeKind::DStr(_) => {
                self.warn(ParseWarning::LiteralInCondition { what: "string" }, span);
            }
            NodeKind::Regexp { .. } => {
                self.warn(ParseWarning::LiteralInCondition { what: "regex" }, span);
            }
            NodeKind::Sym(_) | NodeKind::DSym(_) => {
                self.warn(ParseWarning::LiteralInCondition { what: "symbol" }, span);
            }
            NodeKind::Number(_) => {
                self.warn(ParseWarning::LiteralInCondition { what: "" }, span);
            }
            NodeKind::LocalAsgn {
                value: Some(value), ..
            }
            | NodeKind::IVarAsgn {
                value: Some(value), ..
            }
            | NodeKind::CVarAsgn {
                value: Some(value), ..
            }
            | NodeKind::GVarAsgn {
                value: Some(value), ..
            }
            | NodeKind::ConstAsgn {
                value: Some(value), ..
            }
            | NodeKind::MultiAsgn { value, .. } => {
                if is_static_literal(value) {
                    self.warn(ParseWarning::LiteralAssignInCondition, span);
                }
            }
            _ => {}
        }
    }

    fn flip_flop(&mut self, node: &mut Node) {
        let NodeKind::Range {
            low,
            high,
            exclusive,
        } = &mut node.kind
        else {
            return;
        };
        let (low, high, exclusive) = (low.take(), high.take(), *exclusive);
        if is_string_literal(low.as_deref()) || is_string_literal(high.as_deref()) {
            self.warn(ParseWarning::StringInFlipFlop, node.span);
        }
        node.kind = NodeKind::FlipFlop {
            low,
            high,
            exclusive,
        };
    }
}
