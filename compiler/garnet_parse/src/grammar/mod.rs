//! Grammar productions.
//!
//! Precedence, lowest first:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | statement | modifiers `if` `unless` `while` `until` `rescue` |
//! | expr | `and` `or`, then `not` |
//! | arg | `=` `op=`, then `? :`, then `..` `...` |
//! | binary | `\|\|`, `&&`, equality, comparison, `\|` `^`, `&`, shifts, `+` `-`, `*` `/` `%` |
//! | unary | `-`, then `**`, then `!` `~` `+` |
//! | postfix | `.` `&.` `::` `[]`, blocks |

mod call;
mod control;
mod def;
mod expr;
mod literal;
mod params;
mod primary;
mod stmt;

use garnet_ir::{Node, NodeKind, Span};

pub(crate) use call::ArgsEnd;

/// Collapse a statement list; `None` when empty.
pub(crate) fn seq(mut stmts: Vec<Node>) -> Option<Node> {
    match stmts.len() {
        0 => None,
        1 => stmts.pop(),
        _ => {
            let span = stmts[0].span.merge(stmts[stmts.len() - 1].span);
            Some(Node::new(NodeKind::Seq(stmts), span))
        }
    }
}

/// Like [`seq`] but keeps an empty clause as an empty `Seq` at `at`.
pub(crate) fn seq_or_empty(stmts: Vec<Node>, at: Span) -> Node {
    seq(stmts).unwrap_or_else(|| Node::new(NodeKind::Seq(Vec::new()), at))
}

fn boxed(node: Option<Node>) -> Option<Box<Node>> {
    node.map(Node::boxed)
}
