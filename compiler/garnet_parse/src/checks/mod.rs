//! Semantic checks run while the tree is built.
//!
//! None of these stop the parse: they record an error or warning and the
//! parser carries on with the node it has.

pub(crate) mod assign;
mod cond;
mod void;

use garnet_ir::{Node, NodeKind};

/// `recv` of `def recv.name` is a literal, which cannot hold singleton
/// methods.
pub(crate) fn is_singleton_literal(recv: &Node) -> bool {
    matches!(
        recv.last_statement().kind,
        NodeKind::Number(_)
            | NodeKind::Str(_)
            | NodeKind::DStr(_)
            | NodeKind::XStr(_)
            | NodeKind::Sym(_)
            | NodeKind::DSym(_)
            | NodeKind::Regexp { .. }
            | NodeKind::Array(_)
            | NodeKind::File
            | NodeKind::Line(_)
            | NodeKind::Encoding
    )
}

/// A value fixed at parse time: scalars, plain strings and containers of
/// them.
pub(crate) fn is_static_literal(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::Number(_)
        | NodeKind::Str(_)
        | NodeKind::Sym(_)
        | NodeKind::File
        | NodeKind::Line(_)
        | NodeKind::Encoding => true,
        NodeKind::Regexp { parts, .. } => parts.iter().all(|p| matches!(p.kind, NodeKind::Str(_))),
        NodeKind::Array(elems) => elems.iter().all(is_static_literal),
        NodeKind::Hash(pairs) => pairs.iter().all(|pair| match &pair.kind {
            NodeKind::Pair { key, value } => is_static_literal(key) && is_static_literal(value),
            _ => false,
        }),
        _ => false,
    }
}
