//! Tagging constant assignments made under `shareable_constant_value`.
//!
//! The parser does not freeze anything. It records on each `ConstAsgn`
//! what a later pass must do with the value, and flags the nodes inside a
//! literal value that the pass needs to visit.

use garnet_ir::{Node, NodeFlags, NodeKind, ShareableAction, ShareableMode, ShareableTag};

/// Tag for a constant assigned `value` under `mode`; `None` when no
/// directive is in effect.
pub(crate) fn tag(mode: ShareableMode, value: &mut Node) -> Option<ShareableTag> {
    let action = match mode {
        ShareableMode::None => return None,
        ShareableMode::Literal => {
            if mark_literal(value) {
                ShareableAction::DeepFreezeLiteral
            } else {
                value.flags |= NodeFlags::ENSURE_SHAREABLE;
                ShareableAction::EnsureShareable
            }
        }
        ShareableMode::ExperimentalEverything => {
            mark_eligible(value);
            ShareableAction::MakeShareable
        }
        ShareableMode::ExperimentalCopy => {
            mark_eligible(value);
            ShareableAction::MakeShareableCopy
        }
    };
    Some(ShareableTag { mode, action })
}

/// Flag a literal tree for deep freezing. Non-literal leaves inside it are
/// flagged for a runtime shareability check. Returns `false` when `node`
/// itself is not a literal.
fn mark_literal(node: &mut Node) -> bool {
    match &mut node.kind {
        NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::Number(_)
        | NodeKind::Sym(_)
        | NodeKind::DSym(_)
        | NodeKind::Regexp { .. }
        | NodeKind::File
        | NodeKind::Line(_)
        | NodeKind::Encoding => true,
        NodeKind::Str(_) | NodeKind::DStr(_) => {
            node.flags |= NodeFlags::SHAREABLE_ELIGIBLE;
            true
        }
        NodeKind::Range { low, high, .. } => {
            low.as_deref_mut().map_or(true, mark_literal)
                && high.as_deref_mut().map_or(true, mark_literal)
        }
        NodeKind::Array(elems) => {
            elems.iter_mut().for_each(mark_element);
            node.flags |= NodeFlags::SHAREABLE_ELIGIBLE;
            true
        }
        NodeKind::Hash(pairs) => {
            for pair in pairs {
                match &mut pair.kind {
                    NodeKind::Pair { key, value } => {
                        mark_element(key);
                        mark_element(value);
                    }
                    _ => pair.flags |= NodeFlags::ENSURE_SHAREABLE,
                }
            }
            node.flags |= NodeFlags::SHAREABLE_ELIGIBLE;
            true
        }
        _ => false,
    }
}

fn mark_element(node: &mut Node) {
    if !mark_literal(node) {
        node.flags |= NodeFlags::ENSURE_SHAREABLE;
    }
}

/// Flag every literal container and string reachable through literals.
fn mark_eligible(node: &mut Node) {
    match &mut node.kind {
        NodeKind::Str(_) | NodeKind::DStr(_) => node.flags |= NodeFlags::SHAREABLE_ELIGIBLE,
        NodeKind::Array(elems) => {
            elems.iter_mut().for_each(mark_eligible);
            node.flags |= NodeFlags::SHAREABLE_ELIGIBLE;
        }
        NodeKind::Hash(pairs) => {
            for pair in pairs {
                if let NodeKind::Pair { key, value } = &mut pair.kind {
                    mark_eligible(key);
                    mark_eligible(value);
                }
            }
            node.flags |= NodeFlags::SHAREABLE_ELIGIBLE;
        }
        _ => {}
    }
}
