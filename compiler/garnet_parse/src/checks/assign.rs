//! Assignment targets.
//!
//! The left side of `=` is parsed as an ordinary expression and converted
//! here once the `=` is seen. Conversion declares local variables, so it
//! must happen before the token after `=` is lexed.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{Call, CallForm, CallOp, Name, Node, NodeKind, Span};

use crate::{ParseError, Parser};

/// Identifier usable as a local variable.
pub(crate) fn is_local_name(name: &str) -> bool {
    name.bytes()
        .next()
        .is_some_and(|b| b == b'_' || b.is_ascii_lowercase() || !b.is_ascii())
        && name
            .bytes()
            .all(|b| b == b'_' || b.is_ascii_alphanumeric() || !b.is_ascii())
}

fn is_attr_call(call: &Call) -> bool {
    call.receiver.is_some()
        && call.args.is_empty()
        && call.block.is_none()
        && call.op != CallOp::None
        && call
            .method
            .as_str()
            .bytes()
            .last()
            .is_some_and(|b| b == b'_' || b.is_ascii_alphanumeric())
}

/// Whether `node` may stand left of `=`, including read-only targets that
/// are reported on conversion.
pub(crate) fn is_assignable_shape(node: &Node) -> bool {
    match &node.kind {
        NodeKind::LocalVar(_)
        | NodeKind::IVar(_)
        | NodeKind::CVar(_)
        | NodeKind::GVar(_)
        | NodeKind::BackRef(_)
        | NodeKind::NthRef(_)
        | NodeKind::Const(_)
        | NodeKind::Colon2 { .. }
        | NodeKind::Colon3(_)
        | NodeKind::SelfRef
        | NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::File
        | NodeKind::Line(_)
        | NodeKind::Encoding => true,
        NodeKind::Call(call) => match call.form {
            CallForm::Variable => is_local_name(call.method.as_str()),
            CallForm::Index => true,
            CallForm::Parens => is_attr_call(call),
            _ => false,
        },
        _ => false,
    }
}

/// Item of a multiple-assignment target list.
pub(crate) fn is_mlhs_item(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Splat(_) | NodeKind::MlhsGroup(_)) || is_assignable_shape(node)
}

/// Names bound by `(?<name>...)` groups of a regexp literal without
/// interpolation, in order of first appearance.
pub(crate) fn named_captures(node: &Node) -> Option<Vec<Name>> {
    let NodeKind::Regexp { parts, .. } = &node.unwrap_parens().kind else {
        return None;
    };
    let mut source = Vec::new();
    for part in parts {
        let NodeKind::Str(bytes) = &part.kind else {
            return None;
        };
        source.extend_from_slice(bytes);
    }
    let mut names: Vec<Name> = Vec::new();
    let mut i = 0;
    while i < source.len() {
        match source[i] {
            b'\\' => i += 2,
            b'(' if source[i + 1..].starts_with(b"?<")
                && !matches!(source.get(i + 3), Some(b'=' | b'!')) =>
            {
                let start = i + 3;
                let len = source[start..].iter().take_while(|&&b| b != b'>').count();
                let name = String::from_utf8_lossy(&source[start..start + len]);
                if is_local_name(&name) && !names.iter().any(|n| n.as_str() == name) {
                    names.push(Name::new(&name));
                }
                i = start + len;
            }
            _ => i += 1,
        }
    }
    (!names.is_empty()).then_some(names)
}

fn read_only_message(kind: &NodeKind) -> Option<String> {
    Some(match kind {
        NodeKind::SelfRef => "Can't change the value of self".to_string(),
        NodeKind::Nil => "Can't assign to nil".to_string(),
        NodeKind::True => "Can't assign to true".to_string(),
        NodeKind::False => "Can't assign to false".to_string(),
        NodeKind::File => "Can't assign to __FILE__".to_string(),
        NodeKind::Line(_) => "Can't assign to __LINE__".to_string(),
        NodeKind::Encoding => "Can't assign to __ENCODING__".to_string(),
        NodeKind::BackRef(c) => format!("Can't set variable ${}", char::from(*c)),
        NodeKind::NthRef(n) => format!("Can't set variable ${n}"),
        _ => return None,
    })
}

impl Parser<'_> {
    /// Convert `node` into a valueless assignment target, declaring locals.
    /// Read-only targets are reported and yield `None`.
    pub(crate) fn assignable(&mut self, node: Node) -> Option<Node> {
        self.to_target(node, false)
    }

    /// Target of `op=`. Locals count as read; attribute and index calls
    /// stay calls since both reader and writer are invoked.
    pub(crate) fn op_assignable(&mut self, node: Node) -> Option<Node> {
        self.to_target(node, true)
    }

    /// Convert one item of a multiple-assignment list.
    pub(crate) fn mlhs_target(&mut self, node: Node) -> Option<Node> {
        match node.kind {
            NodeKind::Splat(Some(inner)) => {
                let inner = self.assignable(*inner)?;
                Some(Node::new(NodeKind::Splat(Some(inner.boxed())), node.span))
            }
            NodeKind::Splat(None) | NodeKind::MlhsGroup(_) => Some(node),
            _ => self.assignable(node),
        }
    }

    fn to_target(&mut self, node: Node, op_assign: bool) -> Option<Node> {
        let span = node.span;
        if let Some(message) = read_only_message(&node.kind) {
            self.report(ParseError::new(ErrorCode::E1002, message, span));
            return None;
        }
        let kind = match node.kind {
            NodeKind::LocalVar(name) => self.local_target(name, span, op_assign),
            NodeKind::Call(call) if call.form == CallForm::Variable => {
                self.local_target(call.method, span, op_assign)
            }
            NodeKind::IVar(name) => NodeKind::IVarAsgn { name, value: None },
            NodeKind::CVar(name) => NodeKind::CVarAsgn { name, value: None },
            NodeKind::GVar(name) => NodeKind::GVarAsgn { name, value: None },
            kind @ (NodeKind::Const(_) | NodeKind::Colon2 { .. } | NodeKind::Colon3(_)) => {
                if self.context.in_def() {
                    self.report(ParseError::new(
                        ErrorCode::E1003,
                        "dynamic constant assignment",
                        span,
                    ));
                }
                NodeKind::ConstAsgn {
                    target: Node::new(kind, span).boxed(),
                    value: None,
                    shareable: None,
                }
            }
            NodeKind::Call(mut call) => {
                match call.form {
                    CallForm::Index => {
                        if call.block.is_some() {
                            self.report(ParseError::new(
                                ErrorCode::E1009,
                                "block arg given in index assignment",
                                span,
                            ));
                        }
                        if !op_assign {
                            call.form = CallForm::IndexAssign;
                        }
                    }
                    CallForm::Parens if !op_assign => {
                        call.method = call.method.with_suffix("=");
                        call.form = CallForm::AttrAssign;
                    }
                    _ => {}
                }
                NodeKind::Call(call)
            }
            other => {
                self.report(ParseError::new(
                    ErrorCode::E1002,
                    "unassignable target",
                    span,
                ));
                tracing::debug!(?other, "unassignable");
                return None;
            }
        };
        Some(Node::new(kind, span))
    }

    fn local_target(&mut self, name: Name, span: Span, op_assign: bool) -> NodeKind {
        self.scopes.assign(&name, span);
        if op_assign {
            self.scopes.mark_used(name.as_str());
        }
        NodeKind::LocalAsgn { name, value: None }
    }

    /// Declare the names bound by a `regexp =~ value` match.
    pub(crate) fn declare_captures(&mut self, names: &[Name], span: Span) {
        for name in names {
            self.scopes.assign(name, span);
            self.scopes.mark_used(name.as_str());
        }
    }
}
