//! Syntax tree traversal.
//!
//! `Visitor` walks the tree read-only, `VisitorMut` may rewrite node flags
//! in place. Both default to visiting every child in source order; override
//! `visit_node` and call `walk_node`/`walk_node_mut` to continue.
//!
//! `shareable_constants` is the entry point for the shareability analyzer:
//! it lists every constant assignment the parser tagged.

use smallvec::SmallVec;

use crate::ast::{
    BeginBody, BlockLiteral, Call, DefNode, Node, NodeKind, Params, ShareableTag,
};

/// Read-only traversal.
pub trait Visitor<'ast> {
    fn visit_node(&mut self, node: &'ast Node) {
        walk_node(self, node);
    }
}

/// Traversal with mutable access to each node.
pub trait VisitorMut {
    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }
}

pub fn walk_node<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, node: &'ast Node) {
    for child in children(node) {
        visitor.visit_node(child);
    }
}

pub fn walk_node_mut<V: VisitorMut + ?Sized>(visitor: &mut V, node: &mut Node) {
    for child in children_mut(node) {
        visitor.visit_node_mut(child);
    }
}

type Children<'a> = SmallVec<[&'a Node; 4]>;
type ChildrenMut<'a> = SmallVec<[&'a mut Node; 4]>;

/// Direct children of `node` in source order.
pub fn children(node: &Node) -> Children<'_> {
    let mut out = Children::new();
    match &node.kind {
        NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::SelfRef
        | NodeKind::File
        | NodeKind::Line(_)
        | NodeKind::Encoding
        | NodeKind::Number(_)
        | NodeKind::Str(_)
        | NodeKind::Sym(_)
        | NodeKind::LocalVar(_)
        | NodeKind::IVar(_)
        | NodeKind::CVar(_)
        | NodeKind::GVar(_)
        | NodeKind::BackRef(_)
        | NodeKind::NthRef(_)
        | NodeKind::Const(_)
        | NodeKind::Colon3(_)
        | NodeKind::Redo
        | NodeKind::Retry
        | NodeKind::Alias { .. }
        | NodeKind::Undef(_) => {}
        NodeKind::DStr(parts)
        | NodeKind::XStr(parts)
        | NodeKind::DSym(parts)
        | NodeKind::Regexp { parts, .. }
        | NodeKind::Array(parts)
        | NodeKind::Hash(parts)
        | NodeKind::Seq(parts)
        | NodeKind::Yield(parts)
        | NodeKind::MlhsGroup(parts) => out.extend(parts.iter()),
        NodeKind::Interp(inner)
        | NodeKind::Splat(inner)
        | NodeKind::DoubleSplat(inner)
        | NodeKind::BlockPass(inner)
        | NodeKind::Parens(inner)
        | NodeKind::Return(inner)
        | NodeKind::Break(inner)
        | NodeKind::Next(inner)
        | NodeKind::PreExe(inner)
        | NodeKind::PostExe(inner) => out.extend(inner.as_deref()),
        NodeKind::LocalAsgn { value, .. }
        | NodeKind::IVarAsgn { value, .. }
        | NodeKind::CVarAsgn { value, .. }
        | NodeKind::GVarAsgn { value, .. } => out.extend(value.as_deref()),
        NodeKind::Pair { key, value } => {
            out.push(key);
            out.push(value);
        }
        NodeKind::Range { low, high, .. } | NodeKind::FlipFlop { low, high, .. } => {
            out.extend(low.as_deref());
            out.extend(high.as_deref());
        }
        NodeKind::Colon2 { scope, .. } => out.push(scope),
        NodeKind::Call(call) => call_children(call, &mut out),
        NodeKind::Super { args, block } => {
            if let Some(args) = args {
                out.extend(args.iter());
            }
            out.extend(block.as_deref());
        }
        NodeKind::Block(block) | NodeKind::Lambda(block) => block_children(block, &mut out),
        NodeKind::ConstAsgn { target, value, .. } => {
            out.push(target);
            out.extend(value.as_deref());
        }
        NodeKind::OpAsgn { target, value, .. } => {
            out.push(target);
            out.push(value);
        }
        NodeKind::MultiAsgn { targets, value } => {
            out.extend(targets.iter());
            out.push(value);
        }
        NodeKind::MatchAsgn { regexp, value, .. } => {
            out.push(regexp);
            out.push(value);
        }
        NodeKind::And(l, r) | NodeKind::Or(l, r) => {
            out.push(l);
            out.push(r);
        }
        NodeKind::Not(inner) | NodeKind::Defined(inner) => out.push(inner),
        NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.push(cond);
            out.extend(then_branch.as_deref());
            out.extend(else_branch.as_deref());
        }
        NodeKind::While { cond, body, .. } => {
            out.push(cond);
            out.extend(body.as_deref());
        }
        NodeKind::For { var, iter, body } => {
            out.push(var);
            out.push(iter);
            out.extend(body.as_deref());
        }
        NodeKind::Case {
            subject,
            whens,
            else_branch,
        } => {
            out.extend(subject.as_deref());
            out.extend(whens.iter());
            out.extend(else_branch.as_deref());
        }
        NodeKind::When { conds, body } => {
            out.extend(conds.iter());
            out.extend(body.as_deref());
        }
        NodeKind::Begin(body) => begin_children(body, &mut out),
        NodeKind::RescueClause {
            exceptions,
            var,
            body,
        } => {
            out.extend(exceptions.iter());
            out.extend(var.as_deref());
            out.extend(body.as_deref());
        }
        NodeKind::RescueMod { expr, rescue } => {
            out.push(expr);
            out.push(rescue);
        }
        NodeKind::Def(def) => def_children(def, &mut out),
        NodeKind::Class {
            path,
            superclass,
            body,
        } => {
            out.push(path);
            out.extend(superclass.as_deref());
            out.extend(body.as_deref());
        }
        NodeKind::SClass { target: path, body } | NodeKind::Module { path, body } => {
            out.push(path);
            out.extend(body.as_deref());
        }
    }
    out
}

fn call_children<'a>(call: &'a Call, out: &mut Children<'a>) {
    out.extend(call.receiver.as_ref());
    out.extend(call.args.iter());
    out.extend(call.block.as_ref());
}

fn block_children<'a>(block: &'a BlockLiteral, out: &mut Children<'a>) {
    if let Some(params) = &block.params {
        param_children(params, out);
    }
    out.extend(block.body.as_ref());
}

fn begin_children<'a>(body: &'a BeginBody, out: &mut Children<'a>) {
    out.extend(body.body.as_ref());
    out.extend(body.rescues.iter());
    out.extend(body.else_branch.as_ref());
    out.extend(body.ensure.as_ref());
}

fn def_children<'a>(def: &'a DefNode, out: &mut Children<'a>) {
    out.extend(def.singleton.as_ref());
    param_children(&def.params, out);
    out.extend(def.body.as_ref());
}

fn param_children<'a>(params: &'a Params, out: &mut Children<'a>) {
    out.extend(params.optional.iter().map(|(_, default)| default));
    out.extend(params.keywords.iter().filter_map(|(_, default)| default.as_ref()));
}

/// Mutable counterpart of [`children`], same order.
pub fn children_mut(node: &mut Node) -> ChildrenMut<'_> {
    let mut out = ChildrenMut::new();
    match &mut node.kind {
        NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::SelfRef
        | NodeKind::File
        | NodeKind::Line(_)
        | NodeKind::Encoding
        | NodeKind::Number(_)
        | NodeKind::Str(_)
        | NodeKind::Sym(_)
        | NodeKind::LocalVar(_)
        | NodeKind::IVar(_)
        | NodeKind::CVar(_)
        | NodeKind::GVar(_)
        | NodeKind::BackRef(_)
        | NodeKind::NthRef(_)
        | NodeKind::Const(_)
        | NodeKind::Colon3(_)
        | NodeKind::Redo
        | NodeKind::Retry
        | NodeKind::Alias { .. }
        | NodeKind::Undef(_) => {}
        NodeKind::DStr(parts)
        | NodeKind::XStr(parts)
        | NodeKind::DSym(parts)
        | NodeKind::Regexp { parts, .. }
        | NodeKind::Array(parts)
        | NodeKind::Hash(parts)
        | NodeKind::Seq(parts)
        | NodeKind::Yield(parts)
        | NodeKind::MlhsGroup(parts) => out.extend(parts.iter_mut()),
        NodeKind::Interp(inner)
        | NodeKind::Splat(inner)
        | NodeKind::DoubleSplat(inner)
        | NodeKind::BlockPass(inner)
        | NodeKind::Parens(inner)
        | NodeKind::Return(inner)
        | NodeKind::Break(inner)
        | NodeKind::Next(inner)
        | NodeKind::PreExe(inner)
        | NodeKind::PostExe(inner) => out.extend(inner.as_deref_mut()),
        NodeKind::LocalAsgn { value, .. }
        | NodeKind::IVarAsgn { value, .. }
        | NodeKind::CVarAsgn { value, .. }
        | NodeKind::GVarAsgn { value, .. } => out.extend(value.as_deref_mut()),
        NodeKind::Pair { key, value }
        | NodeKind::OpAsgn {
            target: key, value, ..
        }
        | NodeKind::MatchAsgn {
            regexp: key, value, ..
        }
        | NodeKind::And(key, value)
        | NodeKind::Or(key, value)
        | NodeKind::RescueMod {
            expr: key,
            rescue: value,
        } => {
            out.push(key);
            out.push(value);
        }
        NodeKind::Range { low, high, .. } | NodeKind::FlipFlop { low, high, .. } => {
            out.extend(low.as_deref_mut());
            out.extend(high.as_deref_mut());
        }
        NodeKind::Colon2 { scope, .. } => out.push(scope),
        NodeKind::Call(call) => {
            let Call {
                receiver,
                args,
                block,
                ..
            } = &mut **call;
            out.extend(receiver.as_mut());
            out.extend(args.iter_mut());
            out.extend(block.as_mut());
        }
        NodeKind::Super { args, block } => {
            if let Some(args) = args {
                out.extend(args.iter_mut());
            }
            out.extend(block.as_deref_mut());
        }
        NodeKind::Block(block) | NodeKind::Lambda(block) => {
            let BlockLiteral { params, body, .. } = &mut **block;
            if let Some(params) = params {
                param_children_mut(params, &mut out);
            }
            out.extend(body.as_mut());
        }
        NodeKind::ConstAsgn { target, value, .. } => {
            out.push(target);
            out.extend(value.as_deref_mut());
        }
        NodeKind::MultiAsgn { targets, value } => {
            out.extend(targets.iter_mut());
            out.push(value);
        }
        NodeKind::Not(inner) | NodeKind::Defined(inner) => out.push(inner),
        NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.push(cond);
            out.extend(then_branch.as_deref_mut());
            out.extend(else_branch.as_deref_mut());
        }
        NodeKind::While { cond, body, .. } => {
            out.push(cond);
            out.extend(body.as_deref_mut());
        }
        NodeKind::For { var, iter, body } => {
            out.push(var);
            out.push(iter);
            out.extend(body.as_deref_mut());
        }
        NodeKind::Case {
            subject,
            whens,
            else_branch,
        } => {
            out.extend(subject.as_deref_mut());
            out.extend(whens.iter_mut());
            out.extend(else_branch.as_deref_mut());
        }
        NodeKind::When { conds, body } => {
            out.extend(conds.iter_mut());
            out.extend(body.as_deref_mut());
        }
        NodeKind::Begin(body) => {
            let BeginBody {
                body,
                rescues,
                else_branch,
                ensure,
                ..
            } = &mut **body;
            out.extend(body.as_mut());
            out.extend(rescues.iter_mut());
            out.extend(else_branch.as_mut());
            out.extend(ensure.as_mut());
        }
        NodeKind::RescueClause {
            exceptions,
            var,
            body,
        } => {
            out.extend(exceptions.iter_mut());
            out.extend(var.as_deref_mut());
            out.extend(body.as_deref_mut());
        }
        NodeKind::Def(def) => {
            let DefNode {
                singleton,
                params,
                body,
                ..
            } = &mut **def;
            out.extend(singleton.as_mut());
            param_children_mut(params, &mut out);
            out.extend(body.as_mut());
        }
        NodeKind::Class {
            path,
            superclass,
            body,
        } => {
            out.push(path);
            out.extend(superclass.as_deref_mut());
            out.extend(body.as_deref_mut());
        }
        NodeKind::SClass { target: path, body } | NodeKind::Module { path, body } => {
            out.push(path);
            out.extend(body.as_deref_mut());
        }
    }
    out
}

fn param_children_mut<'a>(params: &'a mut Params, out: &mut ChildrenMut<'a>) {
    let Params {
        optional, keywords, ..
    } = params;
    out.extend(optional.iter_mut().map(|(_, default)| default));
    out.extend(keywords.iter_mut().filter_map(|(_, default)| default.as_mut()));
}

/// Constant assignments carrying a shareability tag, in source order.
pub fn shareable_constants(root: &Node) -> Vec<(&Node, ShareableTag)> {
    struct Collect<'ast> {
        found: Vec<(&'ast Node, ShareableTag)>,
    }

    impl<'ast> Visitor<'ast> for Collect<'ast> {
        fn visit_node(&mut self, node: &'ast Node) {
            if let NodeKind::ConstAsgn {
                shareable: Some(tag),
                ..
            } = &node.kind
            {
                self.found.push((node, *tag));
            }
            walk_node(self, node);
        }
    }

    let mut collect = Collect { found: Vec::new() };
    collect.visit_node(root);
    collect.found
}
