//! Method calls, argument lists and blocks.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{
    BlockLiteral, Call, CallForm, CallOp, Keyword, Name, Node, NodeKind, Params, Span, TokenFlags,
    TokenKind,
};

use super::params::ParamList;
use super::primary::variable_call;
use super::seq;
use crate::context::ParseContext;
use crate::recovery::Closers;
use crate::scope::ScopeKind;
use crate::{ErrorContext, ParseError, ParseWarning, Parser};

/// How an argument list is delimited.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ArgsEnd {
    /// `foo(...)`
    Paren,
    /// `recv[...]` and array literals.
    Bracket,
    /// `foo a, b`, ended by anything that is not a comma.
    Command,
}

impl ArgsEnd {
    fn closer(self) -> Option<(TokenKind, &'static str)> {
        match self {
            ArgsEnd::Paren => Some((TokenKind::RParen, "')'")),
            ArgsEnd::Bracket => Some((TokenKind::RBracket, "']'")),
            ArgsEnd::Command => None,
        }
    }
}

/// Keywords that may begin an expression.
fn keyword_starts_expr(kw: Keyword) -> bool {
    !matches!(
        kw,
        Keyword::If
            | Keyword::Unless
            | Keyword::While
            | Keyword::Until
            | Keyword::Rescue
            | Keyword::And
            | Keyword::Or
            | Keyword::Then
            | Keyword::Do
            | Keyword::End
            | Keyword::Else
            | Keyword::Elsif
            | Keyword::When
            | Keyword::In
            | Keyword::Ensure
    )
}

fn takes_block(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Call(call) => {
            matches!(call.form, CallForm::Variable | CallForm::Parens)
                && call
                    .block
                    .as_ref()
                    .map_or(true, |b| matches!(b.kind, NodeKind::BlockPass(_)))
        }
        NodeKind::Super { block, .. } => block
            .as_ref()
            .map_or(true, |b| matches!(b.kind, NodeKind::BlockPass(_))),
        _ => false,
    }
}

/// Move a trailing `&blk` out of `args`.
fn split_block_pass(args: &mut Vec<Node>) -> Option<Node> {
    if args
        .last()
        .is_some_and(|a| matches!(a.kind, NodeKind::BlockPass(_)))
    {
        args.pop()
    } else {
        None
    }
}

fn call_node(
    receiver: Option<Node>,
    method: Name,
    mut args: Vec<Node>,
    op: CallOp,
    form: CallForm,
    span: Span,
) -> Node {
    let block = split_block_pass(&mut args);
    Node::new(
        NodeKind::Call(Box::new(Call {
            receiver,
            method,
            args,
            block,
            op,
            form,
        })),
        span,
    )
}

impl Parser<'_> {
    /// Whether the current token begins an expression.
    pub(crate) fn at_expr_start(&self) -> bool {
        match self.kind() {
            TokenKind::Ident(_)
            | TokenKind::Const(_)
            | TokenKind::IVar(_)
            | TokenKind::CVar(_)
            | TokenKind::GVar(_)
            | TokenKind::BackRef(_)
            | TokenKind::NthRef(_)
            | TokenKind::Number(_)
            | TokenKind::Char(_)
            | TokenKind::Symbol(_)
            | TokenKind::StringBegin(_)
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::ColonColon
            | TokenKind::Lambda => true,
            TokenKind::Keyword(kw) => keyword_starts_expr(*kw),
            _ => false,
        }
    }

    /// Whether the token after a bare method name begins its first
    /// command argument (`puts x`, `foo -1`, `foo *a`).
    pub(crate) fn at_command_arg_start(&mut self) -> bool {
        let token = self.current();
        let spaced = token.has_space_before();
        match &token.kind {
            TokenKind::Ident(_)
            | TokenKind::Const(_)
            | TokenKind::IVar(_)
            | TokenKind::CVar(_)
            | TokenKind::GVar(_)
            | TokenKind::BackRef(_)
            | TokenKind::NthRef(_)
            | TokenKind::Number(_)
            | TokenKind::Char(_)
            | TokenKind::Symbol(_)
            | TokenKind::StringBegin(_)
            | TokenKind::Label(_)
            | TokenKind::Lambda
            | TokenKind::Bang
            | TokenKind::Tilde => true,
            TokenKind::Keyword(kw) => matches!(
                kw,
                Keyword::Nil
                    | Keyword::True
                    | Keyword::False
                    | Keyword::SelfKw
                    | Keyword::File
                    | Keyword::Line
                    | Keyword::Encoding
                    | Keyword::Defined
                    | Keyword::Super
                    | Keyword::Yield
                    | Keyword::Def
                    | Keyword::Begin
                    | Keyword::Case
            ),
            TokenKind::LParen | TokenKind::LBracket => spaced,
            TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Star
            | TokenKind::Pow
            | TokenKind::Amp
            | TokenKind::ColonColon => {
                if !spaced {
                    return false;
                }
                let next = self.peek();
                !next.has_space_before()
                    && !next.flags.contains(TokenFlags::NEWLINE_BEFORE)
                    && !next.kind.is_terminator()
                    && next.kind != TokenKind::Eof
            }
            _ => false,
        }
    }

    /// The token ends an argument list of kind `end`.
    fn at_args_end(&self, end: ArgsEnd) -> bool {
        match end.closer() {
            Some((closer, _)) => self.check(&closer) || self.check(&TokenKind::Eof),
            None => !self.at_expr_start() && !self.check(&TokenKind::Star),
        }
    }

    /// Arguments up to and including the closer of `end`.
    ///
    /// `key: value` and `key => value` pairs are collected into a hash
    /// without braces. `&blk` ends the list.
    pub(crate) fn parse_args(&mut self, end: ArgsEnd) -> Result<Vec<Node>, ParseError> {
        let bracketed = end != ArgsEnd::Command;
        let mut args = Vec::new();
        let mut pairs: Vec<Node> = Vec::new();
        if bracketed {
            self.skip_newlines();
        }
        while !(bracketed && self.at_args_end(end)) {
            match self.kind().clone() {
                TokenKind::Amp => {
                    let amp = self.advance().span;
                    let value = if self.at_args_end(end) || self.check(&TokenKind::Comma) {
                        None
                    } else {
                        Some(self.parse_arg()?)
                    };
                    let span = value.as_ref().map_or(amp, |v| amp.merge(v.span));
                    flush_pairs(&mut args, &mut pairs);
                    args.push(Node::new(NodeKind::BlockPass(value.map(Node::boxed)), span));
                    break;
                }
                TokenKind::Pow => {
                    let star = self.advance().span;
                    let value = if self.at_args_end(end) || self.check(&TokenKind::Comma) {
                        None
                    } else {
                        Some(self.parse_arg()?)
                    };
                    let span = value.as_ref().map_or(star, |v| star.merge(v.span));
                    pairs.push(Node::new(NodeKind::DoubleSplat(value.map(Node::boxed)), span));
                }
                TokenKind::Star => {
                    let star = self.advance().span;
                    let value = if self.at_args_end(end) || self.check(&TokenKind::Comma) {
                        None
                    } else {
                        Some(self.parse_arg()?)
                    };
                    let span = value.as_ref().map_or(star, |v| star.merge(v.span));
                    flush_pairs(&mut args, &mut pairs);
                    args.push(Node::new(NodeKind::Splat(value.map(Node::boxed)), span));
                }
                TokenKind::DotDotDot if end == ArgsEnd::Paren => {
                    // `foo(...)` passes the caller's arguments and block on.
                    let span = self.advance().span;
                    flush_pairs(&mut args, &mut pairs);
                    args.push(Node::new(NodeKind::Splat(None), span));
                    args.push(Node::new(NodeKind::BlockPass(None), span));
                    break;
                }
                TokenKind::Label(name) => {
                    let key_span = self.advance().span;
                    let key = Node::new(NodeKind::Sym(name.clone()), key_span);
                    let value = if self.check(&TokenKind::Comma) || self.at_label_value_end(end) {
                        self.shorthand_value(name, key_span)
                    } else {
                        self.skip_newlines();
                        self.parse_arg()?
                    };
                    pairs.push(pair_node(key, value));
                }
                TokenKind::StringBegin(_) => {
                    let (node, label) = self.parse_string()?;
                    if label {
                        self.skip_newlines();
                        let value = self.parse_arg()?;
                        pairs.push(pair_node(node, value));
                    } else {
                        let arg = self.parse_arg_from(Some(node))?;
                        self.push_arg(arg, &mut args, &mut pairs)?;
                    }
                }
                _ => {
                    let arg = self.parse_arg()?;
                    self.push_arg(arg, &mut args, &mut pairs)?;
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if bracketed {
                self.skip_newlines();
            }
        }
        flush_pairs(&mut args, &mut pairs);
        if let Some((closer, expecting)) = end.closer() {
            self.skip_newlines();
            self.expect(&closer, expecting)
                .map_err(|e| e.with_context(ErrorContext::Args))?;
        }
        Ok(args)
    }

    fn push_arg(
        &mut self,
        arg: Node,
        args: &mut Vec<Node>,
        pairs: &mut Vec<Node>,
    ) -> Result<(), ParseError> {
        if self.eat(&TokenKind::Arrow) {
            self.skip_newlines();
            let value = self.parse_arg()?;
            pairs.push(pair_node(arg, value));
        } else {
            flush_pairs(args, pairs);
            args.push(arg);
        }
        Ok(())
    }

    fn at_label_value_end(&self, end: ArgsEnd) -> bool {
        match end.closer() {
            Some((closer, _)) => self.check(&closer) || self.check(&TokenKind::Newline),
            None => !self.at_expr_start(),
        }
    }

    /// Value of `key:` with the value left out: the local or method `key`.
    pub(crate) fn shorthand_value(&mut self, name: Name, span: Span) -> Node {
        if self.scopes.is_local(name.as_str()) {
            self.scopes.mark_used(name.as_str());
            Node::new(NodeKind::LocalVar(name), span)
        } else {
            variable_call(None, name, span, CallOp::None)
        }
    }

    /// `name(args)` with the current token on `(`.
    pub(crate) fn parse_paren_call(
        &mut self,
        receiver: Option<Node>,
        name: Name,
        name_span: Span,
        op: CallOp,
    ) -> Result<Node, ParseError> {
        self.advance();
        let args = self.with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
            p.parse_args(ArgsEnd::Paren)
        })?;
        let start = receiver.as_ref().map_or(name_span, |r| r.span);
        let span = start.merge(self.prev_span());
        Ok(call_node(receiver, name, args, op, CallForm::Parens, span))
    }

    /// `name arg, arg` with the current token on the first argument.
    pub(crate) fn parse_command_call(
        &mut self,
        receiver: Option<Node>,
        name: Name,
        name_span: Span,
        op: CallOp,
    ) -> Result<Node, ParseError> {
        let args = self.with_context(ParseContext::NO_DO_BLOCK, ParseContext::NONE, |p| {
            p.parse_args(ArgsEnd::Command)
        })?;
        let start = receiver.as_ref().map_or(name_span, |r| r.span);
        let span = start.merge(self.prev_span());
        let paren_arg = args
            .last()
            .is_some_and(|a| matches!(a.kind, NodeKind::Parens(_)));
        let mut node = call_node(receiver, name, args, op, CallForm::Command, span);
        // `foo (x) { ... }` gives the block to `foo`.
        let block = if paren_arg && self.check(&TokenKind::LBrace) {
            Some(self.parse_brace_block()?)
        } else if self.check_kw(Keyword::Do) && self.context.allows_do_block() {
            Some(self.parse_do_block()?)
        } else {
            None
        };
        match block {
            Some(block) => {
                self.attach_block(&mut node, block);
                self.parse_postfix(node)
            }
            None => Ok(node),
        }
    }

    /// Method calls, `::` lookups, indexing and blocks after `node`.
    pub(crate) fn parse_postfix(&mut self, mut node: Node) -> Result<Node, ParseError> {
        loop {
            node = match self.kind() {
                TokenKind::Dot | TokenKind::AndDot => self.parse_method_call(node)?,
                TokenKind::ColonColon => self.parse_scoped(node)?,
                TokenKind::LBracket => self.parse_index(node)?,
                TokenKind::LBrace if takes_block(&node) => {
                    let block = self.parse_brace_block()?;
                    self.attach_block(&mut node, block);
                    node
                }
                TokenKind::Keyword(Keyword::Do)
                    if takes_block(&node) && self.context.allows_do_block() =>
                {
                    let block = self.parse_do_block()?;
                    self.attach_block(&mut node, block);
                    node
                }
                _ => return Ok(node),
            };
        }
    }

    /// `recv.name`, `recv&.name`, `recv.()`.
    fn parse_method_call(&mut self, receiver: Node) -> Result<Node, ParseError> {
        let op = if self.advance().kind == TokenKind::AndDot {
            CallOp::SafeNav
        } else {
            CallOp::Dot
        };
        self.skip_newlines();
        let name_span = self.span();
        if self.check(&TokenKind::LParen) {
            return self.parse_paren_call(Some(receiver), Name::new("call"), name_span, op);
        }
        let name = match self.kind() {
            TokenKind::Ident(name) | TokenKind::Const(name) => name.clone(),
            TokenKind::Keyword(kw) => Name::new(kw.as_str()),
            kind => match kind.punct_str() {
                Some(text) => Name::new(text),
                None => return Err(self.unexpected(Some("method name"))),
            },
        };
        self.advance();
        self.call_after_name(Some(receiver), name, name_span, op)
    }

    /// Arguments, if any, after a method name with a receiver.
    fn call_after_name(
        &mut self,
        receiver: Option<Node>,
        name: Name,
        name_span: Span,
        op: CallOp,
    ) -> Result<Node, ParseError> {
        if self.check(&TokenKind::LParen) && !self.current().has_space_before() {
            return self.parse_paren_call(receiver, name, name_span, op);
        }
        if self.at_command_arg_start() {
            return self.parse_command_call(receiver, name, name_span, op);
        }
        Ok(variable_call(receiver, name, name_span, op))
    }

    /// `Scope::Const` or `scope::method`.
    fn parse_scoped(&mut self, scope: Node) -> Result<Node, ParseError> {
        self.advance();
        let name_span = self.span();
        match self.kind().clone() {
            TokenKind::Const(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) && !self.current().has_space_before() {
                    return self.parse_paren_call(Some(scope), name, name_span, CallOp::Colon2);
                }
                let span = scope.span.merge(name_span);
                Ok(Node::new(
                    NodeKind::Colon2 {
                        scope: scope.boxed(),
                        name,
                    },
                    span,
                ))
            }
            TokenKind::Ident(name) => {
                self.advance();
                self.call_after_name(Some(scope), name, name_span, CallOp::Colon2)
            }
            _ => Err(self.unexpected(Some("constant"))),
        }
    }

    /// `recv[args]`.
    fn parse_index(&mut self, receiver: Node) -> Result<Node, ParseError> {
        self.advance();
        let args = self.with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
            p.parse_args(ArgsEnd::Bracket)
        })?;
        let span = receiver.span.merge(self.prev_span());
        Ok(call_node(
            Some(receiver),
            Name::new("[]"),
            args,
            CallOp::None,
            CallForm::Index,
            span,
        ))
    }

    /// Give `block` to the call `node`.
    pub(crate) fn attach_block(&mut self, node: &mut Node, block: Node) {
        let span = node.span.merge(block.span);
        let had_pass = match &node.kind {
            NodeKind::Call(call) => call.block.as_ref(),
            NodeKind::Super { block, .. } => block.as_deref(),
            _ => return,
        }
        .is_some_and(|b| matches!(b.kind, NodeKind::BlockPass(_)));
        if had_pass {
            self.report(ParseError::new(
                ErrorCode::E1009,
                "both block arg and actual block given",
                block.span,
            ));
        }
        match &mut node.kind {
            NodeKind::Call(call) => {
                if call.form == CallForm::Variable {
                    call.form = CallForm::Parens;
                }
                call.block = Some(block);
            }
            NodeKind::Super { block: slot, .. } => *slot = Some(block.boxed()),
            _ => {}
        }
        node.span = span;
    }

    // === Blocks ===

    /// Run `f` in a new local scope with `add`/`remove` applied to the
    /// context. Unused locals of the scope are warned about on exit.
    pub(crate) fn in_scope<T>(
        &mut self,
        kind: ScopeKind,
        add: ParseContext,
        remove: ParseContext,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let hard = kind != ScopeKind::Block;
        self.scopes.push(kind);
        let saved_mode = self.shareable;
        let outer_jumps = hard.then(|| std::mem::take(&mut self.pending_jumps));
        let result = self.with_context(add, remove, f);
        if let Some(outer) = outer_jumps {
            self.flush_pending_jumps(outer);
            self.shareable = saved_mode;
        }
        for (name, span) in self.scopes.pop() {
            self.warn(
                ParseWarning::UnusedVariable {
                    name: name.as_str().to_string(),
                },
                span,
            );
        }
        result
    }

    /// `{ |params| stmts }`
    pub(crate) fn parse_brace_block(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let block = self.in_scope(
            ScopeKind::Block,
            ParseContext::IN_BLOCK,
            ParseContext::NO_DO_BLOCK.union(ParseContext::IN_RESCUE),
            |p| -> Result<BlockLiteral, ParseError> {
                let params = p.parse_block_params_opt()?;
                let body = p.parse_stmts(Closers::RBRACE);
                p.expect(&TokenKind::RBrace, "'}'")?;
                Ok(BlockLiteral {
                    params,
                    body: seq(body),
                    brace: true,
                })
            },
        );
        let block = block.map_err(|e| e.with_context(ErrorContext::Block))?;
        Ok(Node::new(
            NodeKind::Block(Box::new(block)),
            start.merge(self.prev_span()),
        ))
    }

    /// `do |params| body end`
    pub(crate) fn parse_do_block(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let block = self.in_scope(
            ScopeKind::Block,
            ParseContext::IN_BLOCK,
            ParseContext::NO_DO_BLOCK.union(ParseContext::IN_RESCUE),
            |p| -> Result<BlockLiteral, ParseError> {
                let params = p.parse_block_params_opt()?;
                let body = p.parse_body_stmt()?;
                p.expect_kw(Keyword::End)?;
                Ok(BlockLiteral {
                    params,
                    body,
                    brace: false,
                })
            },
        );
        let block = block.map_err(|e| e.with_context(ErrorContext::Block))?;
        Ok(Node::new(
            NodeKind::Block(Box::new(block)),
            start.merge(self.prev_span()),
        ))
    }

    /// `|a, b|`, `||` or nothing.
    fn parse_block_params_opt(&mut self) -> Result<Option<Params>, ParseError> {
        match self.kind() {
            TokenKind::OrOr => {
                let span = self.advance().span;
                Ok(Some(Params {
                    span,
                    ..Params::default()
                }))
            }
            TokenKind::Pipe => {
                let start = self.advance().span;
                let mut params = self.parse_param_list(ParamList::Block)?;
                let end = self.expect(&TokenKind::Pipe, "'|'")?.span;
                params.span = start.merge(end);
                Ok(Some(params))
            }
            _ => Ok(None),
        }
    }
}

pub(crate) fn pair_node(key: Node, value: Node) -> Node {
    let span = key.span.merge(value.span);
    Node::new(
        NodeKind::Pair {
            key: key.boxed(),
            value: value.boxed(),
        },
        span,
    )
}

/// Close a run of pairs as one braceless hash argument.
fn flush_pairs(args: &mut Vec<Node>, pairs: &mut Vec<Node>) {
    if pairs.is_empty() {
        return;
    }
    let pairs = std::mem::take(pairs);
    let span = pairs[0].span.merge(pairs[pairs.len() - 1].span);
    args.push(Node::new(NodeKind::Hash(pairs), span));
}
