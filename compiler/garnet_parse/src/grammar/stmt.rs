//! Statements, statement sequences and multiple assignment.

use garnet_ir::{Keyword, Node, NodeFlags, NodeKind, Span, TokenKind};
use tracing::debug;

use crate::checks::assign::is_mlhs_item;
use crate::recovery::{Closers, Recovery};
use crate::stack::ensure_sufficient_stack;
use crate::{ParseError, Parser};

fn is_plain_assignment(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::LocalAsgn { value: Some(_), .. }
            | NodeKind::IVarAsgn { value: Some(_), .. }
            | NodeKind::CVarAsgn { value: Some(_), .. }
            | NodeKind::GVarAsgn { value: Some(_), .. }
            | NodeKind::ConstAsgn { value: Some(_), .. }
    )
}

impl Parser<'_> {
    /// Statements up to one of `closers`, which is left unconsumed.
    ///
    /// A statement that fails is reported and skipped; the loop then
    /// resumes at the next statement boundary.
    pub(crate) fn parse_stmts(&mut self, closers: Closers) -> Vec<Node> {
        let mut stmts = Vec::new();
        loop {
            self.skip_terminators();
            if closers.matches(self.kind()) {
                break;
            }
            let err = match self.parse_stmt() {
                Ok(stmt) => {
                    stmts.push(stmt);
                    if self.kind().is_terminator() || closers.matches(self.kind()) {
                        continue;
                    }
                    self.unexpected(Some(closers.expecting()))
                }
                Err(err) => err,
            };
            self.report(err);
            if self.synchronize(closers) == Recovery::Stop {
                break;
            }
        }
        if let Some((_, init)) = stmts.split_last() {
            self.warn_useless(init);
        }
        stmts
    }

    /// One statement with any trailing modifiers.
    pub(crate) fn parse_stmt(&mut self) -> Result<Node, ParseError> {
        ensure_sufficient_stack(|| self.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> Result<Node, ParseError> {
        debug!(offset = self.span().start, token = %self.kind(), "statement");
        let mut node = match self.kind() {
            TokenKind::Keyword(Keyword::Alias) => self.parse_alias()?,
            TokenKind::Keyword(Keyword::Undef) => self.parse_undef()?,
            TokenKind::Keyword(Keyword::BeginUpper) => self.parse_pre_exe()?,
            TokenKind::Keyword(Keyword::EndUpper) => self.parse_post_exe()?,
            _ => self.parse_expr_stmt()?,
        };
        loop {
            let TokenKind::Keyword(kw) = self.kind() else {
                break;
            };
            let kw = *kw;
            node = match kw {
                Keyword::If | Keyword::Unless => {
                    self.advance();
                    let cond = self.parse_expr_stmt()?;
                    let cond = self.cond(cond);
                    let span = node.span.merge(cond.span);
                    let (then_branch, else_branch) = if kw == Keyword::If {
                        (Some(node.boxed()), None)
                    } else {
                        (None, Some(node.boxed()))
                    };
                    Node::new(
                        NodeKind::If {
                            cond: cond.boxed(),
                            then_branch,
                            else_branch,
                        },
                        span,
                    )
                }
                Keyword::While | Keyword::Until => {
                    self.advance();
                    let cond = self.parse_expr_stmt()?;
                    let cond = self.cond(cond);
                    self.release_jumps(node.span);
                    let do_while = matches!(&node.kind, NodeKind::Begin(body) if body.explicit);
                    let span = node.span.merge(cond.span);
                    Node::new(
                        NodeKind::While {
                            cond: cond.boxed(),
                            body: Some(node.boxed()),
                            until: kw == Keyword::Until,
                            do_while,
                        },
                        span,
                    )
                }
                Keyword::Rescue => {
                    self.advance();
                    let rescue = self.parse_expr_stmt()?;
                    let span = node.span.merge(rescue.span);
                    Node::new(
                        NodeKind::RescueMod {
                            expr: node.boxed(),
                            rescue: rescue.boxed(),
                        },
                        span,
                    )
                }
                _ => break,
            };
        }
        Ok(node)
    }

    /// `expr`: `and`/`or` chains of `not` operands, or a multiple assignment.
    pub(crate) fn parse_expr_stmt(&mut self) -> Result<Node, ParseError> {
        let mut node = if self.check(&TokenKind::Star) {
            self.parse_masgn(None)?
        } else {
            let first = self.parse_not()?;
            if self.check(&TokenKind::Comma) && is_mlhs_item(&first) {
                self.parse_masgn(Some(first))?
            } else if self.check(&TokenKind::Comma) && is_plain_assignment(&first) {
                self.extend_rhs(first)?
            } else {
                first
            }
        };
        loop {
            let is_and = if self.check_kw(Keyword::And) {
                true
            } else if self.check_kw(Keyword::Or) {
                false
            } else {
                break;
            };
            self.advance();
            self.skip_newlines();
            let rhs = self.parse_not()?;
            let span = node.span.merge(rhs.span);
            let kind = if is_and {
                NodeKind::And(node.boxed(), rhs.boxed())
            } else {
                NodeKind::Or(node.boxed(), rhs.boxed())
            };
            node = Node::new(kind, span);
        }
        Ok(node)
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if !self.check_kw(Keyword::Not) {
            return self.parse_arg();
        }
        let start = self.advance().span;
        let operand = self.parse_not()?;
        let span = start.merge(operand.span);
        Ok(Node::new(NodeKind::Not(operand.boxed()), span))
    }

    /// `a, *b, (c, d) = value`. `first` is an already parsed target.
    fn parse_masgn(&mut self, first: Option<Node>) -> Result<Node, ParseError> {
        let start = first.as_ref().map_or_else(|| self.span(), |n| n.span);
        let first = match first {
            Some(node) => node,
            None => self.parse_mlhs_item()?,
        };
        let mut targets: Vec<Node> = self.mlhs_target(first).into_iter().collect();
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::Assign) {
                break;
            }
            let item = self.parse_mlhs_item()?;
            targets.extend(self.mlhs_target(item));
        }
        self.expect(&TokenKind::Assign, "'='")?;
        let mut value = self.parse_mrhs()?;
        self.check_value(&mut value);
        let span = start.merge(value.span);
        Ok(Node::new(
            NodeKind::MultiAsgn {
                targets,
                value: value.boxed(),
            },
            span,
        ))
    }

    /// One target of a multiple assignment, before conversion.
    pub(crate) fn parse_mlhs_item(&mut self) -> Result<Node, ParseError> {
        match self.kind() {
            TokenKind::Star => {
                let star = self.advance().span;
                if matches!(
                    self.kind(),
                    TokenKind::Comma
                        | TokenKind::Assign
                        | TokenKind::RParen
                        | TokenKind::Pipe
                        | TokenKind::Keyword(Keyword::In)
                ) {
                    return Ok(Node::new(NodeKind::Splat(None), star));
                }
                let inner = self.parse_primary_postfix()?;
                let span = star.merge(inner.span);
                Ok(Node::new(NodeKind::Splat(Some(inner.boxed())), span))
            }
            TokenKind::LParen => {
                let open = self.advance().span;
                let mut items = Vec::new();
                loop {
                    let item = self.parse_mlhs_item()?;
                    items.extend(self.mlhs_target(item));
                    if !self.eat(&TokenKind::Comma) || self.check(&TokenKind::RParen) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(Node::new(
                    NodeKind::MlhsGroup(items),
                    open.merge(self.prev_span()),
                ))
            }
            _ => self.parse_primary_postfix(),
        }
    }

    /// Right side of a multiple assignment; several values form an array.
    fn parse_mrhs(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_arg_or_splat()?;
        if !self.check(&TokenKind::Comma) && !matches!(first.kind, NodeKind::Splat(_)) {
            return self.rescue_modifier(first);
        }
        let mut elems = vec![first];
        while self.eat(&TokenKind::Comma) {
            elems.push(self.parse_arg_or_splat()?);
        }
        let span = elems[0].span.merge(self.prev_span());
        Ok(Node::new(NodeKind::Array(elems), span))
    }

    pub(crate) fn parse_arg_or_splat(&mut self) -> Result<Node, ParseError> {
        if !self.check(&TokenKind::Star) {
            return self.parse_arg();
        }
        let star = self.advance().span;
        let inner = self.parse_arg()?;
        let span = star.merge(inner.span);
        Ok(Node::new(NodeKind::Splat(Some(inner.boxed())), span))
    }

    /// `a = 1, 2` assigns an array.
    fn extend_rhs(&mut self, mut node: Node) -> Result<Node, ParseError> {
        let (NodeKind::LocalAsgn {
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
        }) = &mut node.kind
        else {
            return Ok(node);
        };
        let first = std::mem::replace(
            value.as_mut(),
            Node::new(NodeKind::Nil, Span::DUMMY),
        );
        let mut reported = first.flags.contains(NodeFlags::VOID_REPORTED);
        let mut elems = vec![first];
        while self.eat(&TokenKind::Comma) {
            let mut elem = self.parse_arg_or_splat()?;
            if !reported {
                reported = self.check_value(&mut elem);
            }
            elems.push(elem);
        }
        let span = elems[0].span.merge(self.prev_span());
        **value = Node::new(NodeKind::Array(elems), span);
        node.span = node.span.merge(span);
        Ok(node)
    }
}
