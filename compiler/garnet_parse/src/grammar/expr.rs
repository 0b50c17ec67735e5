//! Assignment, ternary, range and operator expressions.

use garnet_ir::{
    AssignOp, Call, CallForm, CallOp, Keyword, Name, Node, NodeKind, Span, Token, TokenKind,
};

use crate::checks::assign::{is_assignable_shape, named_captures};
use crate::shareable;
use crate::stack::ensure_sufficient_stack;
use crate::{ParseError, ParseWarning, Parser};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// Lowest binary operator level; `min_prec` of a full operand.
const LOWEST: u8 = 1;
/// `**`, which binds tighter than unary minus.
const POW: u8 = 11;

/// Binding power of a binary operator.
fn binary_op(kind: &TokenKind) -> Option<(u8, Assoc)> {
    Some(match kind {
        TokenKind::OrOr => (1, Assoc::Left),
        TokenKind::AndAnd => (2, Assoc::Left),
        TokenKind::EqEq
        | TokenKind::NotEq
        | TokenKind::EqEqEq
        | TokenKind::Match
        | TokenKind::NotMatch
        | TokenKind::Cmp => (3, Assoc::NonAssoc),
        TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => (4, Assoc::Left),
        TokenKind::Pipe | TokenKind::Caret => (5, Assoc::Left),
        TokenKind::Amp => (6, Assoc::Left),
        TokenKind::Shl | TokenKind::Shr => (7, Assoc::Left),
        TokenKind::Plus | TokenKind::Minus => (8, Assoc::Left),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => (9, Assoc::Left),
        TokenKind::Pow => (POW, Assoc::Right),
        _ => return None,
    })
}

fn is_comparison(method: &str) -> bool {
    matches!(method, "<" | "<=" | ">" | ">=")
}

/// Flip the sign of the numeric literal at the head of a method chain
/// (`-1.abs` is `(-1).abs`). Operator calls are not looked through.
fn negate_leading_literal(node: &mut Node) -> bool {
    match &mut node.kind {
        NodeKind::Number(lit) => {
            **lit = lit.negated();
            true
        }
        NodeKind::Call(call) if call.form != CallForm::Operator => {
            call.receiver.as_mut().is_some_and(negate_leading_literal)
        }
        _ => false,
    }
}

pub(crate) fn operator_call(receiver: Node, method: &str, args: Vec<Node>, span: Span) -> Node {
    Node::new(
        NodeKind::Call(Box::new(Call {
            receiver: Some(receiver),
            method: Name::new(method),
            args,
            block: None,
            op: CallOp::None,
            form: CallForm::Operator,
        })),
        span,
    )
}

impl Parser<'_> {
    /// `arg`: an assignment or an operator expression.
    pub(crate) fn parse_arg(&mut self) -> Result<Node, ParseError> {
        ensure_sufficient_stack(|| self.parse_arg_from(None))
    }

    /// [`Parser::parse_arg`] with the leading primary already parsed.
    pub(crate) fn parse_arg_from(&mut self, primary: Option<Node>) -> Result<Node, ParseError> {
        let lhs = self.parse_ternary(primary)?;
        match self.kind() {
            TokenKind::Assign => self.parse_assignment(lhs),
            TokenKind::OpAssign(op) => {
                let op = *op;
                self.parse_op_assignment(lhs, op)
            }
            _ => Ok(lhs),
        }
    }

    /// Right side of `=`; a `rescue` modifier here guards only the value.
    pub(crate) fn parse_arg_rhs(&mut self) -> Result<Node, ParseError> {
        let value = self.parse_arg()?;
        self.rescue_modifier(value)
    }

    pub(crate) fn rescue_modifier(&mut self, value: Node) -> Result<Node, ParseError> {
        if !self.check_kw(Keyword::Rescue) {
            return Ok(value);
        }
        self.advance();
        let rescue = self.parse_arg()?;
        let span = value.span.merge(rescue.span);
        Ok(Node::new(
            NodeKind::RescueMod {
                expr: value.boxed(),
                rescue: rescue.boxed(),
            },
            span,
        ))
    }

    fn parse_assignment(&mut self, lhs: Node) -> Result<Node, ParseError> {
        if !is_assignable_shape(&lhs) {
            return Err(self.unexpected(None));
        }
        let mode = self.shareable;
        // Declares locals before the value is lexed.
        let target = self.assignable(lhs);
        self.advance();
        let mut value = self.parse_arg_rhs()?;
        self.check_value(&mut value);
        let Some(mut target) = target else {
            return Ok(value);
        };
        let span = target.span.merge(value.span);
        match &mut target.kind {
            NodeKind::LocalAsgn { name, value: slot } => {
                if let NodeKind::LocalAsgn { name: inner, .. } = &value.kind {
                    if inner == name {
                        self.scopes.mark_used(name.as_str());
                    }
                }
                *slot = Some(value.boxed());
            }
            NodeKind::IVarAsgn { value: slot, .. }
            | NodeKind::CVarAsgn { value: slot, .. }
            | NodeKind::GVarAsgn { value: slot, .. } => *slot = Some(value.boxed()),
            NodeKind::ConstAsgn {
                value: slot,
                shareable: tag,
                ..
            } => {
                *tag = shareable::tag(mode, &mut value);
                *slot = Some(value.boxed());
            }
            NodeKind::Call(call) => call.args.push(value),
            _ => {}
        }
        target.span = span;
        Ok(target)
    }

    fn parse_op_assignment(&mut self, lhs: Node, op: AssignOp) -> Result<Node, ParseError> {
        if !is_assignable_shape(&lhs) {
            return Err(self.unexpected(None));
        }
        let mode = self.shareable;
        let target = self.op_assignable(lhs);
        self.advance();
        let mut value = self.parse_arg_rhs()?;
        self.check_value(&mut value);
        let Some(mut target) = target else {
            return Ok(value);
        };
        if let NodeKind::ConstAsgn { shareable: tag, .. } = &mut target.kind {
            *tag = shareable::tag(mode, &mut value);
        }
        let span = target.span.merge(value.span);
        Ok(Node::new(
            NodeKind::OpAsgn {
                target: target.boxed(),
                op,
                value: value.boxed(),
            },
            span,
        ))
    }

    fn parse_ternary(&mut self, primary: Option<Node>) -> Result<Node, ParseError> {
        let cond = self.parse_range(primary)?;
        if !self.check(&TokenKind::Question) {
            return Ok(cond);
        }
        self.advance();
        self.skip_newlines();
        let then_branch = self.parse_arg()?;
        self.skip_newlines();
        self.expect(&TokenKind::Colon, "':'")?;
        self.skip_newlines();
        let else_branch = self.parse_arg()?;
        let cond = self.cond(cond);
        let span = cond.span.merge(else_branch.span);
        Ok(Node::new(
            NodeKind::If {
                cond: cond.boxed(),
                then_branch: Some(then_branch.boxed()),
                else_branch: Some(else_branch.boxed()),
            },
            span,
        ))
    }

    fn at_range_op(&self) -> bool {
        matches!(self.kind(), TokenKind::DotDot | TokenKind::DotDotDot)
    }

    fn parse_range(&mut self, primary: Option<Node>) -> Result<Node, ParseError> {
        let low = match primary {
            Some(primary) => Some(self.parse_binary(LOWEST, Some(primary))?),
            None if self.at_range_op() => None,
            None => Some(self.parse_binary(LOWEST, None)?),
        };
        if !self.at_range_op() {
            return low.ok_or_else(|| self.unexpected(None));
        }
        let op = self.advance();
        let exclusive = op.kind == TokenKind::DotDotDot;
        let high = if self.at_expr_start() {
            Some(self.parse_binary(LOWEST, None)?)
        } else {
            None
        };
        if low.is_none() && high.is_none() {
            return Err(ParseError::unexpected(&op.kind, op.span, None));
        }
        let start = low.as_ref().map_or(op.span, |n| n.span);
        let end = high.as_ref().map_or(op.span, |n| n.span);
        Ok(Node::new(
            NodeKind::Range {
                low: low.map(Node::boxed),
                high: high.map(Node::boxed),
                exclusive,
            },
            start.merge(end),
        ))
    }

    /// Precedence climbing over [`binary_op`].
    fn parse_binary(&mut self, min_prec: u8, primary: Option<Node>) -> Result<Node, ParseError> {
        let mut lhs = match primary {
            Some(primary) => self.parse_postfix(primary)?,
            None => self.parse_unary()?,
        };
        loop {
            let Some((prec, assoc)) = binary_op(self.kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let op = self.advance();
            self.skip_newlines();
            let next_min = if assoc == Assoc::Right { prec } else { prec + 1 };
            let rhs = self.parse_binary(next_min, None)?;
            let rhs = self.operand_assignment(rhs)?;
            lhs = self.binary_node(lhs, &op, rhs);
            if assoc == Assoc::NonAssoc
                && binary_op(self.kind()).is_some_and(|(next, _)| next == prec)
            {
                return Err(self.unexpected(None));
            }
        }
        Ok(lhs)
    }

    /// `1 + y = 2`: an assignable right operand followed by `=` or an
    /// operator-assignment takes the rest of the `arg` as its value.
    fn operand_assignment(&mut self, rhs: Node) -> Result<Node, ParseError> {
        if !is_assignable_shape(&rhs) {
            return Ok(rhs);
        }
        match self.kind() {
            TokenKind::Assign => self.parse_assignment(rhs),
            TokenKind::OpAssign(op) => {
                let op = *op;
                self.parse_op_assignment(rhs, op)
            }
            _ => Ok(rhs),
        }
    }

    fn binary_node(&mut self, lhs: Node, op: &Token, rhs: Node) -> Node {
        let span = lhs.span.merge(rhs.span);
        match op.kind {
            TokenKind::AndAnd => return Node::new(NodeKind::And(lhs.boxed(), rhs.boxed()), span),
            TokenKind::OrOr => return Node::new(NodeKind::Or(lhs.boxed(), rhs.boxed()), span),
            TokenKind::Match => {
                if let Some(names) = named_captures(&lhs) {
                    self.declare_captures(&names, lhs.span);
                    return Node::new(
                        NodeKind::MatchAsgn {
                            regexp: lhs.boxed(),
                            value: rhs.boxed(),
                            names,
                        },
                        span,
                    );
                }
            }
            _ => {}
        }
        let method = op.kind.punct_str().unwrap_or("?");
        if is_comparison(method)
            && lhs
                .as_call()
                .is_some_and(|c| c.form == CallForm::Operator && is_comparison(c.method.as_str()))
        {
            self.warn(ParseWarning::ComparisonAfterComparison { op: method }, op.span);
        }
        operator_call(lhs, method, vec![rhs], span)
    }

    /// Prefix operators.
    pub(crate) fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let start = self.span();
        match self.kind() {
            TokenKind::Minus | TokenKind::Plus => {
                let minus = self.advance().kind == TokenKind::Minus;
                let literal = matches!(self.kind(), TokenKind::Number(_))
                    && !self.current().has_space_before();
                let mut operand = self.parse_binary(POW, None)?;
                let span = start.merge(operand.span);
                if literal && !minus && matches!(operand.kind, NodeKind::Number(_)) {
                    operand.span = span;
                    return Ok(operand);
                }
                if literal && minus && negate_leading_literal(&mut operand) {
                    operand.span = span;
                    return Ok(operand);
                }
                let method = if minus { "-@" } else { "+@" };
                Ok(operator_call(operand, method, Vec::new(), span))
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(Node::new(NodeKind::Not(operand.boxed()), span))
            }
            TokenKind::Tilde => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(operator_call(operand, "~", Vec::new(), span))
            }
            TokenKind::Keyword(Keyword::Defined) => self.parse_defined(),
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(Node::new(NodeKind::Not(operand.boxed()), span))
            }
            _ => self.parse_primary_postfix(),
        }
    }

    /// `defined?(expr)` or `defined? expr`.
    fn parse_defined(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let operand = if self.check(&TokenKind::LParen) && !self.current().has_space_before() {
            self.advance();
            self.skip_newlines();
            let expr = self.parse_expr_stmt()?;
            self.skip_newlines();
            self.expect(&TokenKind::RParen, "')'")?;
            expr
        } else {
            self.parse_arg()?
        };
        let span = start.merge(self.prev_span());
        Ok(Node::new(NodeKind::Defined(operand.boxed()), span))
    }
}
