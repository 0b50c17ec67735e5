//! Conditionals, loops, `case`, `begin`/`rescue` and jumps.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{BeginBody, Keyword, Node, NodeKind, Span, TokenKind};
use tracing::debug;

use super::{boxed, seq, seq_or_empty, ArgsEnd};
use crate::context::ParseContext;
use crate::recovery::Closers;
use crate::{ErrorContext, ParseError, Parser};

impl Parser<'_> {
    /// Condition of `if`/`while` and friends, checked for literals.
    fn parse_cond(&mut self, no_do: bool) -> Result<Node, ParseError> {
        let add = if no_do {
            ParseContext::IN_COND.union(ParseContext::NO_DO_BLOCK)
        } else {
            ParseContext::IN_COND
        };
        let cond = self.with_context(add, ParseContext::NONE, Self::parse_expr_stmt)?;
        Ok(self.cond(cond))
    }

    /// `then`, or a line break optionally followed by `then`.
    fn parse_then(&mut self) -> Result<(), ParseError> {
        if self.kind().is_terminator() {
            self.skip_terminators();
            self.eat_kw(Keyword::Then);
            return Ok(());
        }
        if self.eat_kw(Keyword::Then) {
            return Ok(());
        }
        Err(self.unexpected(Some("'then' or ';' or '\\n'")))
    }

    /// `do`, or a line break, after a loop header.
    fn parse_do_term(&mut self) -> Result<(), ParseError> {
        if self.kind().is_terminator() {
            self.skip_terminators();
            return Ok(());
        }
        if self.eat_kw(Keyword::Do) {
            return Ok(());
        }
        Err(self.unexpected(Some("'do' or ';' or '\\n'")))
    }

    /// Run `f`, tagging its error with the construct being parsed.
    pub(crate) fn within<T>(
        &mut self,
        context: ErrorContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        f(self).map_err(|e| e.with_context(context))
    }

    pub(crate) fn parse_if(&mut self, unless: bool) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::If, |p: &mut Self| p.parse_if_tail(start, unless))
    }

    fn parse_if_tail(&mut self, start: Span, unless: bool) -> Result<Node, ParseError> {
        let cond = self.parse_cond(false)?;
        self.parse_then()?;
        let closers = if unless {
            Closers::END.union(Closers::ELSE)
        } else {
            Closers::BRANCH
        };
        let body = seq(self.parse_stmts(closers));
        let other = self.parse_else_chain()?;
        self.expect_kw(Keyword::End)?;
        let (then_branch, else_branch) = if unless { (other, body) } else { (body, other) };
        Ok(Node::new(
            NodeKind::If {
                cond: cond.boxed(),
                then_branch: boxed(then_branch),
                else_branch: boxed(else_branch),
            },
            start.merge(self.prev_span()),
        ))
    }

    /// `elsif ...` or `else ...` up to, not including, `end`.
    fn parse_else_chain(&mut self) -> Result<Option<Node>, ParseError> {
        if self.check_kw(Keyword::Elsif) {
            let start = self.advance().span;
            let cond = self.parse_cond(false)?;
            self.parse_then()?;
            let body = seq(self.parse_stmts(Closers::BRANCH));
            let other = self.parse_else_chain()?;
            return Ok(Some(Node::new(
                NodeKind::If {
                    cond: cond.boxed(),
                    then_branch: boxed(body),
                    else_branch: boxed(other),
                },
                start.merge(self.prev_span()),
            )));
        }
        if self.check_kw(Keyword::Else) {
            let at = self.advance().span;
            let stmts = self.parse_stmts(Closers::END);
            return Ok(Some(seq_or_empty(stmts, at)));
        }
        Ok(None)
    }

    pub(crate) fn parse_while(&mut self, until: bool) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::Loop, |p: &mut Self| {
            let cond = p.parse_cond(true)?;
            p.parse_do_term()?;
            let body = p.with_context(ParseContext::IN_LOOP, ParseContext::NONE, |p| {
                p.parse_stmts(Closers::END)
            });
            p.expect_kw(Keyword::End)?;
            Ok(Node::new(
                NodeKind::While {
                    cond: cond.boxed(),
                    body: boxed(seq(body)),
                    until,
                    do_while: false,
                },
                start.merge(p.prev_span()),
            ))
        })
    }

    pub(crate) fn parse_for(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::Loop, |p: &mut Self| {
            let mut targets = Vec::new();
            loop {
                let item = p.parse_mlhs_item()?;
                targets.extend(p.mlhs_target(item));
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            let var = match targets.len() {
                1 if !matches!(targets[0].kind, NodeKind::Splat(_)) => targets.remove(0),
                _ => {
                    let span = targets
                        .first()
                        .map_or(start, |t| t.span.merge(p.prev_span()));
                    Node::new(NodeKind::MlhsGroup(targets), span)
                }
            };
            p.expect_kw(Keyword::In)?;
            let iter = p.with_context(
                ParseContext::NO_DO_BLOCK,
                ParseContext::NONE,
                Self::parse_expr_stmt,
            )?;
            p.parse_do_term()?;
            let body = p.with_context(ParseContext::IN_LOOP, ParseContext::NONE, |p| {
                p.parse_stmts(Closers::END)
            });
            p.expect_kw(Keyword::End)?;
            Ok(Node::new(
                NodeKind::For {
                    var: var.boxed(),
                    iter: iter.boxed(),
                    body: boxed(seq(body)),
                },
                start.merge(p.prev_span()),
            ))
        })
    }

    pub(crate) fn parse_case(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::Case, |p: &mut Self| {
            let subject = if p.kind().is_terminator() {
                None
            } else {
                Some(p.parse_expr_stmt()?)
            };
            p.skip_terminators();
            let mut whens = Vec::new();
            while p.check_kw(Keyword::When) {
                let when_start = p.advance().span;
                let mut conds = Vec::new();
                loop {
                    conds.push(p.parse_arg_or_splat()?);
                    if !p.eat(&TokenKind::Comma) {
                        break;
                    }
                    p.skip_newlines();
                }
                p.parse_then()?;
                let body = seq(p.parse_stmts(Closers::WHEN_BODY));
                whens.push(Node::new(
                    NodeKind::When {
                        conds,
                        body: boxed(body),
                    },
                    when_start.merge(p.prev_span()),
                ));
            }
            if whens.is_empty() {
                return Err(p.unexpected(Some("'when'")));
            }
            let else_branch = if p.check_kw(Keyword::Else) {
                let at = p.advance().span;
                Some(seq_or_empty(p.parse_stmts(Closers::END), at))
            } else {
                None
            };
            p.expect_kw(Keyword::End)?;
            Ok(Node::new(
                NodeKind::Case {
                    subject: boxed(subject),
                    whens,
                    else_branch: boxed(else_branch),
                },
                start.merge(p.prev_span()),
            ))
        })
    }

    /// `begin ... end`, always kept as a node.
    pub(crate) fn parse_begin(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::Begin, |p: &mut Self| {
            let body = p.parse_begin_body(true)?;
            p.expect_kw(Keyword::End)?;
            Ok(Node::new(
                NodeKind::Begin(Box::new(body)),
                start.merge(p.prev_span()),
            ))
        })
    }

    /// Body of `def`, `class`, `module` or a `do` block. Becomes a `Begin`
    /// only when it has `rescue`, `else` or `ensure` clauses.
    pub(crate) fn parse_body_stmt(&mut self) -> Result<Option<Node>, ParseError> {
        let start = self.span();
        let body = self.parse_begin_body(false)?;
        if !body.has_handlers() {
            return Ok(body.body);
        }
        Ok(Some(Node::new(
            NodeKind::Begin(Box::new(body)),
            start.merge(self.prev_span()),
        )))
    }

    /// Statements with optional `rescue`, `else` and `ensure` clauses.
    fn parse_begin_body(&mut self, explicit: bool) -> Result<BeginBody, ParseError> {
        let body = seq(self.parse_stmts(Closers::BODY));
        let mut rescues = Vec::new();
        while self.check_kw(Keyword::Rescue) {
            rescues.push(self.parse_rescue_clause()?);
        }
        let mut else_branch = None;
        if self.check_kw(Keyword::Else) {
            let at = self.advance().span;
            if rescues.is_empty() {
                self.report(ParseError::new(
                    ErrorCode::E1008,
                    "else without rescue is useless",
                    at,
                ));
            }
            let stmts = self.parse_stmts(Closers::END.union(Closers::ENSURE));
            else_branch = Some(seq_or_empty(stmts, at));
        }
        let mut ensure = None;
        if self.check_kw(Keyword::Ensure) {
            let at = self.advance().span;
            let stmts = self.parse_stmts(Closers::END);
            // The value of an ensure clause is always discarded.
            if let Some(last) = stmts.last() {
                self.warn_useless(std::slice::from_ref(last));
            }
            ensure = Some(seq_or_empty(stmts, at));
        }
        Ok(BeginBody {
            body,
            rescues,
            else_branch,
            ensure,
            explicit,
        })
    }

    /// `rescue A, B => e then body`.
    fn parse_rescue_clause(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let mut exceptions = Vec::new();
        while !self.kind().is_terminator()
            && !self.check(&TokenKind::Arrow)
            && !self.check_kw(Keyword::Then)
        {
            exceptions.push(self.parse_arg_or_splat()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        let var = if self.eat(&TokenKind::Arrow) {
            let target = self.parse_mlhs_item()?;
            self.assignable(target).map(Node::boxed)
        } else {
            None
        };
        self.parse_then()?;
        let body = self.with_context(ParseContext::IN_RESCUE, ParseContext::NONE, |p| {
            p.parse_stmts(Closers::BODY)
        });
        Ok(Node::new(
            NodeKind::RescueClause {
                exceptions,
                var,
                body: boxed(seq(body)),
            },
            start.merge(self.prev_span()),
        ))
    }

    // === Jumps ===

    /// `return`, `break` or `next`, with an optional value.
    pub(crate) fn parse_jump(&mut self, kw: Keyword) -> Result<Node, ParseError> {
        let span = self.advance().span;
        let value = self.parse_jump_value()?;
        match kw {
            Keyword::Return if self.context.return_in_class_body() => {
                self.report(ParseError::new(
                    ErrorCode::E1010,
                    "Invalid return in class/module body",
                    span,
                ));
            }
            Keyword::Break | Keyword::Next => self.check_loop_jump(span, kw.as_str()),
            _ => {}
        }
        let full = value.as_ref().map_or(span, |v| span.merge(v.span));
        let value = boxed(value);
        let kind = match kw {
            Keyword::Return => NodeKind::Return(value),
            Keyword::Break => NodeKind::Break(value),
            _ => NodeKind::Next(value),
        };
        Ok(Node::new(kind, full))
    }

    pub(crate) fn parse_redo(&mut self) -> Result<Node, ParseError> {
        let span = self.advance().span;
        self.check_loop_jump(span, "redo");
        Ok(Node::new(NodeKind::Redo, span))
    }

    pub(crate) fn parse_retry(&mut self) -> Result<Node, ParseError> {
        let span = self.advance().span;
        if !self.context.allows_retry() {
            self.report(ParseError::new(ErrorCode::E1010, "Invalid retry", span));
        }
        Ok(Node::new(NodeKind::Retry, span))
    }

    /// A loop jump outside any loop or block is held back until the
    /// enclosing statement is known not to carry a loop modifier.
    fn check_loop_jump(&mut self, span: Span, keyword: &'static str) {
        if !self.context.allows_loop_jump() {
            debug!(keyword, offset = span.start, "jump held pending");
            self.pending_jumps.push((span, keyword));
        }
    }

    /// Forget held-back jumps inside `span`, which a loop modifier covers.
    pub(crate) fn release_jumps(&mut self, span: Span) {
        self.pending_jumps.retain(|(s, _)| !span.contains_span(*s));
    }

    pub(crate) fn parse_yield(&mut self) -> Result<Node, ParseError> {
        let span = self.advance().span;
        if !self.context.allows_yield() {
            self.report(ParseError::new(ErrorCode::E1010, "Invalid yield", span));
        }
        let args = if self.check(&TokenKind::LParen) && !self.current().has_space_before() {
            self.advance();
            self.with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
                p.parse_args(ArgsEnd::Paren)
            })?
        } else if self.at_command_arg_start() {
            self.parse_args(ArgsEnd::Command)?
        } else {
            Vec::new()
        };
        if let Some(pass) = args.iter().find(|a| matches!(a.kind, NodeKind::BlockPass(_))) {
            return Err(ParseError::new(
                ErrorCode::E1009,
                "block argument should not be given",
                pass.span,
            ));
        }
        Ok(Node::new(NodeKind::Yield(args), span.merge(self.prev_span())))
    }

    /// `super(args)`, `super args` or bare `super`, which forwards the
    /// method's own arguments.
    pub(crate) fn parse_super(&mut self) -> Result<Node, ParseError> {
        let span = self.advance().span;
        let mut args = if self.check(&TokenKind::LParen) && !self.current().has_space_before() {
            self.advance();
            Some(
                self.with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
                    p.parse_args(ArgsEnd::Paren)
                })?,
            )
        } else if self.at_command_arg_start() {
            Some(self.with_context(ParseContext::NO_DO_BLOCK, ParseContext::NONE, |p| {
                p.parse_args(ArgsEnd::Command)
            })?)
        } else {
            None
        };
        let block = match args.as_mut() {
            Some(list)
                if list
                    .last()
                    .is_some_and(|a| matches!(a.kind, NodeKind::BlockPass(_))) =>
            {
                list.pop().map(Node::boxed)
            }
            _ => None,
        };
        Ok(Node::new(
            NodeKind::Super { args, block },
            span.merge(self.prev_span()),
        ))
    }
}
