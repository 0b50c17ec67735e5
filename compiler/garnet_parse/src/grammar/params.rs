//! Formal parameters of methods, blocks and lambdas.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{BlockLiteral, Keyword, Name, Node, NodeKind, ParamTarget, Params, Span, TokenKind};
use rustc_hash::FxHashSet;

use super::seq;
use crate::context::ParseContext;
use crate::recovery::Closers;
use crate::scope::ScopeKind;
use crate::{ErrorContext, ParseError, Parser};

/// Which list is being parsed; decides where it ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ParamList {
    Def { parens: bool },
    Block,
    Lambda { parens: bool },
}

impl ParamList {
    fn parenthesized(self) -> bool {
        matches!(
            self,
            ParamList::Def { parens: true } | ParamList::Lambda { parens: true }
        )
    }
}

fn is_parameter_name(name: &Name) -> bool {
    !name.as_str().ends_with(|c| matches!(c, '?' | '!' | '='))
}

/// Names declared so far in one list.
type Seen = FxHashSet<Name>;

impl Parser<'_> {
    fn at_param_end(&self, list: ParamList) -> bool {
        let closed = match list {
            ParamList::Block => matches!(self.kind(), TokenKind::Pipe | TokenKind::Semi),
            _ if list.parenthesized() => self.check(&TokenKind::RParen),
            ParamList::Def { .. } => self.kind().is_terminator(),
            ParamList::Lambda { .. } => {
                self.check(&TokenKind::LBrace) || self.check_kw(Keyword::Do)
            }
        };
        closed || self.check(&TokenKind::Eof)
    }

    /// Parameters up to, not including, the list's closer.
    pub(crate) fn parse_param_list(&mut self, list: ParamList) -> Result<Params, ParseError> {
        let start = self.span();
        let mut params = Params::default();
        let mut seen = Seen::default();
        if list.parenthesized() {
            self.skip_newlines();
        }
        while !self.at_param_end(list) {
            self.parse_param(list, &mut params, &mut seen)
                .map_err(|e| e.with_context(ErrorContext::Params))?;
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if list.parenthesized() {
                self.skip_newlines();
            }
        }
        if list == ParamList::Block && self.eat(&TokenKind::Semi) {
            loop {
                let TokenKind::Ident(name) = self.kind().clone() else {
                    return Err(self.unexpected(Some("local variable")));
                };
                let span = self.advance().span;
                self.declare(&name, span, &mut seen);
                params.locals.push(name);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if list.parenthesized() {
            self.skip_newlines();
        }
        params.span = start.merge(self.prev_span());
        Ok(params)
    }

    fn declare(&mut self, name: &Name, span: Span, seen: &mut Seen) {
        if !name.is_underscore() && !seen.insert(name.clone()) {
            self.report(ParseError::new(
                ErrorCode::E1005,
                "duplicated argument name",
                span,
            ));
        }
        self.scopes.declare_param(name, span);
    }

    /// Optional name after `*`, `**` or `&`.
    fn param_name_opt(&mut self, seen: &mut Seen) -> Result<Option<Name>, ParseError> {
        let TokenKind::Ident(name) = self.kind().clone() else {
            return Ok(None);
        };
        if !is_parameter_name(&name) {
            return Err(ParseError::new(
                ErrorCode::E1004,
                "formal argument must be local variable",
                self.span(),
            ));
        }
        let span = self.advance().span;
        self.declare(&name, span, seen);
        Ok(Some(name))
    }

    fn parse_param(
        &mut self,
        list: ParamList,
        params: &mut Params,
        seen: &mut Seen,
    ) -> Result<(), ParseError> {
        match self.kind().clone() {
            TokenKind::DotDotDot if list.parenthesized() => {
                self.advance();
                params.forwarding = true;
            }
            TokenKind::Star => {
                self.advance();
                params.rest = Some(self.param_name_opt(seen)?);
            }
            TokenKind::Pow => {
                self.advance();
                params.keyword_rest = Some(self.param_name_opt(seen)?);
            }
            TokenKind::Amp => {
                self.advance();
                params.block = Some(self.param_name_opt(seen)?);
            }
            TokenKind::Label(name) => {
                let span = self.advance().span;
                self.declare(&name, span, seen);
                let default = if self.check(&TokenKind::Comma) || self.at_param_end(list) {
                    None
                } else {
                    Some(self.parse_default(list)?)
                };
                params.keywords.push((name, default));
            }
            TokenKind::LParen => {
                let target = self.parse_destructure(seen)?;
                self.push_positional(params, target);
            }
            TokenKind::Ident(name) => {
                if !is_parameter_name(&name) {
                    return Err(ParseError::new(
                        ErrorCode::E1004,
                        "formal argument must be local variable",
                        self.span(),
                    ));
                }
                let span = self.advance().span;
                self.declare(&name, span, seen);
                if self.eat(&TokenKind::Assign) {
                    let default = self.parse_default(list)?;
                    params.optional.push((name, default));
                } else {
                    self.push_positional(params, ParamTarget::Name(name));
                }
            }
            TokenKind::Const(_) => self.bad_param("formal argument cannot be a constant", list)?,
            TokenKind::IVar(_) => {
                self.bad_param("formal argument cannot be an instance variable", list)?;
            }
            TokenKind::GVar(_) => {
                self.bad_param("formal argument cannot be a global variable", list)?;
            }
            TokenKind::CVar(_) => {
                self.bad_param("formal argument cannot be a class variable", list)?;
            }
            _ => return Err(self.unexpected(None)),
        }
        Ok(())
    }

    /// Report a non-local parameter name and skip it with any default.
    fn bad_param(&mut self, message: &str, list: ParamList) -> Result<(), ParseError> {
        let span = self.advance().span;
        self.report(ParseError::new(ErrorCode::E1004, message, span));
        if self.eat(&TokenKind::Assign) {
            self.parse_default(list)?;
        }
        Ok(())
    }

    fn push_positional(&mut self, params: &mut Params, target: ParamTarget) {
        if params.rest.is_some() || !params.optional.is_empty() {
            params.post.push(target);
        } else {
            params.required.push(target);
        }
    }

    /// Default value. In a block list `|` closes the list, so only a
    /// unary expression is taken.
    fn parse_default(&mut self, list: ParamList) -> Result<Node, ParseError> {
        match list {
            ParamList::Block => self.parse_unary(),
            _ => self.parse_arg(),
        }
    }

    /// `(a, (b, *c))` in a parameter list.
    fn parse_destructure(&mut self, seen: &mut Seen) -> Result<ParamTarget, ParseError> {
        self.advance();
        let mut items = Vec::new();
        loop {
            match self.kind().clone() {
                TokenKind::Ident(name) if is_parameter_name(&name) => {
                    let span = self.advance().span;
                    self.declare(&name, span, seen);
                    items.push(ParamTarget::Name(name));
                }
                TokenKind::Star => {
                    self.advance();
                    items.push(ParamTarget::Splat(self.param_name_opt(seen)?));
                }
                TokenKind::LParen => items.push(self.parse_destructure(seen)?),
                _ => return Err(self.unexpected(None)),
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(ParamTarget::Destructure(items))
    }

    /// Parameters after a method name: parenthesized, bare, or none.
    pub(crate) fn parse_def_params(&mut self) -> Result<Params, ParseError> {
        if self.check(&TokenKind::LParen) {
            let open = self.advance().span;
            let mut params = self.parse_param_list(ParamList::Def { parens: true })?;
            let close = self
                .expect(&TokenKind::RParen, "')'")
                .map_err(|e| e.with_context(ErrorContext::Params))?;
            params.span = open.merge(close.span);
            return Ok(params);
        }
        if self.kind().is_terminator() {
            return Ok(Params {
                span: Span::point(self.span().start),
                ..Params::default()
            });
        }
        self.parse_param_list(ParamList::Def { parens: false })
    }

    /// `->(params) { body }` or `-> do body end`.
    pub(crate) fn parse_lambda(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let lambda = self.in_scope(
            ScopeKind::Block,
            ParseContext::IN_BLOCK,
            ParseContext::NO_DO_BLOCK.union(ParseContext::IN_RESCUE),
            |p: &mut Self| -> Result<BlockLiteral, ParseError> {
                let params = if p.check(&TokenKind::LParen) {
                    let open = p.advance().span;
                    let mut params = p.parse_param_list(ParamList::Lambda { parens: true })?;
                    let close = p.expect(&TokenKind::RParen, "')'")?;
                    params.span = open.merge(close.span);
                    Some(params)
                } else if p.check(&TokenKind::LBrace) || p.check_kw(Keyword::Do) {
                    None
                } else {
                    Some(p.parse_param_list(ParamList::Lambda { parens: false })?)
                };
                if p.eat(&TokenKind::LBrace) {
                    let body = p.parse_stmts(Closers::RBRACE);
                    p.expect(&TokenKind::RBrace, "'}'")?;
                    return Ok(BlockLiteral {
                        params,
                        body: seq(body),
                        brace: true,
                    });
                }
                if p.eat_kw(Keyword::Do) {
                    let body = p.parse_body_stmt()?;
                    p.expect_kw(Keyword::End)?;
                    return Ok(BlockLiteral {
                        params,
                        body,
                        brace: false,
                    });
                }
                Err(p.unexpected(Some("'{' or 'do'")))
            },
        );
        let lambda = lambda.map_err(|e| e.with_context(ErrorContext::Lambda))?;
        Ok(Node::new(
            NodeKind::Lambda(Box::new(lambda)),
            start.merge(self.prev_span()),
        ))
    }
}
