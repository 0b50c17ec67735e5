//! `def`, `class`, `module`, `alias`, `undef`, `BEGIN` and `END`.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{
    AliasTarget, DefNode, Keyword, Name, Node, NodeKind, Params, Span, Token, TokenKind,
};
use garnet_lexer::LexState;

use super::primary::variable_call;
use super::{boxed, seq};
use crate::checks::is_singleton_literal;
use crate::context::ParseContext;
use crate::recovery::Closers;
use crate::scope::ScopeKind;
use crate::{ErrorContext, ParseError, Parser};

/// `$&`, `` $` ``, `$'` and `$+` as the character after `$`.
fn back_ref_char(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [b'$', c @ (b'&' | b'`' | b'\'' | b'+')] => Some(*c),
        _ => None,
    }
}

fn is_number_var(name: &str) -> bool {
    name.strip_prefix('$')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

impl Parser<'_> {
    pub(crate) fn parse_def(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::MethodDef, |p: &mut Self| {
            let singleton = p.parse_def_receiver()?;
            if let Some(recv) = &singleton {
                if is_singleton_literal(recv) {
                    p.report(ParseError::new(
                        ErrorCode::E1007,
                        "can't define singleton method for literals",
                        recv.span,
                    ));
                }
            }
            let (name, name_span) = p.parse_method_name()?;
            let (params, body) = p.in_scope(
                ScopeKind::Def,
                ParseContext::IN_DEF,
                ParseContext::DEF_RESET,
                |p: &mut Self| -> Result<(Params, Option<Node>), ParseError> {
                    let params = p.parse_def_params()?;
                    let body = p.parse_body_stmt()?;
                    p.expect_kw(Keyword::End)?;
                    Ok((params, body))
                },
            )?;
            Ok(Node::new(
                NodeKind::Def(Box::new(DefNode {
                    singleton,
                    name,
                    name_span,
                    params,
                    body,
                })),
                start.merge(p.prev_span()),
            ))
        })
    }

    /// `recv.` of `def recv.name`, leaving the cursor on the name.
    fn parse_def_receiver(&mut self) -> Result<Option<Node>, ParseError> {
        let token = self.current().clone();
        let recv = if token.kind == TokenKind::LParen {
            let recv = self.parse_parens()?;
            if !matches!(self.kind(), TokenKind::Dot | TokenKind::ColonColon) {
                return Err(self.unexpected(Some("'.' or '::'")));
            }
            recv
        } else {
            let capable = matches!(
                token.kind,
                TokenKind::Ident(_)
                    | TokenKind::Const(_)
                    | TokenKind::IVar(_)
                    | TokenKind::CVar(_)
                    | TokenKind::GVar(_)
                    | TokenKind::Keyword(
                        Keyword::SelfKw | Keyword::Nil | Keyword::True | Keyword::False
                    )
            );
            if !capable || !matches!(self.peek().kind, TokenKind::Dot | TokenKind::ColonColon) {
                return Ok(None);
            }
            self.advance();
            self.receiver_node(token)
        };
        // The name after `.` may be a setter or operator.
        self.set_lex_state(LexState::Fname);
        self.advance();
        Ok(Some(recv))
    }

    fn receiver_node(&mut self, token: Token) -> Node {
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Ident(name) if self.scopes.is_local(name.as_str()) => {
                self.scopes.mark_used(name.as_str());
                NodeKind::LocalVar(name)
            }
            TokenKind::Ident(name) => {
                return variable_call(None, name, span, garnet_ir::CallOp::None);
            }
            TokenKind::Const(name) => NodeKind::Const(name),
            TokenKind::IVar(name) => NodeKind::IVar(name),
            TokenKind::CVar(name) => NodeKind::CVar(name),
            TokenKind::GVar(name) => NodeKind::GVar(name),
            TokenKind::Keyword(Keyword::Nil) => NodeKind::Nil,
            TokenKind::Keyword(Keyword::True) => NodeKind::True,
            TokenKind::Keyword(Keyword::False) => NodeKind::False,
            _ => NodeKind::SelfRef,
        };
        Node::new(kind, span)
    }

    /// A method name: identifier, constant, keyword, setter or operator.
    pub(crate) fn parse_method_name(&mut self) -> Result<(Name, Span), ParseError> {
        let name = match self.kind() {
            TokenKind::Ident(name) | TokenKind::Const(name) => name.clone(),
            TokenKind::Keyword(kw) => Name::new(kw.as_str()),
            kind => match kind.punct_str() {
                Some(text) => Name::new(text),
                None => return Err(self.unexpected(Some("method name"))),
            },
        };
        let span = self.advance().span;
        Ok((name, span))
    }

    pub(crate) fn parse_class(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::ClassDef, |p: &mut Self| {
            if p.eat(&TokenKind::Shl) {
                let target = p.parse_expr_stmt()?;
                let body = p.parse_module_body()?;
                return Ok(Node::new(
                    NodeKind::SClass {
                        target: target.boxed(),
                        body: boxed(body),
                    },
                    start.merge(p.prev_span()),
                ));
            }
            if p.context.in_def() {
                p.report(ParseError::new(
                    ErrorCode::E1011,
                    "class definition in method body",
                    start,
                ));
            }
            let path = p.parse_cpath()?;
            let superclass = if p.eat(&TokenKind::Lt) {
                Some(p.parse_arg()?)
            } else {
                None
            };
            let body = p.parse_module_body()?;
            Ok(Node::new(
                NodeKind::Class {
                    path: path.boxed(),
                    superclass: boxed(superclass),
                    body: boxed(body),
                },
                start.merge(p.prev_span()),
            ))
        })
    }

    pub(crate) fn parse_module(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        self.within(ErrorContext::ModuleDef, |p: &mut Self| {
            if p.context.in_def() {
                p.report(ParseError::new(
                    ErrorCode::E1011,
                    "module definition in method body",
                    start,
                ));
            }
            let path = p.parse_cpath()?;
            let body = p.parse_module_body()?;
            Ok(Node::new(
                NodeKind::Module {
                    path: path.boxed(),
                    body: boxed(body),
                },
                start.merge(p.prev_span()),
            ))
        })
    }

    /// Body of a class or module, through `end`.
    ///
    /// The scope opens before the line break after the header, so a
    /// `shareable_constant_value` comment at the top of the body stays
    /// inside it.
    fn parse_module_body(&mut self) -> Result<Option<Node>, ParseError> {
        self.in_scope(
            ScopeKind::Class,
            ParseContext::IN_CLASS,
            ParseContext::DEF_RESET.union(ParseContext::IN_DEF),
            |p: &mut Self| {
                p.skip_terminators();
                let body = p.parse_body_stmt()?;
                p.expect_kw(Keyword::End)?;
                Ok(body)
            },
        )
    }

    /// `Name`, `::Name`, or any primary followed by `::Name`. A
    /// non-constant name is reported and kept so the body still parses.
    fn parse_cpath(&mut self) -> Result<Node, ParseError> {
        let start = self.span();
        let mut path = match self.kind().clone() {
            TokenKind::ColonColon => {
                self.advance();
                let TokenKind::Const(name) = self.kind().clone() else {
                    return Err(self.unexpected(Some("constant")));
                };
                let end = self.advance().span;
                Node::new(NodeKind::Colon3(name), start.merge(end))
            }
            TokenKind::Const(name) => {
                self.advance();
                Node::new(NodeKind::Const(name), start)
            }
            TokenKind::Ident(name) => {
                self.report(ParseError::new(
                    ErrorCode::E1011,
                    "class/module name must be CONSTANT",
                    start,
                ));
                self.advance();
                Node::new(NodeKind::Const(name), start)
            }
            _ if self.at_expr_start() || self.at_compound_keyword() => {
                // `class if c; A end::B`: the scope is an arbitrary value.
                let scope = self.parse_primary()?;
                if !self.check(&TokenKind::ColonColon) {
                    return Err(self.unexpected(Some("'::'")));
                }
                scope
            }
            _ => return Err(self.unexpected(Some("constant"))),
        };
        while self.eat(&TokenKind::ColonColon) {
            let TokenKind::Const(name) = self.kind().clone() else {
                return Err(self.unexpected(Some("constant")));
            };
            let end = self.advance().span;
            path = Node::new(
                NodeKind::Colon2 {
                    scope: path.boxed(),
                    name,
                },
                start.merge(end),
            );
        }
        Ok(path)
    }

    /// `if`, `unless`, `while` and `until`, which only open a value
    /// where a statement could start.
    fn at_compound_keyword(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Keyword(Keyword::If | Keyword::Unless | Keyword::While | Keyword::Until)
        )
    }

    // === alias / undef ===

    pub(crate) fn parse_alias(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let first = self.current().clone();
        if matches!(
            first.kind,
            TokenKind::GVar(_) | TokenKind::BackRef(_) | TokenKind::NthRef(_)
        ) {
            self.set_lex_state(LexState::Fname);
            self.advance();
            let second = self.current().clone();
            if !matches!(
                second.kind,
                TokenKind::GVar(_) | TokenKind::BackRef(_) | TokenKind::NthRef(_)
            ) {
                return Err(self.unexpected(Some("global variable")));
            }
            self.advance();
            let new = self.global_alias_target(&first)?;
            let old = self.global_alias_target(&second)?;
            return Ok(Node::new(
                NodeKind::Alias { new, old },
                start.merge(second.span),
            ));
        }
        let new = self.alias_method_name(true)?;
        if matches!(
            self.kind(),
            TokenKind::GVar(_) | TokenKind::BackRef(_) | TokenKind::NthRef(_)
        ) {
            return Err(self.unexpected(Some("method name")));
        }
        let old = self.alias_method_name(false)?;
        Ok(Node::new(
            NodeKind::Alias {
                new: AliasTarget::Method(new),
                old: AliasTarget::Method(old),
            },
            start.merge(self.prev_span()),
        ))
    }

    fn global_alias_target(&mut self, token: &Token) -> Result<AliasTarget, ParseError> {
        let number_var = || {
            ParseError::new(
                ErrorCode::E1012,
                "can't make alias for the number variables",
                token.span,
            )
        };
        match &token.kind {
            TokenKind::NthRef(_) => Err(number_var()),
            TokenKind::GVar(name) if is_number_var(name.as_str()) => Err(number_var()),
            TokenKind::GVar(name) => Ok(match back_ref_char(name.as_str()) {
                Some(c) => AliasTarget::BackRef(c),
                None => AliasTarget::Global(name.clone()),
            }),
            TokenKind::BackRef(c) => Ok(AliasTarget::BackRef(*c)),
            _ => Err(ParseError::unexpected(&token.kind, token.span, None)),
        }
    }

    /// A method name or symbol operand of `alias`/`undef`. `then_fname`
    /// lexes the following token as a method name too.
    fn alias_method_name(&mut self, then_fname: bool) -> Result<Name, ParseError> {
        let name = match self.kind() {
            TokenKind::Symbol(name) | TokenKind::Ident(name) | TokenKind::Const(name) => {
                name.clone()
            }
            TokenKind::Keyword(kw) => Name::new(kw.as_str()),
            kind => match kind.punct_str() {
                Some(text) => Name::new(text),
                None => return Err(self.unexpected(Some("method name"))),
            },
        };
        if then_fname {
            self.set_lex_state(LexState::Fname);
        }
        self.advance();
        Ok(name)
    }

    pub(crate) fn parse_undef(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let mut names = vec![self.alias_method_name(false)?];
        while self.check(&TokenKind::Comma) {
            self.set_lex_state(LexState::Fname);
            self.advance();
            names.push(self.alias_method_name(false)?);
        }
        Ok(Node::new(
            NodeKind::Undef(names),
            start.merge(self.prev_span()),
        ))
    }

    // === BEGIN / END ===

    pub(crate) fn parse_pre_exe(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        if self.scopes.depth() > 1 || self.context != ParseContext::NONE {
            self.report(ParseError::new(
                ErrorCode::E1010,
                "BEGIN is permitted only at toplevel",
                start,
            ));
        }
        let body = self.parse_exe_body()?;
        Ok(Node::new(
            NodeKind::PreExe(boxed(body)),
            start.merge(self.prev_span()),
        ))
    }

    pub(crate) fn parse_post_exe(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let body = self.parse_exe_body()?;
        Ok(Node::new(
            NodeKind::PostExe(boxed(body)),
            start.merge(self.prev_span()),
        ))
    }

    fn parse_exe_body(&mut self) -> Result<Option<Node>, ParseError> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let stmts = self.with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
            p.parse_stmts(Closers::RBRACE)
        });
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(seq(stmts))
    }
}
