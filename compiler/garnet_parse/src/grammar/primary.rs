//! Primary expressions: literals, variables, bare calls and keyword forms.

use garnet_diagnostic::emitter::display_line;
use garnet_ir::{
    Call, CallForm, CallOp, Keyword, Name, Node, NodeFlags, NodeKind, Span, StringFlavor,
    TokenKind,
};

use super::{seq, ArgsEnd};
use crate::context::ParseContext;
use crate::recovery::Closers;
use crate::{ParseError, Parser};

/// Join two adjacent string literals (`"a" "b"`).
fn concat_strings(lhs: Node, rhs: Node) -> Node {
    let span = lhs.span.merge(rhs.span);
    let frozen = lhs.flags.contains(NodeFlags::FROZEN) && rhs.flags.contains(NodeFlags::FROZEN);
    let (lhs_span, rhs_span) = (lhs.span, rhs.span);
    match (lhs.kind, rhs.kind) {
        (NodeKind::Str(mut a), NodeKind::Str(b)) => {
            a.extend_from_slice(&b);
            let node = Node::new(NodeKind::Str(a), span);
            if frozen {
                node.with_flags(NodeFlags::FROZEN)
            } else {
                node
            }
        }
        (lhs, rhs) => {
            let mut parts = Vec::new();
            for (kind, part_span) in [(lhs, lhs_span), (rhs, rhs_span)] {
                match kind {
                    NodeKind::DStr(inner) => parts.extend(inner),
                    other => parts.push(Node::new(other, part_span)),
                }
            }
            Node::new(NodeKind::DStr(parts), span)
        }
    }
}

impl Parser<'_> {
    /// A primary followed by its method calls, indexing and blocks.
    pub(crate) fn parse_primary_postfix(&mut self) -> Result<Node, ParseError> {
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    pub(crate) fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let start = self.span();
        match self.kind().clone() {
            TokenKind::Number(lit) => {
                self.advance();
                Ok(Node::new(NodeKind::Number(lit), start))
            }
            TokenKind::Char(bytes) => {
                self.advance();
                let node = Node::new(NodeKind::Str(bytes), start);
                Ok(if self.frozen_strings() {
                    node.with_flags(NodeFlags::FROZEN)
                } else {
                    node
                })
            }
            TokenKind::Symbol(name) => {
                self.advance();
                Ok(Node::new(NodeKind::Sym(name), start))
            }
            TokenKind::StringBegin(_) => self.parse_string_primary(),
            TokenKind::Ident(name) => self.parse_identifier(name),
            TokenKind::Const(name) => self.parse_constant(name),
            TokenKind::IVar(name) => self.simple(NodeKind::IVar(name)),
            TokenKind::CVar(name) => self.simple(NodeKind::CVar(name)),
            TokenKind::GVar(name) => self.simple(NodeKind::GVar(name)),
            TokenKind::BackRef(c) => self.simple(NodeKind::BackRef(c)),
            TokenKind::NthRef(n) => self.simple(NodeKind::NthRef(n)),
            TokenKind::LParen => self.parse_parens(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_hash(),
            TokenKind::ColonColon => {
                self.advance();
                let TokenKind::Const(name) = self.kind().clone() else {
                    return Err(self.unexpected(Some("constant")));
                };
                let end = self.advance().span;
                Ok(Node::new(NodeKind::Colon3(name), start.merge(end)))
            }
            TokenKind::Lambda => self.parse_lambda(),
            TokenKind::Keyword(kw) => self.parse_keyword_primary(kw),
            _ => Err(self.unexpected(None)),
        }
    }

    fn simple(&mut self, kind: NodeKind) -> Result<Node, ParseError> {
        let span = self.advance().span;
        Ok(Node::new(kind, span))
    }

    fn parse_keyword_primary(&mut self, kw: Keyword) -> Result<Node, ParseError> {
        match kw {
            Keyword::Nil => self.simple(NodeKind::Nil),
            Keyword::True => self.simple(NodeKind::True),
            Keyword::False => self.simple(NodeKind::False),
            Keyword::SelfKw => self.simple(NodeKind::SelfRef),
            Keyword::File => self.simple(NodeKind::File),
            Keyword::Encoding => self.simple(NodeKind::Encoding),
            Keyword::Line => {
                let line = display_line(self.current().line, self.options.first_line);
                self.simple(NodeKind::Line(line))
            }
            Keyword::If => self.parse_if(false),
            Keyword::Unless => self.parse_if(true),
            Keyword::While => self.parse_while(false),
            Keyword::Until => self.parse_while(true),
            Keyword::For => self.parse_for(),
            Keyword::Case => self.parse_case(),
            Keyword::Begin => self.parse_begin(),
            Keyword::Def => self.parse_def(),
            Keyword::Class => self.parse_class(),
            Keyword::Module => self.parse_module(),
            Keyword::Return | Keyword::Break | Keyword::Next => self.parse_jump(kw),
            Keyword::Redo => self.parse_redo(),
            Keyword::Retry => self.parse_retry(),
            Keyword::Yield => self.parse_yield(),
            Keyword::Super => self.parse_super(),
            Keyword::Defined | Keyword::Not => self.parse_unary(),
            _ => Err(self.unexpected(None)),
        }
    }

    /// A string literal, joined with any adjacent plain strings.
    fn parse_string_primary(&mut self) -> Result<Node, ParseError> {
        let (mut node, label) = self.parse_string()?;
        if label {
            return Err(ParseError::unexpected(
                &TokenKind::LabelEnd,
                self.prev_span(),
                None,
            ));
        }
        while matches!(
            self.kind(),
            TokenKind::StringBegin(open) if open.flavor == StringFlavor::Plain
        ) && matches!(node.kind, NodeKind::Str(_) | NodeKind::DStr(_))
        {
            let (next, label) = self.parse_string()?;
            if label {
                return Err(ParseError::unexpected(
                    &TokenKind::LabelEnd,
                    self.prev_span(),
                    None,
                ));
            }
            node = concat_strings(node, next);
        }
        Ok(node)
    }

    /// An identifier: a local variable, or a call with or without arguments.
    fn parse_identifier(&mut self, name: Name) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let paren = self.check(&TokenKind::LParen);
        if paren && !self.current().has_space_before() {
            return self.parse_paren_call(None, name, start, CallOp::None);
        }
        if self.scopes.is_local(name.as_str()) && !paren {
            self.scopes.mark_used(name.as_str());
            return Ok(Node::new(NodeKind::LocalVar(name), start));
        }
        if self.at_command_arg_start() {
            return self.parse_command_call(None, name, start, CallOp::None);
        }
        Ok(variable_call(None, name, start, CallOp::None))
    }

    fn parse_constant(&mut self, name: Name) -> Result<Node, ParseError> {
        let start = self.advance().span;
        if self.check(&TokenKind::LParen) && !self.current().has_space_before() {
            return self.parse_paren_call(None, name, start, CallOp::None);
        }
        if !matches!(self.kind(), TokenKind::LBracket | TokenKind::ColonColon)
            && self.at_command_arg_start()
        {
            return self.parse_command_call(None, name, start, CallOp::None);
        }
        Ok(Node::new(NodeKind::Const(name), start))
    }

    /// `( stmts )`.
    pub(crate) fn parse_parens(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let stmts = self.with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
            p.parse_stmts(Closers::RPAREN)
        });
        let end = self.expect(&TokenKind::RParen, "')'")?.span;
        Ok(Node::new(
            NodeKind::Parens(seq(stmts).map(Node::boxed)),
            start.merge(end),
        ))
    }

    /// Arguments of a jump or `yield`; several values form an array.
    pub(crate) fn parse_jump_value(&mut self) -> Result<Option<Node>, ParseError> {
        if !self.at_command_arg_start() && !self.check(&TokenKind::LParen) {
            return Ok(None);
        }
        let mut args = self.parse_args(ArgsEnd::Command)?;
        if let Some(pass) = args.iter().find(|a| matches!(a.kind, NodeKind::BlockPass(_))) {
            return Err(ParseError::new(
                garnet_diagnostic::ErrorCode::E1009,
                "block argument should not be given",
                pass.span,
            ));
        }
        Ok(match args.len() {
            0 => None,
            1 if !matches!(args[0].kind, NodeKind::Splat(_)) => args.pop(),
            _ => {
                let span = args[0].span.merge(self.prev_span());
                Some(Node::new(NodeKind::Array(args), span))
            }
        })
    }
}

/// A bare method name with no arguments (`foo`, `recv.foo`).
pub(crate) fn variable_call(receiver: Option<Node>, method: Name, span: Span, op: CallOp) -> Node {
    let form = if receiver.is_some() {
        CallForm::Parens
    } else {
        CallForm::Variable
    };
    let span = receiver.as_ref().map_or(span, |r| r.span.merge(span));
    Node::new(
        NodeKind::Call(Box::new(Call {
            receiver,
            method,
            args: Vec::new(),
            block: None,
            op,
            form,
        })),
        span,
    )
}
