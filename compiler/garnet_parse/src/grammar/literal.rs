//! String-like literals, arrays and hashes.

use garnet_ir::{Name, Node, NodeFlags, NodeKind, Span, StringFlavor, TokenKind};

use super::call::pair_node;
use super::{seq, ArgsEnd};
use crate::context::ParseContext;
use crate::recovery::Closers;
use crate::{ErrorContext, ParseError, Parser};

/// Append literal text, merging with a preceding text part.
fn push_text(parts: &mut Vec<Node>, bytes: Vec<u8>, span: Span) {
    if let Some(Node {
        kind: NodeKind::Str(prev),
        span: prev_span,
        ..
    }) = parts.last_mut()
    {
        prev.extend_from_slice(&bytes);
        *prev_span = prev_span.merge(span);
        return;
    }
    parts.push(Node::new(NodeKind::Str(bytes), span));
}

/// The text of `parts` when none is interpolated.
fn static_text(parts: &[Node]) -> Option<Vec<u8>> {
    let mut text = Vec::new();
    for part in parts {
        let NodeKind::Str(bytes) = &part.kind else {
            return None;
        };
        text.extend_from_slice(bytes);
    }
    Some(text)
}

fn parts_span(parts: &[Node], fallback: Span) -> Span {
    match (parts.first(), parts.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => fallback,
    }
}

fn symbol_node(parts: Vec<Node>, span: Span) -> Node {
    match static_text(&parts) {
        Some(text) => Node::new(NodeKind::Sym(Name::from_bytes(&text)), span),
        None => Node::new(NodeKind::DSym(parts), span),
    }
}

impl Parser<'_> {
    fn string_node(&self, parts: Vec<Node>, span: Span) -> Node {
        match static_text(&parts) {
            Some(text) => {
                let node = Node::new(NodeKind::Str(text), span);
                if self.frozen_strings() {
                    node.with_flags(NodeFlags::FROZEN)
                } else {
                    node
                }
            }
            None => Node::new(NodeKind::DStr(parts), span),
        }
    }

    /// A literal from `StringBegin` through its end token. The flag is set
    /// when it ended as a `"label":`.
    pub(crate) fn parse_string(&mut self) -> Result<(Node, bool), ParseError> {
        let TokenKind::StringBegin(open) = self.kind().clone() else {
            return Err(self.unexpected(Some("string literal")));
        };
        let start = self.advance().span;
        let mut parts: Vec<Node> = Vec::new();
        let mut words: Vec<Vec<Node>> = Vec::new();
        let mut label = false;
        let mut regexp_options = None;
        loop {
            match self.kind().clone() {
                TokenKind::StringContent(bytes) => {
                    let span = self.advance().span;
                    push_text(&mut parts, bytes, span);
                }
                TokenKind::InterpBegin => {
                    let open_span = self.advance().span;
                    let stmts = self
                        .with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
                            p.parse_stmts(Closers::INTERP_END)
                        });
                    let close = self
                        .expect(&TokenKind::InterpEnd, "'}'")
                        .map_err(|e| e.with_context(ErrorContext::Interpolation))?;
                    parts.push(Node::new(
                        NodeKind::Interp(seq(stmts).map(Node::boxed)),
                        open_span.merge(close.span),
                    ));
                }
                TokenKind::InterpVar => {
                    let open_span = self.advance().span;
                    let kind = match self.kind().clone() {
                        TokenKind::IVar(name) => NodeKind::IVar(name),
                        TokenKind::CVar(name) => NodeKind::CVar(name),
                        TokenKind::GVar(name) => NodeKind::GVar(name),
                        TokenKind::BackRef(c) => NodeKind::BackRef(c),
                        TokenKind::NthRef(n) => NodeKind::NthRef(n),
                        _ => return Err(self.unexpected(None)),
                    };
                    let span = self.advance().span;
                    let var = Node::new(kind, span);
                    parts.push(Node::new(
                        NodeKind::Interp(Some(var.boxed())),
                        open_span.merge(span),
                    ));
                }
                TokenKind::WordSep => {
                    self.advance();
                    if !parts.is_empty() {
                        words.push(std::mem::take(&mut parts));
                    }
                }
                TokenKind::StringEnd => {
                    self.advance();
                    break;
                }
                TokenKind::LabelEnd => {
                    self.advance();
                    label = true;
                    break;
                }
                TokenKind::RegexpEnd(options) => {
                    self.advance();
                    regexp_options = Some(options);
                    break;
                }
                _ => return Err(self.unexpected(None)),
            }
        }
        let span = start.merge(self.prev_span());
        if label {
            return Ok((symbol_node(parts, span), true));
        }
        let node = match open.flavor {
            StringFlavor::Plain => self.string_node(parts, span),
            StringFlavor::Heredoc if !open.command => self.string_node(parts, span),
            StringFlavor::Command | StringFlavor::Heredoc => {
                Node::new(NodeKind::XStr(parts), span)
            }
            StringFlavor::Symbol => symbol_node(parts, span),
            StringFlavor::Regexp => Node::new(
                NodeKind::Regexp {
                    parts,
                    options: regexp_options.unwrap_or_default(),
                },
                span,
            ),
            StringFlavor::Words | StringFlavor::Symbols => {
                if !parts.is_empty() {
                    words.push(parts);
                }
                let elems = words
                    .into_iter()
                    .map(|word| {
                        let word_span = parts_span(&word, span);
                        if open.flavor == StringFlavor::Words {
                            self.string_node(word, word_span)
                        } else {
                            symbol_node(word, word_span)
                        }
                    })
                    .collect();
                Node::new(NodeKind::Array(elems), span)
            }
        };
        Ok((node, false))
    }

    /// `[a, *b, c: 1]`
    pub(crate) fn parse_array(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let mut elems = self
            .with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
                p.parse_args(ArgsEnd::Bracket)
            })
            .map_err(|e| e.with_context(ErrorContext::Array))?;
        if let Some(pos) = elems
            .iter()
            .position(|e| matches!(e.kind, NodeKind::BlockPass(_)))
        {
            let pass = elems.remove(pos);
            self.report(ParseError::unexpected(
                &TokenKind::Amp,
                Span::new(pass.span.start, pass.span.start + 1),
                None,
            ));
        }
        Ok(Node::new(
            NodeKind::Array(elems),
            start.merge(self.prev_span()),
        ))
    }

    /// `{ key => value, label: value, **other }`
    pub(crate) fn parse_hash(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let pairs = self
            .with_context(ParseContext::NONE, ParseContext::NO_DO_BLOCK, |p| {
                p.parse_hash_elements()
            })
            .map_err(|e| e.with_context(ErrorContext::Hash))?;
        Ok(Node::new(
            NodeKind::Hash(pairs),
            start.merge(self.prev_span()),
        ))
    }

    fn parse_hash_elements(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut pairs = Vec::new();
        self.skip_newlines();
        while !self.check(&TokenKind::RBrace) {
            match self.kind().clone() {
                TokenKind::Label(name) => {
                    let key_span = self.advance().span;
                    let key = Node::new(NodeKind::Sym(name.clone()), key_span);
                    let value = if matches!(
                        self.kind(),
                        TokenKind::Comma | TokenKind::RBrace | TokenKind::Newline
                    ) {
                        self.shorthand_value(name, key_span)
                    } else {
                        self.parse_arg()?
                    };
                    pairs.push(pair_node(key, value));
                }
                TokenKind::Pow => {
                    let star = self.advance().span;
                    let value = if matches!(self.kind(), TokenKind::Comma | TokenKind::RBrace) {
                        None
                    } else {
                        Some(self.parse_arg()?)
                    };
                    let span = value.as_ref().map_or(star, |v| star.merge(v.span));
                    pairs.push(Node::new(
                        NodeKind::DoubleSplat(value.map(Node::boxed)),
                        span,
                    ));
                }
                TokenKind::StringBegin(_) => {
                    let (key, label) = self.parse_string()?;
                    if label {
                        self.skip_newlines();
                        let value = self.parse_arg()?;
                        pairs.push(pair_node(key, value));
                    } else {
                        let key = self.parse_arg_from(Some(key))?;
                        self.expect(&TokenKind::Arrow, "'=>'")?;
                        self.skip_newlines();
                        let value = self.parse_arg()?;
                        pairs.push(pair_node(key, value));
                    }
                }
                _ => {
                    let key = self.parse_arg()?;
                    self.expect(&TokenKind::Arrow, "'=>'")?;
                    self.skip_newlines();
                    let value = self.parse_arg()?;
                    pairs.push(pair_node(key, value));
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.skip_newlines();
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(pairs)
    }
}
