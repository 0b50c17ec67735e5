//! Garnet IR - shared front-end data types
//!
//! This crate holds the data that flows between the lexer, the parser and
//! the downstream consumers of a parse:
//! - `Span` for byte ranges in a source buffer
//! - `Name` for identifier text
//! - `Token`/`TokenKind`/`TokenFlags` for lexer output
//! - `Node`/`NodeKind` for the syntax tree
//! - `visitor` for read-only and mutating traversal
//!
//! Nothing here depends on the lexer or parser, so tools can consume parse
//! results without pulling in either.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod name;
mod span;
mod token;
pub mod visitor;

pub use ast::{
    AliasTarget, BeginBody, BlockLiteral, Call, CallForm, CallOp, DefNode, Node, NodeFlags,
    NodeKind, ParamTarget, Params, ShareableAction, ShareableMode, ShareableTag,
};
pub use name::Name;
pub use span::{Span, SpanError};
pub use token::{
    AssignOp, Keyword, NumberLit, NumberValue, StringFlavor, StringOpen, Token, TokenFlags,
    TokenKind,
};
