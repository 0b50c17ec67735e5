//! Parser phase tests.
//!
//! Tests for `garnet_lexer` and `garnet_parse` together, validating:
//! - Block binding and command calls
//! - Assignment target rules
//! - Definitions and parameter checks
//! - Lexer errors surfacing as syntax errors
//! - Determinism across repeated parses

mod assignment;
mod calls;
mod definitions;
mod determinism;
mod lexer;
