//! Phase-based front end tests.
//!
//! Organized by compilation phase rather than by language feature; each
//! test drives the real lexer and parser end to end.
//!
//! # Organization
//!
//! - `parse/` - Lexer and grammar behaviour seen through `garnet_parse::parse`
//! - `diagnostics/` - Rendered reports, warning levels, error limits
//! - `driver/` - The `garnet` command's argument handling and checking
//! - `common/` - Shared test utilities
//!
//! # Running Phase Tests
//!
//! ```bash
//! cargo test -p garnetc --test phases
//! cargo test -p garnetc --test phases parse
//! ```

#[path = "phases/common/mod.rs"]
mod common;

#[path = "phases/parse/mod.rs"]
mod parse;

#[path = "phases/diagnostics/mod.rs"]
mod diagnostics;

#[path = "phases/driver/mod.rs"]
mod driver;
