//! Garnet front end driver.
//!
//! Backs the `garnet` binary: argument parsing, the `lex`, `parse` and
//! `check` commands, and tracing setup. Commands return an exit code and
//! write their reports to stdout/stderr; the pieces that produce text are
//! public so they can be tested without a process.

pub mod args;
pub mod commands;
pub mod tracing_setup;

pub use args::{parse_args, ArgError, Command, Input, Invocation};
