//! Byte-level building blocks for the Garnet lexer.
//!
//! - [`SourceBuffer`]: owned source bytes with a `0x00` sentinel and the
//!   declared encoding
//! - [`Cursor`]: a `Copy` position over the buffer, cheap to snapshot
//! - [`Encoding`]: the registry of source encodings a magic comment may name
//!
//! Nothing here knows about tokens; the lexer crate layers modes and token
//! rules on top.

mod cursor;
mod encoding;
mod source_buffer;

pub use cursor::Cursor;
pub use encoding::{Encoding, EncodingError, EncodingKind};
pub use source_buffer::{EncodingIssue, EncodingIssueKind, SourceBuffer};
