//! Identifier text.
//!
//! Names are small owned strings. Source identifiers are decoded lossily from
//! the buffer's bytes; non-UTF-8 encodings keep their bytes only in string
//! literal contents, never in names.

use std::borrow::Borrow;
use std::fmt;

/// Identifier, operator-method or variable name. Sigils are kept:
/// `@foo` is stored as `@foo`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Box<str>);

impl Name {
    pub fn new(text: &str) -> Self {
        Name(text.into())
    }

    /// Build from raw source bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Name(String::from_utf8_lossy(bytes).into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Names starting with `_` mark intentionally unused bindings.
    #[inline]
    pub fn is_underscore(&self) -> bool {
        self.0.starts_with('_')
    }

    /// Name with `suffix` appended (`foo` -> `foo=`).
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut s = String::with_capacity(self.0.len() + suffix.len());
        s.push_str(&self.0);
        s.push_str(suffix);
        Name(s.into())
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
