//! Diagnostic phase tests: rendered reports and warning levels.

mod rendering;
mod warnings;
