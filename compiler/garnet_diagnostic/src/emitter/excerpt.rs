//! Caret-annotated source excerpts.
//!
//! A failed parse renders as one block:
//!
//! ```text
//! t.rb:1: 2 syntax errors found
//! > 1 | def foo(A)
//!     |         ^ formal argument cannot be a constant
//! > 3 | x = )
//!     |     ^ unexpected ')'
//! ```
//!
//! Diagnostics on the same line share one excerpt row. The caret row copies
//! tabs from the source line so carets stay aligned under any tab width.

use std::fmt::Write;

use garnet_ir::Span;

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;

use super::colors;

pub const DEFAULT_MAX_WIDTH: usize = 100;

const ELLIPSIS: &str = "...";

/// How excerpts are laid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub filename: String,
    /// Number reported for the first line of the buffer.
    pub first_line: i64,
    /// Excerpt lines wider than this many characters are truncated.
    pub max_width: usize,
    pub colors: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            filename: "-".to_string(),
            first_line: 1,
            max_width: DEFAULT_MAX_WIDTH,
            colors: false,
        }
    }
}

/// Reported line number for a 1-based buffer line.
pub fn display_line(line: u32, first_line: i64) -> i64 {
    i64::from(line) + first_line - 1
}

struct Mark<'d> {
    line: u32,
    span: Span,
    message: &'d str,
    primary: bool,
}

/// Render every error in `diagnostics` (warnings are skipped) as one block.
///
/// `diagnostics` should already be in source order; marks are re-sorted by
/// position so secondary locations land on their own lines.
pub fn render_syntax_errors(
    source: &[u8],
    table: &LineOffsetTable,
    diagnostics: &[Diagnostic],
    options: &RenderOptions,
) -> String {
    let mut marks = Vec::new();
    for diag in diagnostics.iter().filter(|d| d.is_error()) {
        let span = diag.span();
        let line = table.line_from_offset(span.start);
        marks.push(Mark {
            line,
            span,
            message: &diag.message,
            primary: true,
        });
        for label in &diag.labels {
            let label_line = table.line_from_offset(label.span.start);
            if !label.is_primary && !label.message.is_empty() && label_line != line {
                marks.push(Mark {
                    line: label_line,
                    span: label.span,
                    message: &label.message,
                    primary: false,
                });
            }
        }
    }

    let error_count = marks.iter().filter(|m| m.primary).count();
    let first = marks
        .iter()
        .filter(|m| m.primary)
        .map(|m| m.line)
        .min()
        .unwrap_or(1);

    let mut out = String::new();
    let header = if error_count > 1 {
        format!(
            "{}:{}: {error_count} syntax errors found",
            options.filename,
            display_line(first, options.first_line)
        )
    } else {
        format!(
            "{}:{}: syntax error found",
            options.filename,
            display_line(first, options.first_line)
        )
    };
    push_colored(&mut out, &header, colors::BOLD, options.colors);
    out.push('\n');

    marks.sort_by_key(|m| (m.line, m.span.start));

    let number_width = marks
        .iter()
        .map(|m| display_line(m.line, options.first_line).to_string().len())
        .max()
        .unwrap_or(1);

    let mut rest = marks.as_slice();
    while let Some(head) = rest.first() {
        let group_len = rest.iter().take_while(|m| m.line == head.line).count();
        let (group, tail) = rest.split_at(group_len);
        render_group(&mut out, source, table, group, number_width, options);
        rest = tail;
    }

    // Callers match on the last caret row; no trailing newline.
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

/// `FILE:LINE: warning: MESSAGE`
pub fn render_warning(
    table: &LineOffsetTable,
    warning: &Diagnostic,
    options: &RenderOptions,
) -> String {
    let line = table.line_from_offset(warning.span().start);
    let mut out = format!(
        "{}:{}: ",
        options.filename,
        display_line(line, options.first_line)
    );
    push_colored(&mut out, "warning", colors::WARNING, options.colors);
    let _ = write!(out, ": {}", warning.message);
    out
}

/// Byte offset of each character start within `text`.
fn char_starts(text: &[u8]) -> Vec<usize> {
    text.iter()
        .enumerate()
        .filter(|(_, &b)| b & 0xC0 != 0x80)
        .map(|(i, _)| i)
        .collect()
}

/// Visible character window `[start, end)` of a line `len` characters wide
/// that keeps column `col` in view.
fn window(len: usize, col: usize, max: usize) -> (usize, usize) {
    if len <= max || max == 0 {
        return (0, len);
    }
    let start = if col < max * 3 / 4 {
        0
    } else {
        (col - max / 4).min(len - max)
    };
    (start, (start + max).min(len))
}

fn render_group(
    out: &mut String,
    source: &[u8],
    table: &LineOffsetTable,
    group: &[Mark<'_>],
    number_width: usize,
    options: &RenderOptions,
) {
    let Some(first) = group.first() else {
        return;
    };
    let line = first.line;
    let bounds = table.line_bounds(source, line).unwrap_or(Span::DUMMY);
    let text = source.get(bounds.range()).unwrap_or_default();
    let starts = char_starts(text);
    let len = starts.len();

    // Column (in characters) of a byte offset, clamped to the line.
    let column_of = |offset: u32| -> usize {
        let rel = offset.saturating_sub(bounds.start) as usize;
        starts.partition_point(|&s| s < rel)
    };
    let byte_of = |col: usize| -> usize { starts.get(col).copied().unwrap_or(text.len()) };

    let (win_start, win_end) = window(len, column_of(first.span.start), options.max_width);
    let lead = win_start > 0;
    let trail = win_end < len;

    let number = display_line(line, options.first_line);
    let gutter = format!("> {number:>number_width$} ");
    push_colored(out, &gutter, colors::BOLD, options.colors);
    out.push('|');
    let visible = String::from_utf8_lossy(&text[byte_of(win_start)..byte_of(win_end)]);
    if lead || trail || !visible.is_empty() {
        out.push(' ');
    }
    if lead {
        out.push_str(ELLIPSIS);
    }
    out.push_str(visible.trim_end_matches([' ', '\t']));
    if trail {
        out.push_str(ELLIPSIS);
    }
    out.push('\n');

    let indent = " ".repeat(gutter.len());
    for mark in group {
        let col = column_of(mark.span.start).clamp(win_start, win_end);
        let end_col = if mark.span.end > bounds.end {
            len
        } else {
            column_of(mark.span.end)
        };
        let width = end_col.min(win_end).saturating_sub(col).max(1);

        let mut pad = String::new();
        if lead {
            pad.push_str("   ");
        }
        for c in win_start..col {
            let b = text.get(byte_of(c)).copied().unwrap_or(b' ');
            pad.push(if b == b'\t' { '\t' } else { ' ' });
        }

        let mut marker = String::with_capacity(width + 1 + mark.message.len());
        marker.push('^');
        marker.push_str(&"~".repeat(width - 1));
        if !mark.message.is_empty() {
            marker.push(' ');
            marker.push_str(mark.message);
        }

        let color = if mark.primary {
            colors::ERROR
        } else {
            colors::SECONDARY
        };
        let _ = write!(out, "{indent}| {pad}");
        push_colored(out, &marker, color, options.colors);
        out.push('\n');
    }
}

fn push_colored(out: &mut String, text: &str, color: &str, enabled: bool) {
    if enabled {
        let _ = write!(out, "{color}{text}{}", colors::RESET);
    } else {
        out.push_str(text);
    }
}
