// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the mosaic compiler.
//!
//! This module defines [`CompileError`], the main error enum, and
//! [`SourceContext`] for rich error reporting.
//!
//! # Error Categories
//!
//! - **Parse errors**: invalid template or expression syntax
//! - **Script errors**: a `<script>` block whose default export cannot be read
//! - **Generation errors**: unsupported directives, read-only bindings,
//!   circular computed properties, conflicting source edits
//! - **Cache / IO errors**: infrastructure failures
//!
//! Every error that can be tied to a position carries a byte offset so
//! callers can point at the offending source.

use std::fmt;
use thiserror::Error;

/// Source context for enhanced error messages.
///
/// Holds the lines surrounding an error location so the message can show
/// the problematic code with a caret under the offending column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    /// `(line number, text)` pairs, 1-indexed.
    pub lines: Vec<(usize, String)>,
    /// The line of the error (1-indexed).
    pub line: usize,
    /// The column of the error (1-indexed, in characters).
    pub column: usize,
}

impl SourceContext {
    /// Captures two lines either side of `offset`.
    pub fn at_offset(source: &str, offset: usize) -> Self {
        let (line, column) = locate(source, offset);
        let first = line.saturating_sub(2).max(1);
        let last = line + 2;

        let lines = source
            .lines()
            .enumerate()
            .map(|(index, text)| (index + 1, text.to_string()))
            .filter(|(number, _)| *number >= first && *number <= last)
            .collect();

        Self { lines, line, column }
    }

    /// Formats the captured lines, marking the error column:
    ///
    /// ```text
    ///  2 | <p>{{ a + }}</p>
    ///    |           ^
    /// ```
    pub fn format_snippet(&self) -> String {
        let width = self.lines.last().map(|(n, _)| n.to_string().len()).unwrap_or(1);
        let mut out = String::new();

        for (number, text) in &self.lines {
            out.push_str(&format!("{:>width$} | {}\n", number, text, width = width));
            if *number == self.line {
                out.push_str(&format!(
                    "{:>width$} | {}^\n",
                    "",
                    " ".repeat(self.column.saturating_sub(1)),
                    width = width
                ));
            }
        }

        out
    }
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_snippet())
    }
}

/// Displays an optional [`SourceContext`], printing nothing for `None`.
pub struct OptSourceContextDisplay<'a>(pub &'a Option<SourceContext>);

impl fmt::Display for OptSourceContextDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(context) => write!(f, "{}", context),
            None => Ok(()),
        }
    }
}

/// Converts a byte offset into a 1-indexed `(line, column)` pair.
///
/// Columns count characters, not bytes. Offsets past the end clamp to the
/// end of the source.
pub fn locate(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// The main error type for compiler operations.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The template or one of its expressions could not be parsed.
    #[error("{message} ({line}:{column})\n{}", OptSourceContextDisplay(source_context))]
    Parse {
        /// Description of the problem.
        message: String,
        /// Byte offset of the problem.
        offset: usize,
        /// Line of the problem (1-indexed).
        line: usize,
        /// Column of the problem (1-indexed).
        column: usize,
        /// Surrounding source lines.
        source_context: Option<SourceContext>,
    },

    /// A `prefix:name` directive the compiler has no code generation for.
    #[error("Not implemented: '{directive}' directives are not supported (offset {offset})")]
    UnsupportedDirective {
        /// The directive prefix, e.g. `class`.
        directive: String,
        /// Byte offset of the directive.
        offset: usize,
    },

    /// A binding targets a list item whose list is not a plain reference.
    #[error("{name} is read-only, it cannot be bound")]
    ReadOnlyBinding {
        /// The context name that cannot be written back.
        name: String,
        /// Byte offset of the binding value.
        offset: usize,
    },

    /// An each block binds a name an enclosing each block already binds.
    #[error("{name} is already bound by an enclosing each block")]
    ShadowedContext {
        /// The name bound twice.
        name: String,
        /// Byte offset of the inner each block.
        offset: usize,
    },

    /// Computed properties depend on each other in a loop.
    #[error("Computed properties have a circular dependency: {}", cycle.join(" -> "))]
    CircularComputed {
        /// The names forming the loop, first name repeated at the end.
        cycle: Vec<String>,
    },

    /// The `<script>` block's default export could not be understood.
    #[error("Invalid script: {message} (offset {offset})")]
    InvalidScript {
        /// Description of the problem.
        message: String,
        /// Byte offset of the problem.
        offset: usize,
    },

    /// Two source edits claimed overlapping ranges.
    #[error("Conflicting source edits at {start}..{end}")]
    OverlappingEdit {
        /// Start of the rejected edit.
        start: usize,
        /// End of the rejected edit.
        end: usize,
    },

    /// Cache operation failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Builds a [`CompileError::Parse`] with line, column and context
    /// resolved from `offset`.
    pub fn parse(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = locate(source, offset);
        CompileError::Parse {
            message: message.into(),
            offset,
            line,
            column,
            source_context: Some(SourceContext::at_offset(source, offset)),
        }
    }

    /// The byte offset the error refers to, when there is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::Parse { offset, .. }
            | CompileError::UnsupportedDirective { offset, .. }
            | CompileError::ReadOnlyBinding { offset, .. }
            | CompileError::ShadowedContext { offset, .. }
            | CompileError::InvalidScript { offset, .. } => Some(*offset),
            CompileError::OverlappingEdit { start, .. } => Some(*start),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_counts_lines_and_characters() {
        let source = "<p>\n  héllo {{ x }}\n</p>";
        assert_eq!(locate(source, 0), (1, 1));
        let offset = source.find('x').unwrap();
        assert_eq!(locate(source, offset), (2, 12));
    }

    #[test]
    fn parse_error_shows_caret() {
        let source = "<div>\n{{ a + }}\n</div>";
        let error = CompileError::parse(source, 9, "Unexpected token");
        let message = error.to_string();
        assert!(message.contains("Unexpected token (2:4)"));
        assert!(message.contains("2 | {{ a + }}"));
        assert!(message.contains("  |    ^"));
        assert_eq!(error.offset(), Some(9));
    }

    #[test]
    fn circular_message_lists_cycle() {
        let error = CompileError::CircularComputed {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert!(error.to_string().contains("a -> b -> a"));
    }
}
