// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Position-preserving source splicing.
//!
//! Expression rewriting never edits strings directly. It records
//! [`SourceEdits`] against the pristine component source: insertions at an
//! offset and overwrites of a range. When the module is written out, every
//! [`Segment::Source`] span is resolved by walking the source once with the
//! edits that fall inside it, and the copied stretches are recorded in a
//! [`SourceMap`].

use super::code::{Code, Segment};
use crate::ast::Span;
use crate::error::{CompileError, Result};
use crate::sourcemap::{SnippetMapping, SourceMap};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    content: String,
}

impl Edit {
    fn is_insert(&self) -> bool {
        self.start == self.end
    }
}

/// Edits recorded against the original source.
#[derive(Debug, Clone, Default)]
pub struct SourceEdits {
    edits: Vec<Edit>,
}

impl SourceEdits {
    /// Creates an empty edit list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edits were recorded.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Inserts `content` before the byte at `offset`.
    ///
    /// Several insertions at one offset are emitted in the order they were
    /// made. Inserting strictly inside an overwritten range is an error.
    pub fn insert(&mut self, offset: usize, content: impl Into<String>) -> Result<()> {
        if self.edits.iter().any(|e| !e.is_insert() && offset > e.start && offset < e.end) {
            return Err(CompileError::OverlappingEdit { start: offset, end: offset });
        }
        self.push(Edit { start: offset, end: offset, content: content.into() });
        Ok(())
    }

    /// Replaces `[start, end)` with `content`.
    pub fn overwrite(&mut self, start: usize, end: usize, content: impl Into<String>) -> Result<()> {
        let conflict = self.edits.iter().any(|e| {
            if e.is_insert() {
                e.start > start && e.start < end
            } else {
                e.start < end && start < e.end
            }
        });
        if conflict || end < start {
            return Err(CompileError::OverlappingEdit { start, end });
        }
        self.push(Edit { start, end, content: content.into() });
        Ok(())
    }

    fn push(&mut self, edit: Edit) {
        // insertions sort before an overwrite starting at the same offset
        let key = |e: &Edit| (e.start, !e.is_insert());
        let position = self.edits.partition_point(|e| key(e) <= key(&edit));
        self.edits.insert(position, edit);
    }

    /// Edits that belong to `span`. A zero-width insertion at the very end
    /// of a non-empty span belongs to whatever follows it.
    fn within(&self, span: Span) -> impl Iterator<Item = &Edit> {
        let first = self.edits.partition_point(|e| e.start < span.start);
        self.edits[first..]
            .iter()
            .take_while(move |e| e.start < span.end || (e.start == span.end && span.is_empty()))
            .filter(move |e| e.end <= span.end)
    }
}

/// Writes [`Code`] out, resolving source spans through the edits.
pub struct Splice<'a> {
    source: &'a str,
    edits: &'a SourceEdits,
    output: String,
    map: SourceMap,
}

impl<'a> Splice<'a> {
    /// Starts an empty output.
    pub fn new(source: &'a str, edits: &'a SourceEdits) -> Self {
        Self { source, edits, output: String::new(), map: SourceMap::new() }
    }

    /// Appends `code`.
    pub fn write(&mut self, code: &Code) {
        for segment in code.segments() {
            match segment {
                Segment::Text(text) => self.output.push_str(text),
                Segment::Source(span) => self.write_source(*span),
            }
        }
    }

    fn write_source(&mut self, span: Span) {
        let generated_start = self.output.len();
        let mut cursor = span.start;
        let edits = self.edits;

        for edit in edits.within(span) {
            self.copy(cursor, edit.start);
            self.output.push_str(&edit.content);
            cursor = edit.end;
        }
        self.copy(cursor, span.end);

        self.map.snippets.push(SnippetMapping {
            original: span,
            generated: Span::new(generated_start, self.output.len()),
        });
    }

    /// Copies `[start, end)` of the source, splitting the recorded runs at
    /// newlines so each run stays on one generated line.
    fn copy(&mut self, start: usize, end: usize) {
        let Some(text) = self.source.get(start..end) else {
            return;
        };
        let mut offset = 0;
        for piece in text.split_inclusive('\n') {
            self.map.add_run(self.output.len(), start + offset, piece.len());
            self.output.push_str(piece);
            offset += piece.len();
        }
    }

    /// The generated text and its map.
    pub fn finish(self) -> (String, SourceMap) {
        (self.output, self.map)
    }
}
