// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Generated code fragments.
//!
//! Generated statements mix fresh text with expressions lifted from the
//! component source. The source parts are kept as [`Segment::Source`]
//! spans rather than copied text, so the final splice can apply edits
//! (`root.` prefixes and the like) and record where every byte came from.

use crate::ast::Span;

/// One piece of generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text written by the generator.
    Text(String),
    /// A stretch of the component source, edits applied on output.
    Source(Span),
}

/// A sequence of [`Segment`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    segments: Vec<Segment>,
}

/// Concatenates anything convertible into [`Code`].
///
/// ```ignore
/// let statement = code!("var x = ", Code::source(span), ";");
/// ```
macro_rules! code {
    ($($part:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut code = $crate::codegen::Code::new();
        $( code.push($part); )*
        code
    }};
}

impl Code {
    /// Empty code.
    pub fn new() -> Self {
        Self::default()
    }

    /// Code consisting of one source span.
    pub fn source(span: Span) -> Self {
        Self { segments: vec![Segment::Source(span)] }
    }

    /// The segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the code produces no output.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|segment| match segment {
            Segment::Text(text) => text.is_empty(),
            Segment::Source(span) => span.is_empty(),
        })
    }

    /// Appends literal text, merging with a trailing text segment.
    pub fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    /// Appends another piece of code.
    pub fn push(&mut self, other: impl Into<Code>) {
        for segment in other.into().segments {
            match segment {
                Segment::Text(text) => self.push_str(&text),
                source => self.segments.push(source),
            }
        }
    }

    /// Joins pieces with `separator`, skipping empty ones.
    pub fn join<I>(parts: I, separator: &str) -> Code
    where
        I: IntoIterator,
        I::Item: Into<Code>,
    {
        let mut joined = Code::new();
        let mut first = true;
        for part in parts {
            let part = part.into();
            if part.is_empty() {
                continue;
            }
            if !first {
                joined.push_str(separator);
            }
            joined.push(part);
            first = false;
        }
        joined
    }

    /// Prefixes every line with `prefix`.
    ///
    /// Only generator text is touched; source segments are emitted as
    /// written, so a multi-line expression keeps its own layout.
    pub fn indent(&self, prefix: &str) -> Code {
        let mut indented = Code::new();
        let mut at_line_start = true;

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => {
                    let mut out = String::with_capacity(text.len());
                    for ch in text.chars() {
                        if at_line_start && ch != '\n' {
                            out.push_str(prefix);
                        }
                        out.push(ch);
                        at_line_start = ch == '\n';
                    }
                    indented.push_str(&out);
                }
                Segment::Source(span) => {
                    if at_line_start && !span.is_empty() {
                        indented.push_str(prefix);
                    }
                    indented.segments.push(Segment::Source(*span));
                    at_line_start = false;
                }
            }
        }

        indented
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Self {
        let mut code = Code::new();
        code.push_str(text);
        code
    }
}

impl From<String> for Code {
    fn from(text: String) -> Self {
        Code::from(text.as_str())
    }
}

impl From<&String> for Code {
    fn from(text: &String) -> Self {
        Code::from(text.as_str())
    }
}

impl From<&Code> for Code {
    fn from(code: &Code) -> Self {
        code.clone()
    }
}

impl From<Span> for Code {
    fn from(span: Span) -> Self {
        Code::source(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_text_merges() {
        let code = code!("a", "b", Code::source(Span::new(0, 1)), "c");
        assert_eq!(code.segments().len(), 3);
        assert_eq!(code.segments()[0], Segment::Text("ab".to_string()));
    }

    #[test]
    fn indent_skips_blank_lines() {
        let code = code!("if ( x ) {\n\ty();\n\n}").indent("\t");
        assert_eq!(code.segments()[0], Segment::Text("\tif ( x ) {\n\t\ty();\n\n\t}".to_string()));
    }

    #[test]
    fn indent_prefixes_leading_source() {
        let span = Span::new(4, 9);
        let code = code!("a\n", span, ";").indent("  ");
        assert_eq!(
            code.segments(),
            &[
                Segment::Text("  a\n  ".to_string()),
                Segment::Source(span),
                Segment::Text(";".to_string()),
            ]
        );
    }

    #[test]
    fn join_skips_empty_parts() {
        let code = Code::join(vec![Code::from("a"), Code::new(), Code::from("b")], "\n");
        assert_eq!(code, Code::from("a\nb"));
    }
}
