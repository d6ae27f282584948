// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use crate::ast::Span;
use crate::error::Result;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const VLQ_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A stretch of generated output copied byte-for-byte from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRun {
    /// Offset in the generated code.
    pub generated: usize,
    /// Offset in the component source.
    pub original: usize,
    /// Length in bytes.
    pub len: usize,
}

/// Where one spliced source expression ended up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetMapping {
    /// Span of the expression in the component source.
    pub original: Span,
    /// Span of its rewritten text in the generated code.
    pub generated: Span,
}

/// Byte-level mapping from generated code back to the component source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Copied runs, ordered by generated offset. Runs never span a newline.
    pub runs: Vec<MappedRun>,
    /// Every spliced source span, in output order.
    pub snippets: Vec<SnippetMapping>,
}

impl SourceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `len` bytes at `generated` were copied from `original`.
    ///
    /// Runs must be added in generated order.
    pub fn add_run(&mut self, generated: usize, original: usize, len: usize) {
        if len > 0 {
            self.runs.push(MappedRun { generated, original, len });
        }
    }

    /// Maps a generated offset to the source offset it was copied from.
    ///
    /// Returns `None` for generator-written text.
    pub fn original_position(&self, generated: usize) -> Option<usize> {
        let index = self.runs.partition_point(|run| run.generated + run.len <= generated);
        let run = self.runs.get(index)?;
        (generated >= run.generated).then(|| run.original + (generated - run.generated))
    }

    /// Maps a source offset to the first generated offset copied from it.
    pub fn generated_position(&self, original: usize) -> Option<usize> {
        self.runs
            .iter()
            .find(|run| original >= run.original && original < run.original + run.len)
            .map(|run| run.generated + (original - run.original))
    }

    /// The source span of the spliced expression occupying `generated`.
    pub fn original_span(&self, generated: Span) -> Option<Span> {
        self.snippets
            .iter()
            .find(|snippet| snippet.generated == generated)
            .map(|snippet| snippet.original)
    }

    /// Builds a Source Map v3 document.
    pub fn to_v3(&self, generated: &str, source: &str, file: &str, source_name: &str) -> SourceMapV3 {
        let generated_lines = LineIndex::new(generated);
        let source_lines = LineIndex::new(source);

        let mut mappings = String::new();
        let mut current_line = 0;
        let mut previous_column = 0i64;
        let mut previous_original_line = 0i64;
        let mut previous_original_column = 0i64;
        let mut first_in_line = true;

        for run in &self.runs {
            let (line, column) = generated_lines.locate(generated, run.generated);
            let (original_line, original_column) = source_lines.locate(source, run.original);

            while current_line < line {
                mappings.push(';');
                current_line += 1;
                previous_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                mappings.push(',');
            }
            first_in_line = false;

            encode_vlq(&mut mappings, column as i64 - previous_column);
            encode_vlq(&mut mappings, 0);
            encode_vlq(&mut mappings, original_line as i64 - previous_original_line);
            encode_vlq(&mut mappings, original_column as i64 - previous_original_column);

            previous_column = column as i64;
            previous_original_line = original_line as i64;
            previous_original_column = original_column as i64;
        }

        SourceMapV3 {
            version: 3,
            file: file.to_string(),
            sources: vec![source_name.to_string()],
            sources_content: vec![source.to_string()],
            names: Vec::new(),
            mappings,
        }
    }
}

/// A Source Map revision 3 document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapV3 {
    /// Always 3.
    pub version: u8,
    /// Name of the generated file.
    pub file: String,
    /// Original file names.
    pub sources: Vec<String>,
    /// Original file contents.
    pub sources_content: Vec<String>,
    /// Symbol names. Unused.
    pub names: Vec<String>,
    /// Base64 VLQ encoded mappings.
    pub mappings: String,
}

impl SourceMapV3 {
    /// Serialises the map to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// A `//# sourceMappingURL=` comment embedding the map as a data URL.
    pub fn to_comment(&self) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.to_json()?);
        Ok(format!("//# sourceMappingURL=data:application/json;charset=utf-8;base64,{}", encoded))
    }
}

struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Zero-based line and UTF-16 column of `offset`.
    fn locate(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|start| *start <= offset).saturating_sub(1);
        let start = self.starts[line];
        let column = text.get(start..offset).map(|s| s.encode_utf16().count()).unwrap_or(0);
        (line, column)
    }
}

fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = (vlq & 0b11111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b100000;
        }
        out.push(VLQ_CHARS[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlq(value: i64) -> String {
        let mut out = String::new();
        encode_vlq(&mut out, value);
        out
    }

    #[test]
    fn test_vlq_encoding() {
        assert_eq!(vlq(0), "A");
        assert_eq!(vlq(1), "C");
        assert_eq!(vlq(-1), "D");
        assert_eq!(vlq(16), "gB");
        assert_eq!(vlq(123), "2H");
    }

    #[test]
    fn test_run_lookup() {
        let mut map = SourceMap::new();
        map.add_run(10, 100, 3);
        map.add_run(13, 103, 2);
        map.add_run(15, 7, 0);
        map.add_run(20, 50, 4);
        assert_eq!(map.runs.len(), 3);

        assert_eq!(map.original_position(12), Some(102));
        assert_eq!(map.original_position(14), Some(104));
        assert_eq!(map.original_position(15), None);
        assert_eq!(map.original_position(23), Some(53));
        assert_eq!(map.generated_position(51), Some(21));
    }

    #[test]
    fn test_v3_mappings() {
        let source = "<p>{{a}}</p>\n<p>{{b}}</p>";
        let generated = "x = root.a;\ny = root.b;";
        let mut map = SourceMap::new();
        map.add_run(9, 5, 1);
        map.add_run(21, 18, 1);

        let v3 = map.to_v3(generated, source, "out.js", "in.html");
        assert_eq!(v3.version, 3);
        assert_eq!(v3.mappings, "SAAK;SACA");

        let json = v3.to_json().unwrap();
        assert!(json.contains("\"sourcesContent\""));
        assert!(v3.to_comment().unwrap().starts_with("//# sourceMappingURL=data:application/json"));
    }
}
