// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Reads the template definition out of a component's `<script>` block.
//!
//! The script is emitted verbatim, so it never needs a full JavaScript
//! parse. Code generation only needs the shape of the default-exported
//! object literal:
//!
//! - which of `data`, `methods`, `onrender` and `onteardown` are present
//! - the `computed` entries and the parameter names of each function
//! - the names declared under `helpers` and `events`
//! - where `export default` sits, so it can be rewritten into a local
//!
//! A small tokenizer skips strings, template literals and comments so that
//! braces inside them do not upset bracket matching.

use crate::ast::{ScriptBlock, Span};
use crate::dependencies::ComputedDeclaration;
use crate::error::{CompileError, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Location of `export default { ... }` in the component source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultExport {
    /// Offset of the `export` keyword.
    pub start: usize,
    /// Offset of the opening `{` of the exported object.
    pub declaration_start: usize,
}

impl DefaultExport {
    /// The `export default ` prefix that gets replaced.
    pub fn keyword_span(&self) -> Span {
        Span::new(self.start, self.declaration_start)
    }
}

/// What the template definition object provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateProperties {
    /// `data()` supplies initial state.
    pub data: bool,
    /// `methods` are mixed into the component.
    pub methods: bool,
    /// `onrender()` runs after mounting.
    pub onrender: bool,
    /// `onteardown()` runs after teardown.
    pub onteardown: bool,
    /// `computed` entries in declaration order.
    pub computed: Vec<ComputedDeclaration>,
    /// Names under `helpers`.
    pub helpers: BTreeSet<String>,
    /// Names under `events`.
    pub events: BTreeSet<String>,
}

/// The result of reading a script block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMetadata {
    /// Where the default export sits, if there is one.
    pub default_export: Option<DefaultExport>,
    /// The definition object's contents.
    pub properties: TemplateProperties,
}

/// Reads the default-exported template definition from `script`.
pub fn analyse_script(script: &ScriptBlock) -> Result<ScriptMetadata> {
    let tokens = tokenize(&script.content, script.content_span.start)?;
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        match token.text {
            "{" | "(" | "[" => depth += 1,
            "}" | ")" | "]" => depth = depth.saturating_sub(1),
            "export" if depth == 0 => {
                let is_default = tokens.get(index + 1).map(|t| t.text) == Some("default");
                if !is_default {
                    continue;
                }
                let declaration = tokens.get(index + 2).ok_or_else(|| invalid(token.start, "Expected default export"))?;
                if declaration.text != "{" {
                    return Err(invalid(declaration.start, "The default export must be an object literal"));
                }

                let reader = ObjectReader { tokens: &tokens };
                let properties = reader.template_properties(index + 2)?;
                debug!(
                    computed = properties.computed.len(),
                    helpers = properties.helpers.len(),
                    events = properties.events.len(),
                    "read template definition"
                );

                return Ok(ScriptMetadata {
                    default_export: Some(DefaultExport { start: token.start, declaration_start: declaration.start }),
                    properties,
                });
            }
            _ => {}
        }
    }

    Ok(ScriptMetadata::default())
}

fn invalid(offset: usize, message: impl Into<String>) -> CompileError {
    CompileError::InvalidScript { message: message.into(), offset }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Number,
    Str,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Token<'s> {
    kind: TokenKind,
    text: &'s str,
    start: usize,
}

fn tokenize(content: &str, base: usize) -> Result<Vec<Token<'_>>> {
    let bytes = content.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if content[i..].starts_with("//") {
            i = content[i..].find('\n').map(|n| i + n).unwrap_or(bytes.len());
            continue;
        }

        if content[i..].starts_with("/*") {
            i = content[i + 2..]
                .find("*/")
                .map(|n| i + 2 + n + 2)
                .ok_or_else(|| invalid(base + start, "Unterminated comment"))?;
            continue;
        }

        let kind = if c == b'"' || c == b'\'' || c == b'`' {
            i += 1;
            loop {
                match bytes.get(i) {
                    None => return Err(invalid(base + start, "Unterminated string")),
                    Some(b'\\') => i += 2,
                    Some(&q) if q == c => {
                        i += 1;
                        break;
                    }
                    Some(_) => i += 1,
                }
            }
            TokenKind::Str
        } else if c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80 {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$' || bytes[i] >= 0x80) {
                i += 1;
            }
            TokenKind::Word
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.') {
                i += 1;
            }
            TokenKind::Number
        } else if content[i..].starts_with("=>") || content[i..].starts_with("...") {
            i += if bytes[i] == b'=' { 2 } else { 3 };
            TokenKind::Punct
        } else {
            i += 1;
            TokenKind::Punct
        };

        let end = i.min(bytes.len());
        tokens.push(Token { kind, text: &content[start..end], start: base + start });
    }

    Ok(tokens)
}

/// One `key: value` / `key() {}` / `key` entry of an object literal.
struct Entry<'s> {
    key: &'s str,
    key_start: usize,
    shape: EntryShape,
}

enum EntryShape {
    /// Token index range of the value expression.
    Value(usize, usize),
    /// Token index range of the parameter list, parentheses excluded.
    Method(usize, usize),
    Shorthand,
}

struct ObjectReader<'t, 's> {
    tokens: &'t [Token<'s>],
}

impl<'s> ObjectReader<'_, 's> {
    fn template_properties(&self, open: usize) -> Result<TemplateProperties> {
        let mut properties = TemplateProperties::default();

        for entry in self.entries(open)? {
            match entry.key {
                "data" => properties.data = true,
                "methods" => properties.methods = true,
                "onrender" => properties.onrender = true,
                "onteardown" => properties.onteardown = true,
                "computed" => {
                    for computed in self.nested_entries(&entry)? {
                        let dependencies = self.parameters(&computed)?;
                        properties.computed.push(ComputedDeclaration {
                            name: computed.key.to_string(),
                            dependencies,
                            offset: computed.key_start,
                        });
                    }
                }
                "helpers" => {
                    properties.helpers = self.nested_entries(&entry)?.iter().map(|e| e.key.to_string()).collect();
                }
                "events" => {
                    properties.events = self.nested_entries(&entry)?.iter().map(|e| e.key.to_string()).collect();
                }
                _ => {}
            }
        }

        Ok(properties)
    }

    fn token(&self, index: usize) -> Result<&Token<'s>> {
        self.tokens
            .get(index)
            .ok_or_else(|| invalid(self.tokens.last().map(|t| t.start).unwrap_or(0), "Unexpected end of script"))
    }

    /// Index of the bracket closing the one at `open`.
    fn matching(&self, open: usize) -> Result<usize> {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            match token.text {
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(index);
                    }
                }
                _ => {}
            }
        }
        Err(invalid(self.tokens[open].start, format!("Unclosed '{}'", self.tokens[open].text)))
    }

    /// Index of the first depth-0 `,` or closing bracket at or after `from`.
    fn value_end(&self, from: usize) -> Result<usize> {
        let mut index = from;
        loop {
            let token = self.token(index)?;
            match token.text {
                "{" | "(" | "[" => index = self.matching(index)? + 1,
                "," | "}" | ")" | "]" => return Ok(index),
                _ => index += 1,
            }
        }
    }

    fn entries(&self, open: usize) -> Result<Vec<Entry<'s>>> {
        let close = self.matching(open)?;
        let mut entries = Vec::new();
        let mut index = open + 1;

        while index < close {
            let mut key = self.token(index)?;
            if key.kind == TokenKind::Word
                && matches!(key.text, "async" | "get" | "set")
                && self.token(index + 1)?.kind == TokenKind::Word
            {
                index += 1;
                key = self.token(index)?;
            }

            let key_text = match key.kind {
                TokenKind::Word | TokenKind::Number => key.text,
                TokenKind::Str => &key.text[1..key.text.len() - 1],
                TokenKind::Punct => return Err(invalid(key.start, format!("Unexpected '{}' in object literal", key.text))),
            };

            let next = self.token(index + 1)?;
            let (shape, after) = match next.text {
                ":" => {
                    let end = self.value_end(index + 2)?;
                    (EntryShape::Value(index + 2, end), end)
                }
                "(" => {
                    let params_close = self.matching(index + 1)?;
                    let body = params_close + 1;
                    if self.token(body)?.text != "{" {
                        return Err(invalid(self.token(body)?.start, "Expected method body"));
                    }
                    (EntryShape::Method(index + 2, params_close), self.matching(body)? + 1)
                }
                "," | "}" => (EntryShape::Shorthand, index + 1),
                other => return Err(invalid(next.start, format!("Unexpected '{}' after key '{}'", other, key_text))),
            };

            entries.push(Entry { key: key_text, key_start: key.start, shape });
            index = after;
            if self.token(index)?.text == "," {
                index += 1;
            }
        }

        Ok(entries)
    }

    fn nested_entries(&self, entry: &Entry<'s>) -> Result<Vec<Entry<'s>>> {
        match entry.shape {
            EntryShape::Value(start, _) if self.token(start)?.text == "{" => self.entries(start),
            _ => Err(invalid(entry.key_start, format!("'{}' must be an object literal", entry.key))),
        }
    }

    /// Parameter names of a function-valued entry.
    fn parameters(&self, entry: &Entry<'s>) -> Result<Vec<String>> {
        let (start, end) = match entry.shape {
            EntryShape::Method(start, end) => (start, end),
            EntryShape::Value(start, end) => {
                let mut index = start;
                if self.token(index)?.text == "async" {
                    index += 1;
                }
                let first = self.token(index)?;
                match first.text {
                    "function" => {
                        index += 1;
                        if self.token(index)?.kind == TokenKind::Word {
                            index += 1;
                        }
                        let close = self.matching(index)?;
                        (index + 1, close)
                    }
                    "(" => {
                        let close = self.matching(index)?;
                        (index + 1, close)
                    }
                    _ if first.kind == TokenKind::Word && index + 1 < end && self.token(index + 1)?.text == "=>" => {
                        (index, index + 1)
                    }
                    _ => {
                        return Err(invalid(
                            first.start,
                            format!("Computed property '{}' must be a function", entry.key),
                        ))
                    }
                }
            }
            EntryShape::Shorthand => {
                return Err(invalid(entry.key_start, format!("Computed property '{}' must be a function", entry.key)))
            }
        };

        let mut names = Vec::new();
        let mut index = start;
        while index < end {
            let token = self.token(index)?;
            match token.kind {
                TokenKind::Word => names.push(token.text.to_string()),
                _ if token.text == "..." => {
                    index += 1;
                    continue;
                }
                _ => {
                    return Err(invalid(
                        token.start,
                        format!("Dependencies of computed property '{}' must be plain parameter names", entry.key),
                    ))
                }
            }
            // skip a default value
            index = self.value_end(index + 1)?;
            if index < end && self.token(index)?.text == "," {
                index += 1;
            }
        }

        Ok(names)
    }
}
