// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree (AST) types for component templates.
//!
//! This module defines the data structures that represent a parsed
//! component. The AST is produced by [`crate::parser`] and consumed by
//! [`crate::codegen`].
//!
//! # Structure
//!
//! A component is represented as a [`Template`] containing:
//! - The markup [`Fragment`] (elements, text, mustache tags and blocks)
//! - An optional `<script>` block holding the template definition object
//! - An optional `<style>` block, passed through untouched
//!
//! Every node records the byte [`Span`] it occupies in the original source.
//! Spans are what lets code generation splice source text into its output
//! instead of re-printing expressions.
//!
//! # Node Types
//!
//! [`Node`] and [`Attribute`] are closed sum types. Code generation matches
//! them exhaustively, so supporting a new construct is a compile-time change.

use crate::expr::Expr;
use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into the component source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Creates a span covering `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `offset` falls inside the span.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns the slice of `source` covered by this span.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// A parsed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// The markup.
    pub html: Fragment,
    /// The `<script>` block, if any.
    pub js: Option<ScriptBlock>,
    /// The `<style>` block, if any.
    pub css: Option<StyleBlock>,
}

/// An ordered run of nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fragment {
    /// Child nodes in document order.
    pub children: Vec<Node>,
    /// Source span of the fragment.
    pub span: Span,
}

/// A markup node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// An HTML element such as `<div>`.
    Element(Element),
    /// Literal text between tags.
    Text(Text),
    /// An HTML comment. Comments are not rendered.
    Comment(Comment),
    /// An interpolation `{{expression}}`.
    MustacheTag(MustacheTag),
    /// A conditional block `{{#if expr}}...{{/if}}`.
    IfBlock(IfBlock),
    /// A list block `{{#each expr as item, index}}...{{/each}}`.
    EachBlock(EachBlock),
}

impl Node {
    /// Source span of the node.
    pub fn span(&self) -> Span {
        match self {
            Node::Element(node) => node.span,
            Node::Text(node) => node.span,
            Node::Comment(node) => node.span,
            Node::MustacheTag(node) => node.span,
            Node::IfBlock(node) => node.span,
            Node::EachBlock(node) => node.span,
        }
    }
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name as written.
    pub name: String,
    /// Attributes and directives in source order.
    pub attributes: Vec<Attribute>,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Source span from `<` of the opening tag to `>` of the closing tag.
    pub span: Span,
}

impl Element {
    /// Finds a plain attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&PlainAttribute> {
        self.attributes.iter().find_map(|attribute| match attribute {
            Attribute::Attribute(plain) if plain.name == name => Some(plain),
            _ => None,
        })
    }
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// The text, after edge-whitespace trimming.
    pub data: String,
    /// Source span.
    pub span: Span,
}

/// An HTML comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// The comment body.
    pub data: String,
    /// Source span.
    pub span: Span,
}

/// `{{expression}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MustacheTag {
    /// The interpolated expression.
    pub expression: Expr,
    /// Source span including the braces.
    pub span: Span,
}

/// `{{#if expression}}...{{/if}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfBlock {
    /// The condition.
    pub expression: Expr,
    /// Nodes rendered while the condition is truthy.
    pub children: Vec<Node>,
    /// Source span from the opening to the closing tag.
    pub span: Span,
}

/// `{{#each expression as context, index}}...{{/each}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EachBlock {
    /// The iterated list expression.
    pub expression: Expr,
    /// Name bound to the current item.
    pub context: String,
    /// Name bound to the current position, when given.
    pub index: Option<String>,
    /// Nodes rendered once per item.
    pub children: Vec<Node>,
    /// Source span from the opening to the closing tag.
    pub span: Span,
}

/// An element attribute or directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    /// A regular attribute such as `class='x {{y}}'`.
    Attribute(PlainAttribute),
    /// `on:event='method(args)'`.
    EventHandler(EventHandler),
    /// `bind:property='path.to.value'`.
    Binding(Binding),
    /// `ref:name`.
    Ref(Ref),
}

/// A regular attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: AttributeValue,
    /// Source span of the whole attribute.
    pub span: Span,
}

/// The value side of a regular attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Present without a value, e.g. `<input autofocus>`.
    BooleanTrue,
    /// A sequence of literal text and interpolated expressions.
    Chunks(Vec<Chunk>),
}

impl AttributeValue {
    /// Returns the value when it is a single piece of literal text.
    pub fn static_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Chunks(chunks) => match chunks.as_slice() {
                [Chunk::Text(text)] => Some(text.data.as_str()),
                [] => Some(""),
                _ => None,
            },
            AttributeValue::BooleanTrue => None,
        }
    }
}

/// One piece of an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Chunk {
    /// Literal text, with backslash escapes removed.
    Text(Text),
    /// An interpolated expression.
    Expression(Expr),
}

/// `on:event='callee(args)'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHandler {
    /// DOM or custom event name.
    pub name: String,
    /// The handler call. Always a call expression.
    pub expression: Expr,
    /// Source span of the whole directive.
    pub span: Span,
}

/// `bind:property='path'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// The element property kept in sync, e.g. `value` or `checked`.
    pub name: String,
    /// Dotted keypath of the bound state.
    pub value: String,
    /// Source span of the keypath.
    pub value_span: Span,
    /// Source span of the whole directive.
    pub span: Span,
}

impl Binding {
    /// Keypath segments of the bound value.
    pub fn parts(&self) -> Vec<&str> {
        self.value.split('.').collect()
    }
}

/// `ref:name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    /// Name under `component.refs`.
    pub name: String,
    /// Source span.
    pub span: Span,
}

/// The `<script>` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptBlock {
    /// Script text between the tags.
    pub content: String,
    /// Span of the text between the tags.
    pub content_span: Span,
    /// Span of the whole block including tags.
    pub span: Span,
}

/// The `<style>` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleBlock {
    /// Stylesheet text between the tags.
    pub content: String,
    /// Span of the text between the tags.
    pub content_span: Span,
}
