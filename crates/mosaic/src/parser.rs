// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template parser.
//!
//! Parsing is driven by the pest grammar in `template.pest`, which covers
//! markup and the expression subset in one pass so that every span is an
//! absolute byte offset into the component source. This module turns the
//! resulting pairs into [`crate::ast`] nodes and applies the checks the
//! grammar cannot express:
//!
//! - at most one `<script>` and one `<style>` block
//! - event handlers must be call expressions
//! - unknown `prefix:name` directives are rejected
//! - leading and trailing whitespace is trimmed from fragments, element
//!   children and block children
//!
//! Binary operator precedence is resolved with [`PrattParser`].

use crate::ast::{
    Attribute, AttributeValue, Binding, Chunk, Comment, EachBlock, Element, EventHandler,
    Fragment, IfBlock, MustacheTag, Node, PlainAttribute, Ref, ScriptBlock, Span, StyleBlock,
    Template, Text,
};
use crate::error::{CompileError, Result};
use crate::expr::{BinaryOp, Expr, ExprKind, Literal, LiteralKind, Property, UnaryOp};
use lazy_static::lazy_static;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

/// The pest parser generated from `template.pest`.
#[derive(Parser)]
#[grammar = "template.pest"]
pub struct TemplateParser;

lazy_static! {
    static ref PRATT: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::op_nullish, Assoc::Left))
        .op(Op::infix(Rule::op_or, Assoc::Left))
        .op(Op::infix(Rule::op_and, Assoc::Left))
        .op(Op::infix(Rule::op_strict_eq, Assoc::Left)
            | Op::infix(Rule::op_strict_ne, Assoc::Left)
            | Op::infix(Rule::op_eq, Assoc::Left)
            | Op::infix(Rule::op_ne, Assoc::Left))
        .op(Op::infix(Rule::op_lt, Assoc::Left)
            | Op::infix(Rule::op_gt, Assoc::Left)
            | Op::infix(Rule::op_le, Assoc::Left)
            | Op::infix(Rule::op_ge, Assoc::Left)
            | Op::infix(Rule::op_instanceof, Assoc::Left)
            | Op::infix(Rule::op_in, Assoc::Left))
        .op(Op::infix(Rule::op_add, Assoc::Left) | Op::infix(Rule::op_sub, Assoc::Left))
        .op(Op::infix(Rule::op_mul, Assoc::Left)
            | Op::infix(Rule::op_div, Assoc::Left)
            | Op::infix(Rule::op_rem, Assoc::Left))
        .op(Op::infix(Rule::op_pow, Assoc::Right));
}

/// Parses a component source into a [`Template`].
pub fn parse(source: &str) -> Result<Template> {
    let mut pairs = TemplateParser::parse(Rule::template, source)
        .map_err(|error| pest_error(source, error))?;
    let root = pairs
        .next()
        .ok_or_else(|| CompileError::parse(source, 0, "Empty parse result"))?;

    let builder = Builder { source };
    let mut children = Vec::new();
    let mut js = None;
    let mut css = None;

    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::EOI => {}
            Rule::script_block => {
                let start = pair.as_span().start();
                if js.is_some() {
                    return Err(CompileError::parse(
                        source,
                        start,
                        "You can only have one <script> tag per component",
                    ));
                }
                js = Some(builder.script(pair)?);
            }
            Rule::style_block => {
                let start = pair.as_span().start();
                if css.is_some() {
                    return Err(CompileError::parse(
                        source,
                        start,
                        "You can only have one <style> tag per component",
                    ));
                }
                css = Some(builder.style(pair)?);
            }
            _ => {
                if let Some(node) = builder.node(pair)? {
                    children.push(node);
                }
            }
        }
    }

    trim_edges(&mut children);
    debug!(nodes = children.len(), script = js.is_some(), style = css.is_some(), "parsed template");

    Ok(Template {
        html: Fragment { children, span: Span::new(0, source.len()) },
        js,
        css,
    })
}

/// Parses a standalone expression. Spans are relative to `source`.
pub fn parse_expression(source: &str) -> Result<Expr> {
    let mut pairs = TemplateParser::parse(Rule::expression, source)
        .map_err(|error| pest_error(source, error))?;
    let pair = pairs
        .next()
        .ok_or_else(|| CompileError::parse(source, 0, "Expected expression"))?;

    let end = pair.as_span().end();
    if end != source.trim_end().len() {
        return Err(CompileError::parse(source, end, "Unexpected token"));
    }

    Builder { source }.expression(pair)
}

fn pest_error(source: &str, error: pest::error::Error<Rule>) -> CompileError {
    let offset = match error.location {
        pest::error::InputLocation::Pos(pos) => pos,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    let error = error.renamed_rules(|rule| rule_name(rule).to_string());
    CompileError::parse(source, offset, error.variant.message().to_string())
}

fn rule_name(rule: &Rule) -> &'static str {
    match rule {
        Rule::expression | Rule::binary_expr | Rule::unary_expr | Rule::postfix_expr => "expression",
        Rule::identifier | Rule::each_context | Rule::each_index => "identifier",
        Rule::property_name => "property name",
        Rule::tag_name | Rule::void_tag_name => "tag name",
        Rule::attribute_name => "attribute name",
        Rule::binding_path => "binding keypath",
        Rule::text => "text",
        Rule::mustache | Rule::value_mustache => "{{ }} tag",
        Rule::if_block => "{{#if}} block",
        Rule::each_block => "{{#each}} block",
        Rule::normal_element | Rule::void_element => "element",
        Rule::comment => "comment",
        Rule::script_block => "<script>",
        Rule::style_block => "<style>",
        Rule::EOI => "end of input",
        Rule::string => "string",
        Rule::number => "number",
        _ => "token",
    }
}

fn span_of(pair: &Pair<Rule>) -> Span {
    let span = pair.as_span();
    Span::new(span.start(), span.end())
}

struct Builder<'s> {
    source: &'s str,
}

impl<'s> Builder<'s> {
    fn error(&self, offset: usize, message: impl Into<String>) -> CompileError {
        CompileError::parse(self.source, offset, message)
    }

    fn node(&self, pair: Pair<'_, Rule>) -> Result<Option<Node>> {
        let span = span_of(&pair);
        let node = match pair.as_rule() {
            Rule::text => Node::Text(Text { data: pair.as_str().to_string(), span }),
            Rule::comment => {
                let data = pair
                    .into_inner()
                    .next()
                    .map(|inner| inner.as_str().to_string())
                    .unwrap_or_default();
                Node::Comment(Comment { data, span })
            }
            Rule::mustache => {
                let expression = self.first_expression(pair, span)?;
                Node::MustacheTag(MustacheTag { expression, span })
            }
            Rule::if_block => self.if_block(pair, span)?,
            Rule::each_block => self.each_block(pair, span)?,
            Rule::normal_element | Rule::void_element => self.element(pair, span)?,
            Rule::EOI => return Ok(None),
            other => return Err(self.error(span.start, format!("Unexpected {:?}", other))),
        };
        Ok(Some(node))
    }

    fn children<'p>(&self, pairs: impl Iterator<Item = Pair<'p, Rule>>) -> Result<Vec<Node>> {
        let mut children = Vec::new();
        for pair in pairs {
            if let Some(node) = self.node(pair)? {
                children.push(node);
            }
        }
        trim_edges(&mut children);
        Ok(children)
    }

    fn first_expression(&self, pair: Pair<'_, Rule>, span: Span) -> Result<Expr> {
        let inner = pair
            .into_inner()
            .next()
            .ok_or_else(|| self.error(span.start, "Expected expression"))?;
        self.expression(inner)
    }

    fn if_block(&self, pair: Pair<'_, Rule>, span: Span) -> Result<Node> {
        let mut inner = pair.into_inner();
        let expression = inner
            .next()
            .ok_or_else(|| self.error(span.start, "Expected {{#if}} condition"))?;
        let expression = self.expression(expression)?;
        let children = self.children(inner)?;
        Ok(Node::IfBlock(IfBlock { expression, children, span }))
    }

    fn each_block(&self, pair: Pair<'_, Rule>, span: Span) -> Result<Node> {
        let mut inner = pair.into_inner().peekable();
        let expression = inner
            .next()
            .ok_or_else(|| self.error(span.start, "Expected {{#each}} expression"))?;
        let expression = self.expression(expression)?;
        let context = inner
            .next()
            .filter(|p| p.as_rule() == Rule::each_context)
            .map(|p| p.as_str().to_string())
            .ok_or_else(|| self.error(span.start, "Expected {{#each}} context name"))?;
        let index = match inner.peek() {
            Some(p) if p.as_rule() == Rule::each_index => inner.next().map(|p| p.as_str().to_string()),
            _ => None,
        };
        let children = self.children(inner)?;
        Ok(Node::EachBlock(EachBlock { expression, context, index, children, span }))
    }

    fn element(&self, pair: Pair<'_, Rule>, span: Span) -> Result<Node> {
        let mut name = String::new();
        let mut attributes = Vec::new();
        let mut nodes = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::tag_name | Rule::void_tag_name => name = inner.as_str().to_string(),
                Rule::plain_attribute
                | Rule::event_handler
                | Rule::binding
                | Rule::ref_directive
                | Rule::unknown_directive => attributes.push(self.attribute(inner)?),
                _ => nodes.push(inner),
            }
        }

        let children = self.children(nodes.into_iter())?;
        Ok(Node::Element(Element { name, attributes, children, span }))
    }

    fn attribute(&self, pair: Pair<'_, Rule>) -> Result<Attribute> {
        let span = span_of(&pair);
        let rule = pair.as_rule();
        let mut inner = pair.into_inner();

        match rule {
            Rule::event_handler => {
                let name = self.next_str(&mut inner, span)?;
                let expression = inner
                    .next()
                    .ok_or_else(|| self.error(span.start, "Expected event handler"))?;
                let expression = self.expression(expression)?;
                if !expression.is_call() {
                    return Err(self.error(expression.span.start, "Expected call expression"));
                }
                Ok(Attribute::EventHandler(EventHandler { name, expression, span }))
            }
            Rule::binding => {
                let name = self.next_str(&mut inner, span)?;
                let path = inner
                    .next()
                    .ok_or_else(|| self.error(span.start, "Expected binding keypath"))?;
                Ok(Attribute::Binding(Binding {
                    name,
                    value: path.as_str().to_string(),
                    value_span: span_of(&path),
                    span,
                }))
            }
            Rule::ref_directive => {
                let name = self.next_str(&mut inner, span)?;
                Ok(Attribute::Ref(Ref { name, span }))
            }
            Rule::unknown_directive => {
                let directive = self.next_str(&mut inner, span)?;
                Err(CompileError::UnsupportedDirective { directive, offset: span.start })
            }
            _ => {
                let name = self.next_str(&mut inner, span)?;
                let value = match inner.next() {
                    Some(value) => AttributeValue::Chunks(self.chunks(value)?),
                    None => AttributeValue::BooleanTrue,
                };
                Ok(Attribute::Attribute(PlainAttribute { name, value, span }))
            }
        }
    }

    fn next_str<'p>(&self, inner: &mut impl Iterator<Item = Pair<'p, Rule>>, span: Span) -> Result<String> {
        inner
            .next()
            .map(|p| p.as_str().to_string())
            .ok_or_else(|| self.error(span.start, "Expected name"))
    }

    fn chunks(&self, pair: Pair<'_, Rule>) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for inner in pair.into_inner() {
            let span = span_of(&inner);
            match inner.as_rule() {
                Rule::value_mustache => {
                    chunks.push(Chunk::Expression(self.first_expression(inner, span)?));
                }
                _ => chunks.push(Chunk::Text(Text { data: unescape(inner.as_str()), span })),
            }
        }
        Ok(chunks)
    }

    fn script(&self, pair: Pair<'_, Rule>) -> Result<ScriptBlock> {
        let span = span_of(&pair);
        let content = pair
            .into_inner()
            .find(|p| p.as_rule() == Rule::script_content)
            .ok_or_else(|| self.error(span.start, "Expected script content"))?;
        Ok(ScriptBlock {
            content: content.as_str().to_string(),
            content_span: span_of(&content),
            span,
        })
    }

    fn style(&self, pair: Pair<'_, Rule>) -> Result<StyleBlock> {
        let span = span_of(&pair);
        let content = pair
            .into_inner()
            .find(|p| p.as_rule() == Rule::style_content)
            .ok_or_else(|| self.error(span.start, "Expected style content"))?;
        Ok(StyleBlock {
            content: content.as_str().to_string(),
            content_span: span_of(&content),
        })
    }

    // ----- expressions -----

    fn expression(&self, pair: Pair<'_, Rule>) -> Result<Expr> {
        let span = span_of(&pair);
        match pair.as_rule() {
            Rule::expression => {
                let mut inner = pair.into_inner();
                let test = inner
                    .next()
                    .ok_or_else(|| self.error(span.start, "Expected expression"))?;
                let test = self.binary(test)?;
                match (inner.next(), inner.next()) {
                    (Some(consequent), Some(alternate)) => Ok(Expr::new(
                        ExprKind::Conditional {
                            test: Box::new(test),
                            consequent: Box::new(self.expression(consequent)?),
                            alternate: Box::new(self.expression(alternate)?),
                        },
                        span,
                    )),
                    _ => Ok(test),
                }
            }
            Rule::binary_expr => self.binary(pair),
            _ => self.primary(pair),
        }
    }

    fn binary(&self, pair: Pair<'_, Rule>) -> Result<Expr> {
        // Operands carry their outer span so parenthesised groups stay inside
        // the composite node.
        PRATT
            .map_primary(|primary| self.unary(primary))
            .map_infix(|left, op, right| {
                let ((left, left_span), (right, right_span)) = (left?, right?);
                let operator = binary_operator(op.as_rule())
                    .ok_or_else(|| self.error(op.as_span().start(), "Unknown operator"))?;
                let span = Span::new(left_span.start, right_span.end);
                Ok((
                    Expr::new(
                        ExprKind::Binary { operator, left: Box::new(left), right: Box::new(right) },
                        span,
                    ),
                    span,
                ))
            })
            .parse(pair.into_inner())
            .map(|(expr, _)| expr)
    }

    /// Parses a `unary_expr`, returning the node and the pair's full span.
    fn unary(&self, pair: Pair<'_, Rule>) -> Result<(Expr, Span)> {
        let span = span_of(&pair);
        let mut operators = Vec::new();
        let mut operand = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::op_not => operators.push((UnaryOp::Not, inner.as_span().start())),
                Rule::op_neg => operators.push((UnaryOp::Minus, inner.as_span().start())),
                Rule::op_pos => operators.push((UnaryOp::Plus, inner.as_span().start())),
                Rule::op_typeof => operators.push((UnaryOp::Typeof, inner.as_span().start())),
                _ => operand = Some(self.postfix(inner)?),
            }
        }

        let mut expr = operand.ok_or_else(|| self.error(span.start, "Expected operand"))?;
        for (operator, start) in operators.into_iter().rev() {
            expr = Expr::new(ExprKind::Unary { operator, argument: Box::new(expr) }, Span::new(start, span.end));
        }
        Ok((expr, span))
    }

    fn postfix(&self, pair: Pair<'_, Rule>) -> Result<Expr> {
        let span = span_of(&pair);
        let mut inner = pair.into_inner();
        let primary = inner
            .next()
            .ok_or_else(|| self.error(span.start, "Expected expression"))?;
        let mut expr = self.primary(primary)?;

        for op in inner {
            let op_span = span_of(&op);
            let start = span.start;
            expr = match op.as_rule() {
                Rule::static_member => {
                    let property = op
                        .into_inner()
                        .next()
                        .ok_or_else(|| self.error(op_span.start, "Expected property name"))?;
                    let property = Expr::new(
                        ExprKind::Identifier(property.as_str().to_string()),
                        span_of(&property),
                    );
                    Expr::new(
                        ExprKind::Member { object: Box::new(expr), property: Box::new(property), computed: false },
                        Span::new(start, op_span.end),
                    )
                }
                Rule::computed_member => {
                    let property = self.first_expression(op, op_span)?;
                    Expr::new(
                        ExprKind::Member { object: Box::new(expr), property: Box::new(property), computed: true },
                        Span::new(start, op_span.end),
                    )
                }
                _ => {
                    let arguments = op
                        .into_inner()
                        .map(|argument| self.expression(argument))
                        .collect::<Result<Vec<_>>>()?;
                    Expr::new(
                        ExprKind::Call { callee: Box::new(expr), arguments },
                        Span::new(start, op_span.end),
                    )
                }
            };
        }

        Ok(expr)
    }

    fn primary(&self, pair: Pair<'_, Rule>) -> Result<Expr> {
        let span = span_of(&pair);
        let raw = pair.as_str();
        let literal = |kind| Ok(Expr::new(ExprKind::Literal(Literal { kind, raw: raw.to_string() }), span));

        match pair.as_rule() {
            Rule::number => literal(LiteralKind::Number),
            Rule::string => literal(LiteralKind::String),
            Rule::boolean => literal(LiteralKind::Boolean),
            Rule::null_literal => literal(LiteralKind::Null),
            Rule::identifier => Ok(Expr::new(ExprKind::Identifier(pair.as_str().to_string()), span)),
            Rule::expression | Rule::binary_expr => self.expression(pair),
            Rule::array_literal => {
                let items = pair
                    .into_inner()
                    .map(|item| self.expression(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::new(ExprKind::Array(items), span))
            }
            Rule::object_literal => {
                let properties = pair
                    .into_inner()
                    .map(|property| self.property(property))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::new(ExprKind::Object(properties), span))
            }
            other => Err(self.error(span.start, format!("Unexpected {:?} in expression", other))),
        }
    }

    fn property(&self, pair: Pair<'_, Rule>) -> Result<Property> {
        let span = span_of(&pair);
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| self.error(span.start, "Expected property"))?;

        match first.as_rule() {
            Rule::shorthand_property => {
                let name = first
                    .into_inner()
                    .next()
                    .ok_or_else(|| self.error(span.start, "Expected property name"))?;
                let key = Expr::new(ExprKind::Identifier(name.as_str().to_string()), span_of(&name));
                Ok(Property { value: key.clone(), key, computed: false, shorthand: true })
            }
            Rule::computed_key => {
                let key_span = span_of(&first);
                let key = self.first_expression(first, key_span)?;
                let value = inner
                    .next()
                    .ok_or_else(|| self.error(span.end, "Expected property value"))?;
                Ok(Property { key, value: self.expression(value)?, computed: true, shorthand: false })
            }
            _ => {
                let key_pair = first
                    .into_inner()
                    .next()
                    .ok_or_else(|| self.error(span.start, "Expected property key"))?;
                let key = match key_pair.as_rule() {
                    Rule::property_name => {
                        Expr::new(ExprKind::Identifier(key_pair.as_str().to_string()), span_of(&key_pair))
                    }
                    _ => self.primary(key_pair)?,
                };
                let value = inner
                    .next()
                    .ok_or_else(|| self.error(span.end, "Expected property value"))?;
                Ok(Property { key, value: self.expression(value)?, computed: false, shorthand: false })
            }
        }
    }
}

fn binary_operator(rule: Rule) -> Option<BinaryOp> {
    Some(match rule {
        Rule::op_nullish => BinaryOp::Nullish,
        Rule::op_or => BinaryOp::Or,
        Rule::op_and => BinaryOp::And,
        Rule::op_strict_eq => BinaryOp::StrictEq,
        Rule::op_strict_ne => BinaryOp::StrictNe,
        Rule::op_eq => BinaryOp::Eq,
        Rule::op_ne => BinaryOp::Ne,
        Rule::op_le => BinaryOp::Le,
        Rule::op_ge => BinaryOp::Ge,
        Rule::op_lt => BinaryOp::Lt,
        Rule::op_gt => BinaryOp::Gt,
        Rule::op_instanceof => BinaryOp::Instanceof,
        Rule::op_in => BinaryOp::In,
        Rule::op_pow => BinaryOp::Pow,
        Rule::op_add => BinaryOp::Add,
        Rule::op_sub => BinaryOp::Sub,
        Rule::op_mul => BinaryOp::Mul,
        Rule::op_div => BinaryOp::Div,
        Rule::op_rem => BinaryOp::Rem,
        _ => return None,
    })
}

/// Removes backslash escapes from attribute text.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Strips leading whitespace from the first text child and trailing
/// whitespace from the last, dropping texts that end up empty.
fn trim_edges(children: &mut Vec<Node>) {
    while let Some(Node::Text(text)) = children.first_mut() {
        let trimmed = text.data.trim_start();
        text.span.start += text.data.len() - trimmed.len();
        text.data = trimmed.to_string();
        if !text.data.is_empty() {
            break;
        }
        children.remove(0);
    }

    while let Some(Node::Text(text)) = children.last_mut() {
        let trimmed = text.data.trim_end();
        text.span.end -= text.data.len() - trimmed.len();
        text.data = trimmed.to_string();
        if !text.data.is_empty() {
            break;
        }
        children.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_child(source: &str) -> Node {
        let template = parse(source).unwrap();
        assert_eq!(template.html.children.len(), 1, "{:#?}", template.html.children);
        template.html.children.into_iter().next().unwrap()
    }

    #[test]
    fn parses_element_with_text() {
        match only_child("  <p>  hello  </p>\n") {
            Node::Element(element) => {
                assert_eq!(element.name, "p");
                match &element.children[0] {
                    Node::Text(text) => assert_eq!(text.data, "hello"),
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn mustache_spans_are_absolute() {
        let source = "<p>{{ name.first }}</p>";
        let Node::Element(element) = only_child(source) else { panic!() };
        let Node::MustacheTag(tag) = &element.children[0] else { panic!() };
        assert_eq!(tag.expression.text(source), "name.first");
    }

    #[test]
    fn parses_each_with_index() {
        let source = "{{#each items as item, i}}<li>{{i}}: {{item}}</li>{{/each}}";
        let Node::EachBlock(block) = only_child(source) else { panic!() };
        assert_eq!(block.context, "item");
        assert_eq!(block.index.as_deref(), Some("i"));
        assert_eq!(block.expression.text(source), "items");
        assert_eq!(block.children.len(), 1);
    }

    #[test]
    fn parses_if_block_and_trims_children() {
        let source = "{{#if visible}}\n  <span>hi</span>\n{{/if}}";
        let Node::IfBlock(block) = only_child(source) else { panic!() };
        assert_eq!(block.children.len(), 1);
        assert!(matches!(block.children[0], Node::Element(_)));
    }

    #[test]
    fn parses_attribute_chunks() {
        let source = "<div class='a {{b}} \\'c\\''></div>";
        let Node::Element(element) = only_child(source) else { panic!() };
        let Attribute::Attribute(attribute) = &element.attributes[0] else { panic!() };
        let AttributeValue::Chunks(chunks) = &attribute.value else { panic!() };
        assert_eq!(chunks.len(), 3);
        assert!(matches!(&chunks[2], Chunk::Text(text) if text.data == " 'c'"));
    }

    #[test]
    fn parses_directives() {
        let source = "<input bind:value='user.name' on:focus='select(event, 1)' ref:field autofocus>";
        let Node::Element(element) = only_child(source) else { panic!() };
        assert_eq!(element.attributes.len(), 4);
        assert!(matches!(&element.attributes[0], Attribute::Binding(b) if b.value == "user.name"));
        assert!(matches!(&element.attributes[1], Attribute::EventHandler(h) if h.name == "focus"));
        assert!(matches!(&element.attributes[2], Attribute::Ref(r) if r.name == "field"));
        assert!(matches!(
            &element.attributes[3],
            Attribute::Attribute(a) if a.value == AttributeValue::BooleanTrue
        ));
    }

    #[test]
    fn event_handler_must_be_call() {
        let error = parse("<button on:click='count'>+</button>").unwrap_err();
        assert!(error.to_string().contains("Expected call expression"));
    }

    #[test]
    fn unknown_directive_is_rejected() {
        let error = parse("<div class:active='{{x}}'></div>").unwrap_err();
        assert!(matches!(error, CompileError::UnsupportedDirective { ref directive, .. } if directive == "class"));
    }

    #[test]
    fn only_one_script_allowed() {
        let error = parse("<script>a</script><script>b</script>").unwrap_err();
        assert!(error.to_string().contains("only have one <script>"));
    }

    #[test]
    fn mismatched_closing_tag_is_error() {
        assert!(parse("<div><p></div>").is_err());
    }

    #[test]
    fn operator_precedence() {
        let expr = parse_expression("a + b * c").unwrap();
        let ExprKind::Binary { operator, right, .. } = &expr.kind else { panic!() };
        assert_eq!(*operator, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { operator: BinaryOp::Mul, .. }));
        assert_eq!(expr.span, Span::new(0, 9));
    }

    #[test]
    fn parses_calls_members_and_objects() {
        let source = "set({ count: count + 1, items })";
        let expr = parse_expression(source).unwrap();
        let ExprKind::Call { callee, arguments } = &expr.kind else { panic!() };
        assert_eq!(callee.text(source), "set");
        let ExprKind::Object(properties) = &arguments[0].kind else { panic!() };
        assert_eq!(properties.len(), 2);
        assert!(properties[1].shorthand);
    }

    #[test]
    fn parenthesised_groups_stay_inside_outer_spans() {
        let source = "(a || b) && !c";
        let expr = parse_expression(source).unwrap();
        assert_eq!(expr.span, Span::new(0, source.len()));
        let ExprKind::Binary { left, right, .. } = &expr.kind else { panic!() };
        assert_eq!(left.text(source), "a || b");
        assert_eq!(right.text(source), "!c");

        for source in ["a * (b + c)", "!(a && b)", "(items).length", "(f)(x)", "(a) + (b)"] {
            let expr = parse_expression(source).unwrap();
            assert_eq!(expr.text(source), source);
        }
    }
}
