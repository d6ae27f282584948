// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template expressions.
//!
//! Expressions appear inside `{{ }}` tags, block openers, attribute values
//! and event handlers. They are a JavaScript subset: literals, identifiers,
//! member access, calls, unary and binary operators, the conditional
//! operator, and array/object literals. Parentheses are transparent.
//!
//! Besides the tree itself this module answers two questions code
//! generation keeps asking:
//!
//! - [`is_reference`]: does this node read a variable from the enclosing
//!   scope, given where it sits in its parent?
//! - [`flatten_reference`]: which root name and dotted keypath does a
//!   member chain such as `a.b.c` denote?

use crate::ast::Span;
use serde::{Deserialize, Serialize};

/// An expression node with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// The node payload.
    pub kind: ExprKind,
    /// Byte span in the component source.
    pub span: Span,
}

/// Expression node kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// A bare name.
    Identifier(String),
    /// A literal, kept as written.
    Literal(Literal),
    /// `[a, b]`
    Array(Vec<Expr>),
    /// `{ a: 1, b }`
    Object(Vec<Property>),
    /// `object.property` or `object[property]`.
    Member {
        /// The accessed object.
        object: Box<Expr>,
        /// The property. An [`ExprKind::Identifier`] when not computed.
        property: Box<Expr>,
        /// Whether the `[ ]` form was used.
        computed: bool,
    },
    /// `callee(arguments)`
    Call {
        /// The called expression.
        callee: Box<Expr>,
        /// Arguments in order.
        arguments: Vec<Expr>,
    },
    /// A prefix operator.
    Unary {
        /// The operator.
        operator: UnaryOp,
        /// The operand.
        argument: Box<Expr>,
    },
    /// An infix operator, logical operators included.
    Binary {
        /// The operator.
        operator: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// The condition.
        test: Box<Expr>,
        /// Value when truthy.
        consequent: Box<Expr>,
        /// Value when falsy.
        alternate: Box<Expr>,
    },
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    /// Literal category.
    pub kind: LiteralKind,
    /// Source text, quotes included for strings.
    pub raw: String,
}

/// Literal categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    /// Numeric literal.
    Number,
    /// String literal.
    String,
    /// `true` / `false`.
    Boolean,
    /// `null`.
    Null,
}

/// An object literal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// The key. An identifier, string or number unless `computed`.
    pub key: Expr,
    /// The value. For shorthand entries this is an identifier equal to the key.
    pub value: Expr,
    /// Whether the key was written as `[expr]`.
    pub computed: bool,
    /// Whether the entry was written as `{ name }`.
    pub shorthand: bool,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    Typeof,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BinaryOp {
    Nullish,
    Or,
    And,
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Instanceof,
    In,
    Pow,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Expr {
    /// Creates a node.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this node is a call expression.
    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExprKind::Call { .. })
    }

    /// The source text of this node.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}

/// The syntactic position a node occupies within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// The node is the whole expression.
    Root,
    /// `object` in `object.property`.
    MemberObject,
    /// `property` in `object.property` or `object[property]`.
    MemberProperty {
        /// Whether the `[ ]` form was used.
        computed: bool,
    },
    /// `callee` in `callee(...)`.
    Callee,
    /// An argument of a call.
    Argument,
    /// The key of an object literal entry.
    PropertyKey {
        /// Whether the key was written as `[expr]`.
        computed: bool,
    },
    /// The value of an object literal entry.
    PropertyValue {
        /// Whether the entry was written as `{ name }`.
        shorthand: bool,
    },
    /// An operand, list element or conditional branch.
    Operand,
}

/// What a visitor wants after seeing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the children.
    Continue,
    /// Leave the children alone.
    Skip,
}

/// Walks `expr` depth-first, pre-order, telling the visitor where each node
/// sits in its parent. Returning [`Visit::Skip`] prunes that subtree.
pub fn walk<'a, E, F>(expr: &'a Expr, visitor: &mut F) -> Result<(), E>
where
    F: FnMut(&'a Expr, Parent) -> Result<Visit, E>,
{
    walk_node(expr, Parent::Root, visitor)
}

fn walk_node<'a, E, F>(expr: &'a Expr, parent: Parent, visitor: &mut F) -> Result<(), E>
where
    F: FnMut(&'a Expr, Parent) -> Result<Visit, E>,
{
    if visitor(expr, parent)? == Visit::Skip {
        return Ok(());
    }

    match &expr.kind {
        ExprKind::Identifier(_) | ExprKind::Literal(_) => {}
        ExprKind::Array(items) => {
            for item in items {
                walk_node(item, Parent::Operand, visitor)?;
            }
        }
        ExprKind::Object(properties) => {
            for property in properties {
                if !property.shorthand {
                    walk_node(&property.key, Parent::PropertyKey { computed: property.computed }, visitor)?;
                }
                walk_node(&property.value, Parent::PropertyValue { shorthand: property.shorthand }, visitor)?;
            }
        }
        ExprKind::Member { object, property, computed } => {
            walk_node(object, Parent::MemberObject, visitor)?;
            walk_node(property, Parent::MemberProperty { computed: *computed }, visitor)?;
        }
        ExprKind::Call { callee, arguments } => {
            walk_node(callee, Parent::Callee, visitor)?;
            for argument in arguments {
                walk_node(argument, Parent::Argument, visitor)?;
            }
        }
        ExprKind::Unary { argument, .. } => walk_node(argument, Parent::Operand, visitor)?,
        ExprKind::Binary { left, right, .. } => {
            walk_node(left, Parent::Operand, visitor)?;
            walk_node(right, Parent::Operand, visitor)?;
        }
        ExprKind::Conditional { test, consequent, alternate } => {
            walk_node(test, Parent::Operand, visitor)?;
            walk_node(consequent, Parent::Operand, visitor)?;
            walk_node(alternate, Parent::Operand, visitor)?;
        }
    }

    Ok(())
}

/// Whether a free-standing expression is a variable reference.
pub fn is_reference(expr: &Expr) -> bool {
    is_reference_in(expr, Parent::Root)
}

/// Whether `expr`, sitting at `parent`, reads a variable.
///
/// A non-computed member chain is a reference when its innermost object is.
/// An identifier is a reference unless it names a property: the right side
/// of `a.b` or the key of `{ b: 1 }`.
pub fn is_reference_in(expr: &Expr, parent: Parent) -> bool {
    match &expr.kind {
        ExprKind::Member { object, computed, .. } => {
            !*computed && is_reference_in(object, Parent::MemberObject)
        }
        ExprKind::Identifier(_) => match parent {
            Parent::MemberProperty { computed } => computed,
            Parent::PropertyKey { computed } => computed,
            _ => true,
        },
        _ => false,
    }
}

/// The root name and full dotted keypath of a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatReference {
    /// The innermost identifier, e.g. `a` for `a.b.c`.
    pub name: String,
    /// Every segment joined with dots, e.g. `a.b.c`.
    pub keypath: String,
    /// Offset of the innermost identifier.
    pub start: usize,
}

/// Flattens a non-computed member chain down to its root identifier.
///
/// Returns `None` for anything that is not such a chain.
pub fn flatten_reference(expr: &Expr) -> Option<FlatReference> {
    let mut parts = Vec::new();
    let mut node = expr;

    loop {
        match &node.kind {
            ExprKind::Member { object, property, computed: false } => {
                match &property.kind {
                    ExprKind::Identifier(name) => parts.push(name.as_str()),
                    _ => return None,
                }
                node = object;
            }
            ExprKind::Identifier(name) => {
                parts.push(name.as_str());
                break;
            }
            _ => return None,
        }
    }

    let start = node.span.start;
    parts.reverse();
    Some(FlatReference {
        name: parts[0].to_string(),
        keypath: parts.join("."),
        start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: usize) -> Expr {
        Expr::new(ExprKind::Identifier(name.to_string()), Span::new(start, start + name.len()))
    }

    fn member(object: Expr, property: Expr, computed: bool) -> Expr {
        let span = Span::new(object.span.start, property.span.end);
        Expr::new(
            ExprKind::Member { object: Box::new(object), property: Box::new(property), computed },
            span,
        )
    }

    #[test]
    fn identifier_is_reference() {
        assert!(is_reference(&ident("foo", 0)));
    }

    #[test]
    fn static_member_chain_is_reference() {
        let chain = member(member(ident("a", 0), ident("b", 2), false), ident("c", 4), false);
        assert!(is_reference(&chain));

        let flat = flatten_reference(&chain).unwrap();
        assert_eq!(flat.name, "a");
        assert_eq!(flat.keypath, "a.b.c");
        assert_eq!(flat.start, 0);
    }

    #[test]
    fn computed_member_is_not_reference() {
        let chain = member(ident("a", 0), ident("b", 2), true);
        assert!(!is_reference(&chain));
        assert!(flatten_reference(&chain).is_none());
    }

    #[test]
    fn property_positions_are_not_references() {
        let name = ident("b", 2);
        assert!(!is_reference_in(&name, Parent::MemberProperty { computed: false }));
        assert!(is_reference_in(&name, Parent::MemberProperty { computed: true }));
        assert!(!is_reference_in(&name, Parent::PropertyKey { computed: false }));
        assert!(is_reference_in(&name, Parent::PropertyValue { shorthand: true }));
    }

    #[test]
    fn walk_can_skip_subtrees() {
        let chain = member(ident("a", 0), ident("b", 2), false);
        let call = Expr::new(
            ExprKind::Call { callee: Box::new(ident("f", 4)), arguments: vec![chain] },
            Span::new(4, 10),
        );

        let mut seen = Vec::new();
        walk::<(), _>(&call, &mut |node, parent| {
            seen.push(parent);
            if is_reference_in(node, parent) {
                Ok(Visit::Skip)
            } else {
                Ok(Visit::Continue)
            }
        })
        .unwrap();

        assert_eq!(seen, vec![Parent::Root, Parent::Callee, Parent::Argument]);
    }
}
