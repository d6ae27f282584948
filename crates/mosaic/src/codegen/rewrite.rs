// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Qualifies free identifiers in template expressions.
//!
//! Inside a renderer, component state is reachable as `root`, each-block
//! items by their context name, and helpers through `template.helpers`.
//! The rewriter walks an expression, classifies every reference by its
//! root name and records the prefix each one needs as a source edit:
//!
//! | root name                      | edit                         |
//! |--------------------------------|------------------------------|
//! | helper, in callee position     | `template.helpers.` prefix   |
//! | `event`, inside a handler      | none                         |
//! | each-block context             | none                         |
//! | explicit each-block index      | none                         |
//! | anything else                  | `root.` prefix               |
//!
//! The contexts an expression touched are returned in first-use order, so
//! callers know which scope values a deferred handler has to recover.

use super::code::Code;
use super::scope::Scope;
use super::splice::SourceEdits;
use crate::error::{CompileError, Result};
use crate::expr::{flatten_reference, is_reference_in, walk, Expr, ExprKind, Parent, Visit};
use std::collections::BTreeSet;

/// A rewritten expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The expression's source span, resolved through the recorded edits.
    pub snippet: Code,
    /// Contexts the expression reads, `root` included, in first-use order.
    pub contexts: Vec<String>,
}

/// Rewrites template expressions against a scope.
pub struct Rewriter<'a> {
    scope: &'a Scope,
    helpers: &'a BTreeSet<String>,
    event_handler: bool,
}

impl<'a> Rewriter<'a> {
    /// A rewriter for ordinary expressions.
    pub fn new(scope: &'a Scope, helpers: &'a BTreeSet<String>) -> Self {
        Self { scope, helpers, event_handler: false }
    }

    /// A rewriter for event handler arguments, where `event` is the
    /// handler's own parameter.
    pub fn for_event_handler(scope: &'a Scope, helpers: &'a BTreeSet<String>) -> Self {
        Self { scope, helpers, event_handler: true }
    }

    /// Records the edits for `expr` and returns its snippet.
    pub fn rewrite(&self, expr: &Expr, edits: &mut SourceEdits) -> Result<Rewrite> {
        let mut contexts = Vec::new();
        self.qualify(expr, edits, &mut contexts)?;
        Ok(Rewrite { snippet: Code::source(expr.span), contexts })
    }

    /// Rewrites an event handler call: the callee becomes a method of the
    /// component and every argument is qualified.
    pub fn rewrite_call_arguments(&self, call: &Expr, edits: &mut SourceEdits) -> Result<Rewrite> {
        let ExprKind::Call { callee, arguments } = &call.kind else {
            return Err(CompileError::parse("", call.span.start, "Expected call expression"));
        };

        let start = flatten_reference(callee).map_or(callee.span.start, |reference| reference.start);
        edits.insert(start, "component.")?;

        let mut contexts = Vec::new();
        for argument in arguments {
            self.qualify(argument, edits, &mut contexts)?;
        }
        Ok(Rewrite { snippet: Code::source(call.span), contexts })
    }

    fn qualify(&self, expr: &Expr, edits: &mut SourceEdits, contexts: &mut Vec<String>) -> Result<()> {
        walk(expr, &mut |node: &Expr, parent: Parent| -> Result<Visit> {
            if !is_reference_in(node, parent) {
                return Ok(Visit::Continue);
            }
            let Some(reference) = flatten_reference(node) else {
                return Ok(Visit::Continue);
            };
            let name = reference.name.as_str();

            if parent == Parent::Callee && self.helpers.contains(name) {
                edits.insert(reference.start, "template.helpers.")?;
            } else if self.event_handler && name == "event" {
                // the handler's own parameter
            } else if self.scope.is_context(name) {
                touch(contexts, name);
            } else if let Some(owner) = self.scope.index_owner(name) {
                touch(contexts, owner);
            } else {
                let prefix = match parent {
                    Parent::PropertyValue { shorthand: true } => format!("{}: root.", name),
                    _ => "root.".to_string(),
                };
                edits.insert(reference.start, prefix)?;
                touch(contexts, "root");
            }

            Ok(Visit::Skip)
        })
    }
}

fn touch(contexts: &mut Vec<String>, name: &str) {
    if !contexts.iter().any(|c| c == name) {
        contexts.push(name.to_string());
    }
}
