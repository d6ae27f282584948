// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Lexical scopes and generated names.
//!
//! A [`Scope`] records the names introduced by enclosing `{{#each}}`
//! blocks. Scopes are immutable and linked to their parent through an
//! [`Rc`], so a child can hold on to everything above it while siblings
//! branch off the same parent.
//!
//! [`NameAllocator`] hands out JavaScript identifiers that never collide
//! within one compilation: `div`, `div_1`, `div_2`, and so on, skipping
//! names already claimed by contexts.

use crate::error::{CompileError, Result};
use crate::expr::{flatten_reference, is_reference, Expr};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

/// The list a context name iterates over.
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    /// The name bound to each item.
    pub context: String,
    /// The iterated expression.
    pub expression: Expr,
}

/// One level of lexical scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    /// Context names in the order they were introduced.
    contexts: Vec<String>,
    /// Explicit index name → the context it belongs to.
    indexes: HashMap<String, String>,
    /// Context → name of its index variable.
    index_names: HashMap<String, String>,
    /// Context → name of the variable holding its list.
    list_names: HashMap<String, String>,
    /// Parameter names of this scope's `update` function.
    context_chain: Vec<String>,
    /// Set on scopes opened by an each block.
    iteration: Option<Iteration>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// The component's top-level scope, whose only parameter is `root`.
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope {
            contexts: Vec::new(),
            indexes: HashMap::new(),
            index_names: HashMap::new(),
            list_names: HashMap::new(),
            context_chain: vec!["root".to_string()],
            iteration: None,
            parent: None,
        })
    }

    /// A child scope for an if block: same names, new parent link.
    pub fn enter_if(self: &Rc<Self>) -> Rc<Scope> {
        Rc::new(Scope {
            iteration: None,
            parent: Some(Rc::clone(self)),
            ..Scope::clone(self)
        })
    }

    /// A child scope for an each block binding `context` (and the index
    /// variable `index_name`) to items of the list held in `list_name`.
    ///
    /// `explicit_index` is true when the template named the index, making
    /// it visible to expressions.
    pub fn enter_each(
        self: &Rc<Self>,
        expression: &Expr,
        context: &str,
        index_name: &str,
        explicit_index: bool,
        list_name: &str,
    ) -> Rc<Scope> {
        let mut scope = Scope {
            iteration: Some(Iteration { context: context.to_string(), expression: expression.clone() }),
            parent: Some(Rc::clone(self)),
            ..Scope::clone(self)
        };

        if !scope.contexts.iter().any(|c| c == context) {
            scope.contexts.push(context.to_string());
        }
        if explicit_index {
            scope.indexes.insert(index_name.to_string(), context.to_string());
        }
        scope.index_names.insert(context.to_string(), index_name.to_string());
        scope.list_names.insert(context.to_string(), list_name.to_string());
        scope
            .context_chain
            .extend([list_name.to_string(), context.to_string(), index_name.to_string()]);

        Rc::new(scope)
    }

    /// Context names visible here, outermost first.
    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    /// Whether `name` is a context bound by an enclosing each block.
    pub fn is_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c == name)
    }

    /// The context an explicit index name belongs to.
    pub fn index_owner(&self, name: &str) -> Option<&str> {
        self.indexes.get(name).map(String::as_str)
    }

    /// Name of the index variable for `context`.
    pub fn index_name(&self, context: &str) -> Option<&str> {
        self.index_names.get(context).map(String::as_str)
    }

    /// Name of the list variable for `context`.
    pub fn list_name(&self, context: &str) -> Option<&str> {
        self.list_names.get(context).map(String::as_str)
    }

    /// Fails when an each block opened here would bind `context` or
    /// `index_name` twice, since both become `update` parameters.
    pub fn check_each_names(&self, context: &str, index_name: &str, offset: usize) -> Result<()> {
        let duplicate = [context, index_name]
            .into_iter()
            .find(|name| self.context_chain.iter().any(|bound| bound == name))
            .or((context == index_name).then_some(context));

        match duplicate {
            Some(name) => Err(CompileError::ShadowedContext { name: name.to_string(), offset }),
            None => Ok(()),
        }
    }

    /// Parameters of the `update` function of renderers in this scope.
    pub fn context_chain(&self) -> &[String] {
        &self.context_chain
    }

    /// Resolves the top-level state key a binding on `name` writes back to.
    ///
    /// Walks outward through each blocks: `cell` in
    /// `{{#each row.cells as cell}}` inside `{{#each rows as row}}` resolves
    /// to `rows`. Fails when a list along the way is not a plain reference,
    /// since writing into it could never reach component state.
    pub fn binding_root(&self, name: &str, offset: usize) -> Result<String> {
        let mut property = name.to_string();
        let mut scope = Some(self);

        while let Some(current) = scope {
            if let Some(iteration) = &current.iteration {
                if iteration.context == property {
                    if !is_reference(&iteration.expression) {
                        return Err(CompileError::ReadOnlyBinding { name: property, offset });
                    }
                    if let Some(flat) = flatten_reference(&iteration.expression) {
                        property = flat.name;
                    }
                }
            }
            scope = current.parent.as_deref();
        }

        Ok(property)
    }
}

/// Hands out collision-free identifiers.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    counts: BTreeMap<String, usize>,
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Creates an allocator with `reserved` names already taken.
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            counts: BTreeMap::new(),
            taken: reserved.into_iter().map(str::to_string).collect(),
        }
    }

    /// Marks `name` as taken without allocating it.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Returns `base`, or `base_N` for the smallest free `N`.
    pub fn allocate(&mut self, base: &str) -> String {
        let base = sanitize(base);
        let count = self.counts.entry(base.clone()).or_insert(0);
        loop {
            let name = if *count == 0 { base.clone() } else { format!("{}_{}", base, count) };
            *count += 1;
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

/// Turns arbitrary text (a tag name like `my-widget`) into an identifier.
fn sanitize(base: &str) -> String {
    let mut name: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    #[test]
    fn allocator_numbers_repeats() {
        let mut names = NameAllocator::new(["root", "text"]);
        assert_eq!(names.allocate("div"), "div");
        assert_eq!(names.allocate("div"), "div_1");
        assert_eq!(names.allocate("div"), "div_2");
        assert_eq!(names.allocate("text"), "text_1");
        assert_eq!(names.allocate("my-widget"), "my_widget");
    }

    #[test]
    fn allocator_skips_reserved_suffixes() {
        let mut names = NameAllocator::new(["p_1"]);
        assert_eq!(names.allocate("p"), "p");
        assert_eq!(names.allocate("p"), "p_2");
    }

    #[test]
    fn each_scope_extends_chain() {
        let root = Scope::root();
        let list = parse_expression("items").unwrap();
        let scope = root.enter_each(&list, "item", "i", true, "eachBlock_0_value");

        assert_eq!(scope.context_chain(), &["root", "eachBlock_0_value", "item", "i"]);
        assert!(scope.is_context("item"));
        assert_eq!(scope.index_owner("i"), Some("item"));
        assert_eq!(scope.list_name("item"), Some("eachBlock_0_value"));
        assert!(!root.is_context("item"));
    }

    #[test]
    fn implicit_index_is_not_visible() {
        let root = Scope::root();
        let list = parse_expression("items").unwrap();
        let scope = root.enter_each(&list, "item", "item__index", false, "eachBlock_0_value");
        assert_eq!(scope.index_owner("item__index"), None);
        assert_eq!(scope.index_name("item"), Some("item__index"));
    }

    #[test]
    fn binding_root_walks_nested_lists() {
        let rows = parse_expression("rows").unwrap();
        let cells = parse_expression("row.cells").unwrap();
        let outer = Scope::root().enter_each(&rows, "row", "row__index", false, "eachBlock_0_value");
        let inner = outer.enter_if().enter_each(&cells, "cell", "cell__index", false, "eachBlock_1_value");

        assert_eq!(inner.binding_root("cell", 0).unwrap(), "rows");
        assert_eq!(inner.binding_root("row", 0).unwrap(), "rows");
    }

    #[test]
    fn binding_into_computed_list_is_read_only() {
        let list = parse_expression("items.filter(visible)").unwrap();
        let scope = Scope::root().enter_each(&list, "item", "item__index", false, "eachBlock_0_value");
        let error = scope.binding_root("item", 7).unwrap_err();
        assert!(matches!(error, CompileError::ReadOnlyBinding { ref name, offset: 7 } if name == "item"));
    }

    #[test]
    fn each_names_must_be_fresh() {
        let list = parse_expression("rows").unwrap();
        let scope = Scope::root().enter_each(&list, "row", "i", true, "eachBlock_0_value");

        assert!(scope.check_each_names("cell", "cell__index", 9).is_ok());
        for (context, index) in [("row", "row__index"), ("cell", "i"), ("root", "root__index"), ("x", "x")] {
            let error = scope.check_each_names(context, index, 9).unwrap_err();
            assert!(matches!(error, CompileError::ShadowedContext { offset: 9, .. }));
        }
    }
}
