// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use super::code::Code;
use super::scope::Scope;
use std::rc::Rc;

/// Statements collected while walking one fragment.
///
/// The main fragment, every if-branch and every each-iteration gets its
/// own builder. Its scope decides the parameters of the generated
/// `update` function.
#[derive(Debug)]
pub struct RendererBuilder {
    /// Function name, e.g. `renderEachBlock_0`.
    pub name: String,
    /// Whether top-level nodes are inserted before an `anchor` parameter.
    pub use_anchor: bool,
    /// The lexical scope of the fragment.
    pub scope: Rc<Scope>,
    /// Run once when the renderer is created.
    pub init: Vec<Code>,
    /// Run on every `update` call.
    pub update: Vec<Code>,
    /// Run on `teardown`.
    pub teardown: Vec<Code>,
    /// Element to focus once mounted.
    pub autofocus: Option<String>,
}

impl RendererBuilder {
    /// An empty builder.
    pub fn new(name: impl Into<String>, use_anchor: bool, scope: Rc<Scope>) -> Self {
        Self {
            name: name.into(),
            use_anchor,
            scope,
            init: Vec::new(),
            update: Vec::new(),
            teardown: Vec::new(),
            autofocus: None,
        }
    }

    /// Freezes the builder into a renderer, appending the focus call when
    /// an element asked for it.
    pub fn finish(mut self, focus: impl FnOnce(&str) -> String) -> Renderer {
        if let Some(target) = &self.autofocus {
            self.init.push(Code::from(focus(target)));
        }

        Renderer {
            name: self.name,
            use_anchor: self.use_anchor,
            params: self.scope.context_chain().to_vec(),
            init: self.init,
            update: self.update,
            teardown: self.teardown,
        }
    }
}

/// A finished renderer function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    /// Function name.
    pub name: String,
    /// Whether the function takes an `anchor` parameter.
    pub use_anchor: bool,
    /// Parameters of `update`, outermost context first.
    pub params: Vec<String>,
    /// Creation statements.
    pub init: Vec<Code>,
    /// Update statements.
    pub update: Vec<Code>,
    /// Teardown statements.
    pub teardown: Vec<Code>,
}

impl Renderer {
    /// The JavaScript function declaration:
    ///
    /// ```text
    /// function renderMainFragment ( component, target ) {
    ///     ...init
    ///     return {
    ///         update: function ( root ) { ...update },
    ///         teardown: function () { ...teardown }
    ///     };
    /// }
    /// ```
    pub fn to_code(&self) -> Code {
        let anchor = if self.use_anchor { ", anchor" } else { "" };
        let mut out = code!(format!("function {} ( component, target{} ) {{\n", self.name, anchor));

        let init = Code::join(self.init.iter(), "\n\n");
        if !init.is_empty() {
            out.push(init.indent("\t"));
            out.push_str("\n\n");
        }

        out.push_str(&format!("\treturn {{\n\t\tupdate: function ( {} ) {{\n", self.params.join(", ")));
        let update = Code::join(self.update.iter(), "\n\n");
        if !update.is_empty() {
            out.push(update.indent("\t\t\t"));
            out.push_str("\n");
        }

        out.push_str("\t\t},\n\n\t\tteardown: function () {\n");
        let teardown = Code::join(self.teardown.iter(), "\n\n");
        if !teardown.is_empty() {
            out.push(teardown.indent("\t\t\t"));
            out.push_str("\n");
        }

        out.push_str("\t\t}\n\t};\n}");
        out
    }
}
