// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! JavaScript generation.
//!
//! [`generate`] walks the template once, depth first. Every fragment (the
//! main one, each if-branch, each iteration body) collects statements in a
//! [`RendererBuilder`]; elements, text and interpolations add to the
//! current builder, while if and each blocks open a child builder with a
//! child [`Scope`]. Finished renderers are kept in the order they close,
//! so a block's renderer always precedes the renderer that calls it.
//!
//! Expressions are never copied as text during the walk. They are emitted
//! as source spans plus [`SourceEdits`], and the whole module is resolved
//! against the untouched source in one final [`Splice`].

#[macro_use]
mod code;
pub mod binding;
pub mod component;
pub mod dom;
pub mod renderer;
pub mod rewrite;
pub mod scope;
pub mod splice;

pub use code::{Code, Segment};
pub use dom::{DocumentDom, DomApi, DomFlavor, InjectedDom};

use crate::ast::{
    Attribute, AttributeValue, Chunk, EachBlock, Element, EventHandler, IfBlock, MustacheTag, Node,
    PlainAttribute, Span, Template, Text,
};
use crate::attributes::property_for;
use crate::compiler::CompileOutput;
use crate::error::Result;
use crate::expr::{is_reference, Expr};
use crate::script_processor::{analyse_script, TemplateProperties};
use component::Factory;
use renderer::{Renderer, RendererBuilder};
use rewrite::{Rewrite, Rewriter};
use scope::{NameAllocator, Scope};
use splice::{SourceEdits, Splice};
use std::rc::Rc;
use tracing::{debug, trace};

/// Names generated code relies on, never handed out for nodes.
const RESERVED: &[&str] = &[
    "anchor",
    "component",
    "dispatchObservers",
    "document",
    "event",
    "index",
    "iteration",
    "list",
    "mainFragment",
    "observers",
    "options",
    "pending",
    "renderMainFragment",
    "root",
    "state",
    "target",
    "template",
    "updating",
    "window",
];

/// Compiles a parsed template into a JavaScript module.
pub fn generate(template: &Template, source: &str, dom: DomFlavor) -> Result<CompileOutput> {
    let mut edits = SourceEdits::new();

    let properties = match &template.js {
        Some(script) => {
            let metadata = analyse_script(script)?;
            if let Some(export) = metadata.default_export {
                let keyword = export.keyword_span();
                edits.overwrite(keyword.start, keyword.end, "const template = ")?;
            }
            metadata.properties
        }
        None => TemplateProperties::default(),
    };

    let mut generator = Generator {
        source,
        dom: dom.api(),
        properties: &properties,
        names: NameAllocator::new(RESERVED.iter().copied()),
        edits,
        renderers: Vec::new(),
        if_blocks: 0,
        each_blocks: 0,
        uses_refs: false,
    };

    let mut main = RendererBuilder::new("renderMainFragment", false, Scope::root());
    generator.visit_children(&mut main, "target", &template.html.children)?;
    let main = generator.finish(main);
    generator.renderers.push(main);

    debug!(
        renderers = generator.renderers.len(),
        edits = generator.edits.len(),
        "walked template"
    );

    let factory = Factory {
        properties: &properties,
        uses_refs: generator.uses_refs,
        dom_setup: generator.dom.setup(),
    }
    .to_code()?;

    let mut parts = Vec::new();
    if let Some(script) = &template.js {
        parts.push(Code::source(trimmed(source, script.content_span)));
    }
    parts.extend(generator.renderers.iter().map(Renderer::to_code));
    parts.push(factory);

    let mut module = Code::join(parts, "\n\n");
    module.push_str("\n");

    let mut splice = Splice::new(source, &generator.edits);
    splice.write(&module);
    let (code, map) = splice.finish();
    debug!(bytes = code.len(), snippets = map.snippets.len(), "spliced module");

    Ok(CompileOutput {
        code,
        map,
        css: template.css.as_ref().map(|style| style.content.trim().to_string()),
        renderers: generator.renderers.iter().map(|r| r.name.clone()).collect(),
    })
}

/// `span` without surrounding whitespace.
fn trimmed(source: &str, span: Span) -> Span {
    let text = span.slice(source);
    let start = span.start + (text.len() - text.trim_start().len());
    let end = span.end - (text.len() - text.trim_end().len());
    Span::new(start, end.max(start))
}

/// A JavaScript string literal.
fn quote(text: &str) -> Result<String> {
    Ok(serde_json::to_string(text)?)
}

struct Generator<'a> {
    source: &'a str,
    dom: Box<dyn DomApi>,
    properties: &'a TemplateProperties,
    names: NameAllocator,
    edits: SourceEdits,
    renderers: Vec<Renderer>,
    if_blocks: usize,
    each_blocks: usize,
    uses_refs: bool,
}

impl Generator<'_> {
    fn finish(&self, builder: RendererBuilder) -> Renderer {
        let renderer = builder.finish(|node| self.dom.focus(node));
        trace!(
            name = %renderer.name,
            init = renderer.init.len(),
            update = renderer.update.len(),
            teardown = renderer.teardown.len(),
            "assembled renderer"
        );
        renderer
    }

    fn rewrite(&mut self, scope: &Scope, expr: &Expr) -> Result<Rewrite> {
        Rewriter::new(scope, &self.properties.helpers).rewrite(expr, &mut self.edits)
    }

    /// Attaches `node` to `target`, or before the anchor when it sits at
    /// the top of an anchored fragment.
    fn mount(&self, renderer: &RendererBuilder, target: &str, node: &str) -> String {
        if renderer.use_anchor && is_top_level(target) {
            self.dom.insert_before(node, "anchor")
        } else {
            self.dom.append(target, node)
        }
    }

    fn visit_children(&mut self, renderer: &mut RendererBuilder, target: &str, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Element(element) => self.visit_element(renderer, target, element)?,
                Node::Text(text) => self.visit_text(renderer, target, text)?,
                Node::MustacheTag(tag) => self.visit_mustache(renderer, target, tag)?,
                Node::IfBlock(block) => self.visit_if(renderer, target, block)?,
                Node::EachBlock(block) => self.visit_each(renderer, target, block)?,
                Node::Comment(_) => {}
            }
        }
        Ok(())
    }

    fn visit_element(&mut self, renderer: &mut RendererBuilder, target: &str, element: &Element) -> Result<()> {
        let name = self.names.allocate(&element.name);

        let mut init = vec![Code::from(format!("var {} = {};", name, self.dom.create_element(&element.name)))];
        let mut update = Vec::new();
        let mut teardown = Vec::new();
        let mut contexts: Vec<String> = Vec::new();

        for attribute in &element.attributes {
            match attribute {
                Attribute::Attribute(attribute) => {
                    self.plain_attribute(renderer, element, &name, attribute, &mut init, &mut update)?
                }
                Attribute::EventHandler(handler) => {
                    let used = self.event_handler(renderer, &name, handler, &mut init, &mut teardown)?;
                    merge(&mut contexts, used);
                }
                Attribute::Binding(binding) => {
                    let glue = binding::synthesize(
                        element,
                        &name,
                        binding,
                        &renderer.scope,
                        &mut self.names,
                        self.dom.as_ref(),
                    )?;
                    init.push(glue.init);
                    update.push(glue.update);
                    teardown.push(glue.teardown);
                    merge(&mut contexts, glue.contexts);
                }
                Attribute::Ref(reference) => {
                    self.uses_refs = true;
                    init.push(Code::from(format!("component.refs.{} = {};", reference.name, name)));
                    teardown.push(Code::from(format!("component.refs.{} = null;", reference.name)));
                }
            }
        }

        if !contexts.is_empty() {
            init.push(Code::from(format!("{}.__svelte = {{}};", name)));
            let stash: Vec<String> = contexts.iter().map(|context| stash_write(&name, &renderer.scope, context)).collect();
            update.push(Code::from(stash.join("\n")));
        }

        if is_top_level(target) {
            teardown.push(Code::from(self.dom.detach(&name)));
        }

        renderer.init.push(Code::join(init, "\n"));
        if !update.is_empty() {
            renderer.update.push(Code::join(update, "\n"));
        }
        if !teardown.is_empty() {
            renderer.teardown.push(Code::join(teardown, "\n"));
        }

        self.visit_children(renderer, &name, &element.children)?;

        let mount = self.mount(renderer, target, &name);
        renderer.init.push(Code::from(mount));
        Ok(())
    }

    fn plain_attribute(
        &mut self,
        renderer: &mut RendererBuilder,
        element: &Element,
        node: &str,
        attribute: &PlainAttribute,
        init: &mut Vec<Code>,
        update: &mut Vec<Code>,
    ) -> Result<()> {
        let property = property_for(&attribute.name, &element.name);
        let assign = |dom: &dyn DomApi, value: Code| match property {
            Some(property) => dom.set_property(node, property, value),
            None => dom.set_attribute(node, &attribute.name, value),
        };

        let chunks = match &attribute.value {
            AttributeValue::BooleanTrue => {
                init.push(assign(self.dom.as_ref(), Code::from("true")));
                if attribute.name == "autofocus" {
                    renderer.autofocus = Some(node.to_string());
                }
                return Ok(());
            }
            AttributeValue::Chunks(chunks) => chunks,
        };

        match chunks.as_slice() {
            [] => init.push(assign(self.dom.as_ref(), Code::from("\"\""))),
            [Chunk::Text(text)] => init.push(assign(self.dom.as_ref(), Code::from(quote(&text.data)?))),
            [Chunk::Expression(expr)] => {
                let rewrite = self.rewrite(&renderer.scope, expr)?;
                update.push(assign(self.dom.as_ref(), rewrite.snippet));
            }
            chunks => {
                let mut parts = Vec::with_capacity(chunks.len());
                for chunk in chunks {
                    match chunk {
                        Chunk::Text(text) => parts.push(Code::from(quote(&text.data)?)),
                        Chunk::Expression(expr) => {
                            let rewrite = self.rewrite(&renderer.scope, expr)?;
                            parts.push(code!("( ", rewrite.snippet, " )"));
                        }
                    }
                }

                let mut value = Code::new();
                if !matches!(chunks[0], Chunk::Text(_)) {
                    value.push_str("\"\" + ");
                }
                value.push(Code::join(parts, " + "));
                update.push(assign(self.dom.as_ref(), value));
            }
        }

        Ok(())
    }

    fn event_handler(
        &mut self,
        renderer: &RendererBuilder,
        node: &str,
        handler: &EventHandler,
        init: &mut Vec<Code>,
        teardown: &mut Vec<Code>,
    ) -> Result<Vec<String>> {
        let rewrite = Rewriter::for_event_handler(&renderer.scope, &self.properties.helpers)
            .rewrite_call_arguments(&handler.expression, &mut self.edits)?;

        let declarations: Vec<String> = rewrite
            .contexts
            .iter()
            .map(|context| stash_read(node, &renderer.scope, context))
            .collect();

        let mut body = Code::new();
        if !declarations.is_empty() {
            body.push_str(&declarations.join("\n"));
            body.push_str("\n\n");
        }
        body.push(rewrite.snippet);
        body.push_str(";");

        let function = self.names.allocate(&format!("{}Handler", handler.name));

        if self.properties.events.contains(&handler.name) {
            init.push(code!(
                format!("var {} = template.events.{}( {}, function ( event ) {{\n", function, handler.name, node),
                body.indent("\t"),
                "\n});"
            ));
            teardown.push(Code::from(format!("{}.teardown();", function)));
        } else {
            init.push(code!(
                format!("function {} ( event ) {{\n", function),
                body.indent("\t"),
                "\n}\n\n",
                self.dom.add_listener(node, &handler.name, &function),
            ));
            teardown.push(Code::from(self.dom.remove_listener(node, &handler.name, &function)));
        }

        Ok(rewrite.contexts)
    }

    fn visit_text(&mut self, renderer: &mut RendererBuilder, target: &str, text: &Text) -> Result<()> {
        let data = quote(&text.data)?;

        if !is_top_level(target) {
            let node = self.dom.create_text(&data);
            renderer.init.push(Code::from(self.dom.append(target, &node)));
            return Ok(());
        }

        let name = self.names.allocate("text");
        let mount = self.mount(renderer, target, &name);
        renderer.init.push(Code::from(format!("var {} = {};\n{}", name, self.dom.create_text(&data), mount)));
        renderer.teardown.push(Code::from(self.dom.detach(&name)));
        Ok(())
    }

    fn visit_mustache(&mut self, renderer: &mut RendererBuilder, target: &str, tag: &MustacheTag) -> Result<()> {
        let name = self.names.allocate("text");
        let mount = self.mount(renderer, target, &name);

        renderer.init.push(Code::from(format!(
            "var {name} = {create};\nvar {name}_value = '';\n{mount}",
            name = name,
            create = self.dom.create_text("''"),
            mount = mount,
        )));

        let rewrite = self.rewrite(&renderer.scope, &tag.expression)?;
        let set_text = self.dom.set_text(&name, &format!("{}_value", name));

        let statement = if is_reference(&tag.expression) {
            code!(
                "if ( ",
                rewrite.snippet.clone(),
                format!(" !== {}_value ) {{\n\t{}_value = ", name, name),
                rewrite.snippet,
                format!(";\n\t{}\n}}", set_text),
            )
        } else {
            let temp = self.names.allocate("temp");
            code!(
                format!("var {} = ", temp),
                rewrite.snippet,
                format!(
                    ";\nif ( {temp} !== {name}_value ) {{\n\t{name}_value = {temp};\n\t{set_text}\n}}",
                    temp = temp,
                    name = name,
                    set_text = set_text
                ),
            )
        };
        renderer.update.push(statement);

        if is_top_level(target) {
            renderer.teardown.push(Code::from(self.dom.detach(&name)));
        }
        Ok(())
    }

    fn visit_if(&mut self, renderer: &mut RendererBuilder, target: &str, block: &IfBlock) -> Result<()> {
        let index = self.if_blocks;
        self.if_blocks += 1;
        let name = format!("ifBlock_{}", index);
        let render = format!("renderIfBlock_{}", index);
        for reserved in [&name, &render, &format!("{}_anchor", name), &format!("{}_value", name)] {
            self.names.reserve(reserved);
        }

        let label = quote(&format!("#if {}", block.expression.text(self.source)))?;
        let mount = self.mount(renderer, target, &format!("{}_anchor", name));
        renderer.init.push(Code::from(format!(
            "var {name}_anchor = {comment};\n{mount}\nvar {name} = null;",
            name = name,
            comment = self.dom.create_comment(&label),
            mount = mount,
        )));

        let rewrite = self.rewrite(&renderer.scope, &block.expression)?;
        let create = format!(
            "{name} = {render}( component, {target}, {name}_anchor );",
            name = name,
            render = render,
            target = target
        );

        let (mut statement, condition) = if is_reference(&block.expression) {
            let statement = code!(
                "if ( ",
                rewrite.snippet.clone(),
                format!(" && !{} ) {{\n\t{}\n}}", name, create),
            );
            (statement, rewrite.snippet)
        } else {
            let value = format!("{}_value", name);
            let statement = code!(
                format!("var {} = ", value),
                rewrite.snippet,
                format!(";\n\nif ( {} && !{} ) {{\n\t{}\n}}", value, name, create),
            );
            (statement, Code::from(value))
        };
        statement.push(code!(
            " else if ( !",
            condition,
            format!(
                " && {name} ) {{\n\t{name}.teardown();\n\t{name} = null;\n}}\n\nif ( {name} ) {{\n\t{name}.update( {chain} );\n}}",
                name = name,
                chain = renderer.scope.context_chain().join(", ")
            ),
        ));
        renderer.update.push(statement);

        let mut teardown = format!("if ( {name} ) {name}.teardown();", name = name);
        if is_top_level(target) {
            teardown.push('\n');
            teardown.push_str(&self.dom.detach(&format!("{}_anchor", name)));
        }
        renderer.teardown.push(Code::from(teardown));

        let mut child = RendererBuilder::new(render, true, renderer.scope.enter_if());
        self.visit_children(&mut child, "target", &block.children)?;
        let child = self.finish(child);
        self.renderers.push(child);
        Ok(())
    }

    fn visit_each(&mut self, renderer: &mut RendererBuilder, target: &str, block: &EachBlock) -> Result<()> {
        let index = self.each_blocks;
        self.each_blocks += 1;
        let name = format!("eachBlock_{}", index);
        let render = format!("renderEachBlock_{}", index);
        let list = format!("{}_value", name);
        let iterations = format!("{}_iterations", name);
        let fragment = format!("{}_fragment", name);
        let anchor = format!("{}_anchor", name);
        for reserved in [&name, &render, &list, &iterations, &fragment, &anchor] {
            self.names.reserve(reserved);
        }

        let label = quote(&format!("#each {}", block.expression.text(self.source)))?;
        let mount = self.mount(renderer, target, &anchor);
        renderer.init.push(Code::from(format!(
            "var {anchor} = {comment};\n{mount}\nvar {iterations} = [];\nvar {fragment} = {create};",
            anchor = anchor,
            comment = self.dom.create_comment(&label),
            mount = mount,
            iterations = iterations,
            fragment = fragment,
            create = self.dom.create_fragment(),
        )));

        let rewrite = self.rewrite(&renderer.scope, &block.expression)?;
        let i = self.names.allocate("i");
        let chain = renderer.scope.context_chain().join(", ");

        renderer.update.push(code!(
            format!("var {} = ", list),
            rewrite.snippet,
            format!(
                ";

for ( var {i} = 0; {i} < {list}.length; {i} += 1 ) {{
	if ( !{iterations}[{i}] ) {{
		{iterations}[{i}] = {render}( component, {fragment} );
	}}

	{iterations}[{i}].update( {chain}, {list}, {list}[{i}], {i} );
}}

for ( var {i} = {list}.length; {i} < {iterations}.length; {i} += 1 ) {{
	{iterations}[{i}].teardown();
}}

{insert}
{iterations}.length = {list}.length;",
                i = i,
                list = list,
                iterations = iterations,
                render = render,
                fragment = fragment,
                chain = chain,
                insert = self.dom.insert_before(&fragment, &anchor),
            ),
        ));

        let mut teardown = format!(
            "for ( var {i} = 0; {i} < {iterations}.length; {i} += 1 ) {{\n\t{iterations}[{i}].teardown();\n}}",
            i = i,
            iterations = iterations
        );
        if is_top_level(target) {
            teardown.push_str("\n\n");
            teardown.push_str(&self.dom.detach(&anchor));
        }
        renderer.teardown.push(Code::from(teardown));

        let context = block.context.as_str();
        let index_name = block.index.clone().unwrap_or_else(|| format!("{}__index", context));
        renderer.scope.check_each_names(context, &index_name, block.span.start)?;
        self.names.reserve(context);
        self.names.reserve(&index_name);

        let scope = renderer.scope.enter_each(&block.expression, context, &index_name, block.index.is_some(), &list);
        let unpack: Vec<String> = scope
            .contexts()
            .iter()
            .map(|context| {
                format!(
                    "var {} = {}[{}];",
                    context,
                    scope.list_name(context).unwrap_or_default(),
                    scope.index_name(context).unwrap_or_default()
                )
            })
            .collect();

        let mut child = RendererBuilder::new(render, false, Rc::clone(&scope));
        child.update.push(Code::from(unpack.join("\n")));
        self.visit_children(&mut child, "target", &block.children)?;
        let child = self.finish(child);
        self.renderers.push(child);
        Ok(())
    }
}

fn is_top_level(target: &str) -> bool {
    target == "target"
}

fn merge(contexts: &mut Vec<String>, used: Vec<String>) {
    for context in used {
        if !contexts.contains(&context) {
            contexts.push(context);
        }
    }
}

/// Handler-side recovery of a context from the node's stash.
fn stash_read(node: &str, scope: &Scope, context: &str) -> String {
    if context == "root" {
        return format!("var root = {}.__svelte.root;", node);
    }
    let list = scope.list_name(context).unwrap_or_default();
    let index = scope.index_name(context).unwrap_or_default();
    format!(
        "var {list} = {node}.__svelte.{list}, {index} = {node}.__svelte.{index}, {context} = {list}[{index}];",
        list = list,
        index = index,
        node = node,
        context = context
    )
}

/// Update-side refresh of the node's stash.
fn stash_write(node: &str, scope: &Scope, context: &str) -> String {
    if context == "root" {
        return format!("{}.__svelte.root = root;", node);
    }
    let list = scope.list_name(context).unwrap_or_default();
    let index = scope.index_name(context).unwrap_or_default();
    format!(
        "{node}.__svelte.{list} = {list};\n{node}.__svelte.{index} = {index};",
        node = node,
        list = list,
        index = index
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn compile(source: &str) -> CompileOutput {
        let template = parse(source).unwrap();
        generate(&template, source, DomFlavor::Document).unwrap()
    }

    #[test]
    fn trimmed_span() {
        let source = "<script>\n  let a;\n</script>";
        assert_eq!(trimmed(source, Span::new(8, 18)).slice(source), "let a;");
    }

    #[test]
    fn flat_template_has_one_renderer() {
        let output = compile("<p class='greeting'>Hello {{name}}!</p>");
        assert_eq!(output.renderers, vec!["renderMainFragment"]);
        assert!(output.code.contains("var p = document.createElement( 'p' );"));
        assert!(output.code.contains("p.className = \"greeting\";"));
        assert!(output.code.contains("p.appendChild( document.createTextNode( \"Hello \" ) );"));
        assert!(output.code.contains("if ( root.name !== text_value ) {"));
        assert!(output.code.contains("target.appendChild( p );"));
        assert!(output.code.contains("p.parentNode.removeChild( p );"));
    }

    #[test]
    fn blocks_emit_children_first() {
        let output = compile("{{#if visible}}<p>{{#each items as item}}<span>{{item}}</span>{{/each}}</p>{{/if}}");
        assert_eq!(output.renderers, vec!["renderEachBlock_0", "renderIfBlock_0", "renderMainFragment"]);

        let each = output.code.find("function renderEachBlock_0").unwrap();
        let branch = output.code.find("function renderIfBlock_0").unwrap();
        let main = output.code.find("function renderMainFragment").unwrap();
        assert!(each < branch && branch < main);

        assert!(output.code.contains("anchor.parentNode.insertBefore( p, anchor );"));
        assert!(output.code.contains("update: function ( root, eachBlock_0_value, item, item__index ) {"));
        assert!(output.code.contains("eachBlock_0_iterations[i].update( root, eachBlock_0_value, eachBlock_0_value[i], i );"));
    }

    #[test]
    fn handler_in_loop_reads_stash() {
        let output = compile("{{#each todos as todo, i}}<button on:click='remove(i, todo)'>x</button>{{/each}}");
        assert!(output.code.contains("function clickHandler ( event ) {"));
        assert!(output.code.contains(
            "var eachBlock_0_value = button.__svelte.eachBlock_0_value, i = button.__svelte.i, todo = eachBlock_0_value[i];"
        ));
        assert!(output.code.contains("component.remove(i, todo);"));
        assert!(output.code.contains("button.__svelte = {};"));
        assert!(output.code.contains("button.__svelte.eachBlock_0_value = eachBlock_0_value;\nbutton.__svelte.i = i;"));
    }

    #[test]
    fn loop_counter_avoids_enclosing_index() {
        let output = compile("{{#each rows as row, i}}{{#each row.cells as cell}}{{cell}}{{/each}}{{/each}}");
        assert!(output.code.contains("for ( var i_1 = 0; i_1 < eachBlock_1_value.length; i_1 += 1 ) {"));
    }
}
