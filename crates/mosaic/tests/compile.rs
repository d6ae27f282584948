// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! End-to-end compilation of complete component templates.

use mosaic::{compile, CompileError, CompileOptions, CompileOutput, DomFlavor};

fn compile_default(source: &str) -> CompileOutput {
    compile(source, &CompileOptions::default()).unwrap()
}

fn position(code: &str, needle: &str) -> usize {
    code.find(needle).unwrap_or_else(|| panic!("missing {:?} in:\n{}", needle, code))
}

#[test]
fn flat_template_compiles_to_one_renderer_and_a_factory() {
    let output = compile_default("<h1>Hello {{name}}!</h1>");

    assert_eq!(output.renderers, vec!["renderMainFragment"]);
    assert!(output.code.starts_with("function renderMainFragment ( component, target ) {"));
    assert!(output.code.contains("update: function ( root ) {"));
    assert!(output.code.contains("if ( root.name !== text_value ) {"));
    assert!(output.code.contains("export default function createComponent ( options ) {"));
    assert!(output.code.contains("let mainFragment = renderMainFragment( component, options.target );"));
    assert!(output.code.contains("component.set( options.data || {} );"));
    assert!(output.code.ends_with("}\n"));
    assert_eq!(output.css, None);
}

#[test]
fn each_block_creates_updates_and_trims_iterations() {
    let output = compile_default("<ul>{{#each items as item}}<li>{{item.label}}</li>{{/each}}</ul>");
    let code = &output.code;

    assert_eq!(output.renderers, vec!["renderEachBlock_0", "renderMainFragment"]);
    assert!(code.contains("var eachBlock_0_anchor = document.createComment( \"#each items\" );"));
    assert!(code.contains("ul.appendChild( eachBlock_0_anchor );"));
    assert!(code.contains("var eachBlock_0_value = root.items;"));
    assert!(code.contains("for ( var i = 0; i < eachBlock_0_value.length; i += 1 ) {"));
    assert!(code.contains("eachBlock_0_iterations[i] = renderEachBlock_0( component, eachBlock_0_fragment );"));
    assert!(code.contains("for ( var i = eachBlock_0_value.length; i < eachBlock_0_iterations.length; i += 1 ) {"));
    assert!(code.contains(
        "eachBlock_0_anchor.parentNode.insertBefore( eachBlock_0_fragment, eachBlock_0_anchor );"
    ));
    assert!(code.contains("eachBlock_0_iterations.length = eachBlock_0_value.length;"));

    assert!(code.contains("update: function ( root, eachBlock_0_value, item, item__index ) {"));
    assert!(code.contains("var item = eachBlock_0_value[item__index];"));
    assert!(code.contains("if ( item.label !== text_value ) {"));
}

#[test]
fn if_block_mounts_before_its_anchor() {
    let output = compile_default("{{#if count > 1}}<p>many</p>{{/if}}");
    let code = &output.code;

    assert_eq!(output.renderers, vec!["renderIfBlock_0", "renderMainFragment"]);
    assert!(code.contains("function renderIfBlock_0 ( component, target, anchor ) {"));
    assert!(code.contains("anchor.parentNode.insertBefore( p, anchor );"));
    assert!(code.contains("var ifBlock_0_value = root.count > 1;"));
    assert!(code.contains("if ( ifBlock_0_value && !ifBlock_0 ) {"));
    assert!(code.contains("ifBlock_0 = renderIfBlock_0( component, target, ifBlock_0_anchor );"));
    assert!(code.contains("ifBlock_0.teardown();"));
}

#[test]
fn binding_inside_loop_writes_back_through_the_list() {
    let output = compile_default("{{#each items as item}}<input bind:value='item.description'>{{/each}}");
    let code = &output.code;

    assert!(code.contains("var list = input.__svelte.eachBlock_0_value;"));
    assert!(code.contains("var index = input.__svelte.item__index;"));
    assert!(code.contains("list[index].description = input.value;"));
    assert!(code.contains("component.set({ items: component.get( 'items' ) });"));
    assert!(code.contains("input.addEventListener( 'input', inputChangeHandler, false );"));
    assert!(code.contains("if ( !input_updating ) input.value = item.description;"));
}

#[test]
fn binding_into_derived_list_is_rejected() {
    let error = compile(
        "{{#each items.filter(visible) as item}}<input type='checkbox' bind:checked='item.done'>{{/each}}",
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(error, CompileError::ReadOnlyBinding { ref name, .. } if name == "item"));
}

#[test]
fn unknown_directive_is_rejected() {
    let error = compile("<div class:active='selected'></div>", &CompileOptions::default()).unwrap_err();
    assert!(matches!(error, CompileError::UnsupportedDirective { ref directive, .. } if directive == "class"));
}

#[test]
fn malformed_markup_is_a_parse_error() {
    let error = compile("<div><p></div>", &CompileOptions::default()).unwrap_err();
    assert!(matches!(error, CompileError::Parse { .. }));
}

#[test]
fn computed_properties_run_in_dependency_order() {
    let source = "<p>{{cSquared}}</p>

<script>
\texport default {
\t\tcomputed: {
\t\t\tcSquared: c => c * c,
\t\t\tc: ( a, b ) => a + b
\t\t}
\t};
</script>";
    let output = compile_default(source);
    let code = &output.code;

    assert!(code.starts_with("const template = {"));
    assert!(!code.contains("export default {"));
    let c = position(code, "template.computed.c( state.a, state.b );");
    let squared = position(code, "template.computed.cSquared( state.c );");
    assert!(c < squared);
    assert!(code.contains("( 'c' in newState && typeof state.c === 'object' || state.c !== oldState.c )"));
}

#[test]
fn circular_computed_properties_are_rejected() {
    let source = "<script>
\texport default {
\t\tcomputed: {
\t\t\ta: b => b + 1,
\t\t\tb: a => a + 1
\t\t}
\t};
</script>";
    let error = compile(source, &CompileOptions::default()).unwrap_err();
    assert!(matches!(error, CompileError::CircularComputed { .. }));
}

#[test]
fn helpers_events_methods_and_refs() {
    let source = "<p ref:para on:tap='save(event)'>{{upper(name)}}</p>

<script>
\texport default {
\t\thelpers: { upper: s => s.toUpperCase() },
\t\tevents: {
\t\t\ttap ( node, callback ) {
\t\t\t\treturn { teardown () {} };
\t\t\t}
\t\t},
\t\tmethods: {
\t\t\tsave ( event ) {}
\t\t}
\t};
</script>";
    let output = compile_default(source);
    let code = &output.code;

    assert!(code.contains("var temp = template.helpers.upper(root.name);"));
    assert!(code.contains("component.refs.para = p;"));
    assert!(code.contains("component.refs.para = null;"));
    assert!(code.contains("component.refs = {};"));
    assert!(code.contains("var tapHandler = template.events.tap( p, function ( event ) {"));
    assert!(code.contains("component.save(event);"));
    assert!(code.contains("tapHandler.teardown();"));
    assert!(code.contains("var component = Object.create( template.methods );"));
}

#[test]
fn lifecycle_hooks_and_initial_data() {
    let source = "<p>{{count}}</p>

<script>
\texport default {
\t\tdata () {
\t\t\treturn { count: 0 };
\t\t},
\t\tonrender () {},
\t\tonteardown () {}
\t};
</script>";
    let code = compile_default(source).code;

    assert!(code.contains("component.set( Object.assign( template.data(), options.data ) );"));
    assert!(code.contains("template.onrender.call( component );"));
    assert!(code.contains("template.onteardown.call( component );"));
    assert!(code.contains("if ( !mainFragment ) return;"));
}

#[test]
fn injected_dom_routes_every_operation() {
    let options = CompileOptions { dom: DomFlavor::Injected, ..CompileOptions::default() };
    let output = compile(
        "<p on:click='toggle()'>{{#if open}}<span>{{label}}</span>{{/if}}</p><input bind:value='label'>",
        &options,
    )
    .unwrap();
    let code = &output.code;

    assert!(code.contains("component.__dom = options.dom;"));
    assert!(code.contains("component.__dom.createElement( 'p' )"));
    assert!(code.contains("component.__dom.createComment( \"#if open\" )"));
    assert!(!code.contains("document."));
}

#[test]
fn style_block_is_returned_as_css() {
    let output = compile_default("<p>styled</p>\n<style>\n\tp { color: red; }\n</style>");
    assert_eq!(output.css.as_deref(), Some("p { color: red; }"));
    assert!(!output.code.contains("color: red"));
}

#[test]
fn autofocus_focuses_after_mount() {
    let code = compile_default("<input autofocus>").code;
    let mount = position(&code, "target.appendChild( input );");
    let focus = position(&code, "input.focus();");
    assert!(mount < focus);
}

#[test]
fn compiling_twice_is_identical() {
    let source = "{{#each todos as todo, i}}<label on:click='remove(i)'>{{todo.text}}</label>{{/each}}";
    let first = compile_default(source);
    let second = compile_default(source);
    assert_eq!(first, second);
}

#[test]
fn every_spliced_expression_maps_back_to_its_source() {
    let source = "<p title='{{title}}'>{{greeting}}, {{user.name}}</p>";
    let output = compile_default(source);

    assert!(!output.map.snippets.is_empty());
    for snippet in &output.map.snippets {
        let generated = snippet.generated.slice(&output.code);
        let original = snippet.original.slice(source);
        assert_eq!(generated, format!("root.{}", original));
        assert_eq!(output.map.original_span(snippet.generated), Some(snippet.original));
    }

    let generated = position(&output.code, "root.greeting") + "root.".len();
    assert_eq!(output.map.original_position(generated), Some(position(source, "greeting")));
    assert_eq!(output.map.original_position(position(&output.code, "root.greeting")), None);
}

#[test]
fn source_map_v3_document() {
    let source = "<p>{{message}}</p>";
    let options = CompileOptions { filename: Some("Message.html".to_string()), ..CompileOptions::default() };
    let output = compile(source, &options).unwrap();

    let map = output.to_v3(&options.output_file(), &options.source_name(), source);
    assert_eq!(map.version, 3);
    assert_eq!(map.file, "Message.js");
    assert_eq!(map.sources, vec!["Message.html"]);
    assert_eq!(map.sources_content, vec![source]);
    assert!(!map.mappings.is_empty());

    let json = output.to_v3_json(&options.output_file(), &options.source_name(), source).unwrap();
    assert!(json.contains("\"sourcesContent\""));
}

#[test]
fn script_keeps_its_position_in_the_map() {
    let source = "<p>{{a}}</p>\n<script>\n\timport x from './x.js';\n\texport default {};\n</script>";
    let output = compile_default(source);

    assert!(output.code.starts_with("import x from './x.js';\n\tconst template = {};"));
    let script = output.map.snippets.first().unwrap();
    assert_eq!(script.original.slice(source), "import x from './x.js';\n\texport default {};");
    assert_eq!(output.map.original_position(0), Some(position(source, "import")));
}

#[test]
fn parenthesised_expressions_keep_their_brackets() {
    let cases = [
        ("<p>{{a * (b + c)}}</p>", "var temp = root.a * (root.b + root.c);"),
        ("<p>{{(a || b) && c}}</p>", "var temp = (root.a || root.b) && root.c;"),
        ("{{#if !(a && b)}}<p>x</p>{{/if}}", "var ifBlock_0_value = !(root.a && root.b);"),
        ("<p>{{(items).length}}</p>", "if ( (root.items).length !== text_value ) {"),
    ];
    for (source, expected) in cases {
        let output = compile_default(source);
        assert!(output.code.contains(expected), "missing {:?} in:\n{}", expected, output.code);
    }
}

#[test]
fn deep_binding_on_a_node_named_like_its_root() {
    let code = compile_default("<input bind:value='input.text'>").code;

    assert!(code.contains("var input_1 = component.get( 'input' );"));
    assert!(code.contains("input_1.text = input.value;"));
    assert!(code.contains("component.set({ input: input_1 });"));
}

#[test]
fn nested_each_cannot_rebind_an_outer_name() {
    for source in [
        "{{#each a as x}}{{#each x.b as x}}{{x}}{{/each}}{{/each}}",
        "{{#each a as x, i}}{{#each x.b as y, i}}{{y}}{{/each}}{{/each}}",
        "{{#each a as root}}{{root}}{{/each}}",
    ] {
        let error = compile(source, &CompileOptions::default()).unwrap_err();
        assert!(matches!(error, CompileError::ShadowedContext { .. }), "{}: {:?}", source, error);
    }

    let error = compile("{{#each a as x}}{{#each x.b as x}}{{/each}}{{/each}}", &CompileOptions::default()).unwrap_err();
    assert!(matches!(error, CompileError::ShadowedContext { ref name, offset: 16 } if name == "x"));
}
