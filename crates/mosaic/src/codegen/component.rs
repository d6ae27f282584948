// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The `createComponent` factory wrapped around the main renderer.

use super::code::Code;
use crate::dependencies::{order_computed, ComputedDeclaration};
use crate::error::Result;
use crate::script_processor::TemplateProperties;
use tracing::debug;

/// What the factory needs to know about the compiled template.
#[derive(Debug, Clone, Copy)]
pub struct Factory<'a> {
    /// The template definition object's contents.
    pub properties: &'a TemplateProperties,
    /// Whether any `ref:` directive was used.
    pub uses_refs: bool,
    /// Statement wiring up the DOM implementation, if it needs one.
    pub dom_setup: Option<&'a str>,
}

impl Factory<'_> {
    /// Emits `export default function createComponent ( options ) { ... }`.
    pub fn to_code(&self) -> Result<Code> {
        let properties = self.properties;

        let mut prelude = vec![format!(
            "var component = {};",
            if properties.methods { "Object.create( template.methods )" } else { "{}" }
        )];
        if self.uses_refs {
            prelude.push("component.refs = {};".to_string());
        }
        if let Some(setup) = self.dom_setup {
            prelude.push(setup.to_string());
        }
        prelude.push("var state = {};".to_string());
        prelude.push("var updating = false;".to_string());
        prelude.push("var pending = [];".to_string());

        let computed = computed_statements(&properties.computed)?;
        let mut cycle = vec!["const oldState = state;\nstate = Object.assign( {}, oldState, newState );".to_string()];
        cycle.extend(computed);
        cycle.push(
            "dispatchObservers( observers.immediate, newState, oldState );\n\
             if ( mainFragment ) mainFragment.update( state );\n\
             dispatchObservers( observers.deferred, newState, oldState );\n\n\
             newState = pending.shift();"
                .to_string(),
        );
        let cycle = indent(&cycle.join("\n\n"), "\t\t\t");

        let initial_data = if properties.data {
            "Object.assign( template.data(), options.data )"
        } else {
            "options.data || {}"
        };
        let onteardown = if properties.onteardown { "\n\n\ttemplate.onteardown.call( component );" } else { "" };
        let onrender = if properties.onrender { "\ntemplate.onrender.call( component );\n" } else { "" };

        let body = format!(
            "{prelude}

var observers = {{
	immediate: Object.create( null ),
	deferred: Object.create( null )
}};

function dispatchObservers ( group, newState, oldState ) {{
	for ( const key in group ) {{
		if ( !( key in newState ) ) continue;

		const newValue = newState[ key ];
		const oldValue = oldState[ key ];

		if ( newValue === oldValue && typeof newValue !== 'object' ) continue;

		const callbacks = group[ key ];
		if ( !callbacks ) continue;

		for ( let i = 0; i < callbacks.length; i += 1 ) {{
			callbacks[i].call( component, newValue, oldValue );
		}}
	}}
}}

component.get = function get ( key ) {{
	return state[ key ];
}};

component.set = function set ( newState ) {{
	if ( updating ) {{
		pending.push( newState );
		return;
	}}

	updating = true;

	try {{
		while ( newState ) {{
{cycle}
		}}
	}} finally {{
		updating = false;
		pending.length = 0;
	}}
}};

component.observe = function ( key, callback, options = {{}} ) {{
	const group = options.defer ? observers.deferred : observers.immediate;

	( group[ key ] || ( group[ key ] = [] ) ).push( callback );
	if ( options.init !== false ) callback( state[ key ] );

	return {{
		cancel () {{
			const index = group[ key ].indexOf( callback );
			if ( ~index ) group[ key ].splice( index, 1 );
		}}
	}};
}};

component.teardown = function teardown () {{
	if ( !mainFragment ) return;

	mainFragment.teardown();
	mainFragment = null;

	state = {{}};{onteardown}
}};

let mainFragment = renderMainFragment( component, options.target );
component.set( {initial_data} );
{onrender}
return component;",
            prelude = prelude.join("\n"),
            cycle = cycle,
            onteardown = onteardown,
            initial_data = initial_data,
            onrender = onrender,
        );

        Ok(code!(
            "export default function createComponent ( options ) {\n",
            indent(&body, "\t"),
            "\n}"
        ))
    }
}

/// Recomputation statements for `computed`, dependencies first.
///
/// Each runs when a dependency was part of the update and is an object
/// (possibly mutated in place), or when its value changed.
pub fn computed_statements(declarations: &[ComputedDeclaration]) -> Result<Vec<String>> {
    let ordered = order_computed(declarations)?;
    debug!(order = ?ordered.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(), "ordered computed properties");

    Ok(ordered
        .into_iter()
        .map(|declaration| {
            let key = &declaration.name;
            let arguments: Vec<String> =
                declaration.dependencies.iter().map(|dep| format!("state.{}", dep)).collect();
            let call = if arguments.is_empty() { "()".to_string() } else { format!("( {} )", arguments.join(", ")) };
            let assignment = format!("state.{key} = newState.{key} = template.computed.{key}{call};", key = key, call = call);

            if declaration.dependencies.is_empty() {
                return assignment;
            }

            let guard: Vec<String> = declaration
                .dependencies
                .iter()
                .map(|dep| {
                    format!(
                        "( '{dep}' in newState && typeof state.{dep} === 'object' || state.{dep} !== oldState.{dep} )",
                        dep = dep
                    )
                })
                .collect();
            format!("if ( {} ) {{\n\t{}\n}}", guard.join(" || "), assignment)
        })
        .collect())
}

fn indent(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::code::Segment;

    fn declaration(name: &str, dependencies: &[&str]) -> ComputedDeclaration {
        ComputedDeclaration {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            offset: 0,
        }
    }

    fn text(code: &Code) -> String {
        code.segments()
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Source(_) => "",
            })
            .collect()
    }

    #[test]
    fn computed_guard_and_order() {
        let statements = computed_statements(&[declaration("cSquared", &["c"]), declaration("c", &["a", "b"])]).unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("state.c = newState.c = template.computed.c( state.a, state.b );"));
        assert!(statements[0].starts_with(
            "if ( ( 'a' in newState && typeof state.a === 'object' || state.a !== oldState.a ) || ( 'b' in newState"
        ));
        assert!(statements[1].contains("template.computed.cSquared( state.c )"));
    }

    #[test]
    fn computed_without_dependencies_always_runs() {
        let statements = computed_statements(&[declaration("now", &[])]).unwrap();
        assert_eq!(statements, vec!["state.now = newState.now = template.computed.now();"]);
    }

    #[test]
    fn factory_reflects_template_properties() {
        let properties = TemplateProperties {
            data: true,
            methods: true,
            onrender: true,
            onteardown: true,
            ..TemplateProperties::default()
        };
        let factory = Factory { properties: &properties, uses_refs: true, dom_setup: Some("component.__dom = options.dom;") };
        let code = text(&factory.to_code().unwrap());

        assert!(code.starts_with("export default function createComponent ( options ) {\n"));
        assert!(code.contains("\tvar component = Object.create( template.methods );\n\tcomponent.refs = {};\n\tcomponent.__dom = options.dom;"));
        assert!(code.contains("\tcomponent.set( Object.assign( template.data(), options.data ) );"));
        assert!(code.contains("\ttemplate.onrender.call( component );"));
        assert!(code.contains("\t\ttemplate.onteardown.call( component );"));
        assert!(code.contains("\t\t\t\tif ( mainFragment ) mainFragment.update( state );"));
        assert!(code.ends_with("\treturn component;\n}"));
    }

    #[test]
    fn bare_factory() {
        let properties = TemplateProperties::default();
        let factory = Factory { properties: &properties, uses_refs: false, dom_setup: None };
        let code = text(&factory.to_code().unwrap());

        assert!(code.contains("\tvar component = {};\n\tvar state = {};"));
        assert!(code.contains("component.set( options.data || {} );"));
        assert!(!code.contains("refs"));
        assert!(!code.contains("onrender"));
    }
}
