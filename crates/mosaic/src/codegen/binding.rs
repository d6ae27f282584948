// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Two-way `bind:` glue.
//!
//! A binding listens for the element's change event and writes the new
//! value back into component state. The shape of the setter depends on
//! the bound path:
//!
//! - `item.description` where `item` comes from an each block: the list
//!   and index are recovered from data stashed on the node, the list item
//!   is mutated in place and the top-level list is set again.
//! - `user.name`: the top-level object is read, mutated and set again.
//! - `name`: the property is set directly.
//!
//! While the handler runs, a per-node flag stops the update pass from
//! writing the value straight back into the element.

use super::code::Code;
use super::dom::DomApi;
use super::scope::{NameAllocator, Scope};
use crate::ast::{Binding, Element};
use crate::error::Result;

/// Statements produced for one binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingCode {
    /// Handler declaration and listener registration.
    pub init: Code,
    /// Pushes state into the element unless the element caused the change.
    pub update: Code,
    /// Listener removal.
    pub teardown: Code,
    /// Contexts the handler reads from the node's stash.
    pub contexts: Vec<String>,
}

/// The event that signals a new value: `input` for text inputs,
/// `change` for everything else.
pub fn event_name(element: &Element) -> &'static str {
    if element.name != "input" {
        return "change";
    }
    match element.attribute("type").map(|attr| attr.value.static_text()) {
        None => "input",
        Some(Some("text")) => "input",
        Some(_) => "change",
    }
}

/// Generates the glue for `binding` on the element held in `node`.
pub fn synthesize(
    element: &Element,
    node: &str,
    binding: &Binding,
    scope: &Scope,
    names: &mut NameAllocator,
    dom: &dyn DomApi,
) -> Result<BindingCode> {
    let parts = binding.parts();
    let head = parts[0];
    let contextual = scope.is_context(head);
    let deep = parts.len() > 1;

    let handler = names.allocate(&format!("{}ChangeHandler", node));
    let event = event_name(element);
    let current = dom.get_property(node, &binding.name);

    let (setter, contexts) = if contextual {
        let property = scope.binding_root(head, binding.span.start)?;
        let list_name = scope.list_name(head).unwrap_or_default();
        let index_name = scope.index_name(head).unwrap_or_default();
        let path: String = parts[1..].iter().map(|part| format!(".{}", part)).collect();

        let list = names.allocate("list");
        let index = names.allocate("index");
        let setter = format!(
            "var {list} = {node}.__svelte.{list_name};\nvar {index} = {node}.__svelte.{index_name};\n{list}[{index}]{path} = {current};\n\ncomponent.set({{ {property}: component.get( '{property}' ) }});",
            list = list,
            index = index,
            node = node,
            list_name = list_name,
            index_name = index_name,
            path = path,
            current = current,
            property = property,
        );
        (setter, vec![head.to_string()])
    } else if deep {
        let local = names.allocate(head);
        let setter = format!(
            "var {local} = component.get( '{head}' );\n{local}.{rest} = {current};\ncomponent.set({{ {head}: {local} }});",
            local = local,
            head = head,
            rest = parts[1..].join("."),
            current = current,
        );
        (setter, Vec::new())
    } else {
        (format!("component.set({{ {}: {} }});", head, current), Vec::new())
    };

    let setter = Code::from(setter).indent("\t");
    let init = code!(
        format!("var {node}_updating = false;\n\nfunction {handler} () {{\n\t{node}_updating = true;\n", node = node, handler = handler),
        setter,
        format!("\n\t{}_updating = false;\n}}\n\n", node),
        dom.add_listener(node, event, &handler),
    );

    let value = if contextual {
        Code::source(binding.value_span)
    } else {
        code!("root.", binding.value_span)
    };
    let update = code!(format!("if ( !{}_updating ) ", node), dom.set_property(node, &binding.name, value));

    Ok(BindingCode {
        init,
        update,
        teardown: Code::from(dom.remove_listener(node, event, &handler)),
        contexts,
    })
}
