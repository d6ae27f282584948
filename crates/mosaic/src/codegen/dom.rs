// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! DOM access in generated code.
//!
//! Renderers never spell out DOM calls themselves; they ask a [`DomApi`]
//! for the statement or expression text. [`DocumentDom`] targets the
//! browser globals. [`InjectedDom`] routes every operation through an
//! object passed in as `options.dom`, so components can run against a
//! server-side or test DOM.

use super::code::Code;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which [`DomApi`] implementation generated code uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomFlavor {
    /// `document.createElement` and friends.
    #[default]
    Document,
    /// An object supplied as `options.dom`.
    Injected,
}

impl DomFlavor {
    /// The implementation for this flavor.
    pub fn api(self) -> Box<dyn DomApi> {
        match self {
            DomFlavor::Document => Box::new(DocumentDom),
            DomFlavor::Injected => Box::new(InjectedDom),
        }
    }
}

impl FromStr for DomFlavor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "document" => Ok(DomFlavor::Document),
            "injected" => Ok(DomFlavor::Injected),
            other => Err(format!("unknown DOM flavor '{}' (expected 'document' or 'injected')", other)),
        }
    }
}

/// Produces DOM operations as JavaScript text.
///
/// Methods ending in a statement return it with its trailing `;`.
/// Expression methods return bare expressions.
pub trait DomApi {
    /// Expression creating an element.
    fn create_element(&self, tag: &str) -> String;
    /// Expression creating a text node from a JavaScript expression.
    fn create_text(&self, data: &str) -> String;
    /// Expression creating a comment node from a JavaScript expression.
    fn create_comment(&self, data: &str) -> String;
    /// Expression creating an empty document fragment.
    fn create_fragment(&self) -> String;
    /// Statement appending `child` to `parent`.
    fn append(&self, parent: &str, child: &str) -> String;
    /// Statement inserting `node` before `anchor` in the anchor's parent.
    fn insert_before(&self, node: &str, anchor: &str) -> String;
    /// Statement removing `node` from its parent.
    fn detach(&self, node: &str) -> String;
    /// Statement attaching a listener.
    fn add_listener(&self, node: &str, event: &str, handler: &str) -> String;
    /// Statement removing a listener.
    fn remove_listener(&self, node: &str, event: &str, handler: &str) -> String;
    /// Statement setting an attribute.
    fn set_attribute(&self, node: &str, name: &str, value: Code) -> Code;
    /// Statement setting a property, possibly dotted.
    fn set_property(&self, node: &str, property: &str, value: Code) -> Code;
    /// Expression reading a property.
    fn get_property(&self, node: &str, property: &str) -> String;
    /// Statement replacing a text node's data.
    fn set_text(&self, node: &str, value: &str) -> String;
    /// Statement focusing an element.
    fn focus(&self, node: &str) -> String;
    /// Statement run at the top of the component factory, if any.
    fn setup(&self) -> Option<&'static str> {
        None
    }
}

/// Browser globals.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentDom;

impl DomApi for DocumentDom {
    fn create_element(&self, tag: &str) -> String {
        format!("document.createElement( '{}' )", tag)
    }

    fn create_text(&self, data: &str) -> String {
        format!("document.createTextNode( {} )", data)
    }

    fn create_comment(&self, data: &str) -> String {
        format!("document.createComment( {} )", data)
    }

    fn create_fragment(&self) -> String {
        "document.createDocumentFragment()".to_string()
    }

    fn append(&self, parent: &str, child: &str) -> String {
        format!("{}.appendChild( {} );", parent, child)
    }

    fn insert_before(&self, node: &str, anchor: &str) -> String {
        format!("{anchor}.parentNode.insertBefore( {node}, {anchor} );", node = node, anchor = anchor)
    }

    fn detach(&self, node: &str) -> String {
        format!("{node}.parentNode.removeChild( {node} );", node = node)
    }

    fn add_listener(&self, node: &str, event: &str, handler: &str) -> String {
        format!("{}.addEventListener( '{}', {}, false );", node, event, handler)
    }

    fn remove_listener(&self, node: &str, event: &str, handler: &str) -> String {
        format!("{}.removeEventListener( '{}', {}, false );", node, event, handler)
    }

    fn set_attribute(&self, node: &str, name: &str, value: Code) -> Code {
        code!(format!("{}.setAttribute( '{}', ", node, name), value, " );")
    }

    fn set_property(&self, node: &str, property: &str, value: Code) -> Code {
        code!(format!("{}.{} = ", node, property), value, ";")
    }

    fn get_property(&self, node: &str, property: &str) -> String {
        format!("{}.{}", node, property)
    }

    fn set_text(&self, node: &str, value: &str) -> String {
        format!("{}.data = {};", node, value)
    }

    fn focus(&self, node: &str) -> String {
        format!("{}.focus();", node)
    }
}

/// Operations routed through `component.__dom`, taken from `options.dom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectedDom;

impl DomApi for InjectedDom {
    fn create_element(&self, tag: &str) -> String {
        format!("component.__dom.createElement( '{}' )", tag)
    }

    fn create_text(&self, data: &str) -> String {
        format!("component.__dom.createText( {} )", data)
    }

    fn create_comment(&self, data: &str) -> String {
        format!("component.__dom.createComment( {} )", data)
    }

    fn create_fragment(&self) -> String {
        "component.__dom.createFragment()".to_string()
    }

    fn append(&self, parent: &str, child: &str) -> String {
        format!("component.__dom.append( {}, {} );", parent, child)
    }

    fn insert_before(&self, node: &str, anchor: &str) -> String {
        format!("component.__dom.insertBefore( {}, {} );", node, anchor)
    }

    fn detach(&self, node: &str) -> String {
        format!("component.__dom.detach( {} );", node)
    }

    fn add_listener(&self, node: &str, event: &str, handler: &str) -> String {
        format!("component.__dom.listen( {}, '{}', {} );", node, event, handler)
    }

    fn remove_listener(&self, node: &str, event: &str, handler: &str) -> String {
        format!("component.__dom.unlisten( {}, '{}', {} );", node, event, handler)
    }

    fn set_attribute(&self, node: &str, name: &str, value: Code) -> Code {
        code!(format!("component.__dom.setAttribute( {}, '{}', ", node, name), value, " );")
    }

    fn set_property(&self, node: &str, property: &str, value: Code) -> Code {
        code!(format!("component.__dom.setProperty( {}, '{}', ", node, property), value, " );")
    }

    fn get_property(&self, node: &str, property: &str) -> String {
        format!("component.__dom.getProperty( {}, '{}' )", node, property)
    }

    fn set_text(&self, node: &str, value: &str) -> String {
        format!("component.__dom.setText( {}, {} );", node, value)
    }

    fn focus(&self, node: &str) -> String {
        format!("component.__dom.focus( {} );", node)
    }

    fn setup(&self) -> Option<&'static str> {
        Some("component.__dom = options.dom;")
    }
}
