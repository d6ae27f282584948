// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Attribute-to-property metadata.
//!
//! Many HTML attributes are reflected as element properties, often under a
//! different name (`class` → `className`, `for` → `htmlFor`). Writing the
//! property is faster than `setAttribute` and keeps form controls in sync,
//! so generated code prefers it whenever the attribute applies to the tag.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// How an attribute maps onto an element property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMetadata {
    /// The property name, possibly dotted (`style.cssText`).
    pub property: &'static str,
    /// Tags the property exists on. Empty means every element.
    pub applies_to: &'static [&'static str],
}

const fn meta(property: &'static str, applies_to: &'static [&'static str]) -> AttributeMetadata {
    AttributeMetadata { property, applies_to }
}

lazy_static! {
    static ref LOOKUP: HashMap<&'static str, AttributeMetadata> = {
        let entries: &[(&str, AttributeMetadata)] = &[
            ("accept", meta("accept", &["form", "input"])),
            ("accept-charset", meta("acceptCharset", &["form"])),
            ("accesskey", meta("accessKey", &[])),
            ("action", meta("action", &["form"])),
            ("align", meta("align", &[
                "applet", "caption", "col", "colgroup", "hr", "iframe", "img", "table",
                "tbody", "td", "tfoot", "th", "thead", "tr",
            ])),
            ("allowfullscreen", meta("allowFullscreen", &["iframe"])),
            ("alt", meta("alt", &["applet", "area", "img", "input"])),
            ("async", meta("async", &["script"])),
            ("autocomplete", meta("autocomplete", &["form", "input"])),
            ("autofocus", meta("autofocus", &["button", "input", "keygen", "select", "textarea"])),
            ("autoplay", meta("autoplay", &["audio", "video"])),
            ("bgcolor", meta("bgColor", &[
                "body", "col", "colgroup", "marquee", "table", "tbody", "tfoot", "td", "th", "tr",
            ])),
            ("border", meta("border", &["img", "object", "table"])),
            ("checked", meta("checked", &["command", "input"])),
            ("cite", meta("cite", &["blockquote", "del", "ins", "q"])),
            ("class", meta("className", &[])),
            ("cols", meta("cols", &["textarea"])),
            ("colspan", meta("colSpan", &["td", "th"])),
            ("content", meta("content", &["meta"])),
            ("contenteditable", meta("contentEditable", &[])),
            ("controls", meta("controls", &["audio", "video"])),
            ("coords", meta("coords", &["area"])),
            ("data", meta("data", &["object"])),
            ("datetime", meta("dateTime", &["del", "ins", "time"])),
            ("default", meta("default", &["track"])),
            ("defer", meta("defer", &["script"])),
            ("dir", meta("dir", &[])),
            ("dirname", meta("dirName", &["input", "textarea"])),
            ("disabled", meta("disabled", &[
                "button", "command", "fieldset", "input", "keygen", "optgroup", "option",
                "select", "textarea",
            ])),
            ("download", meta("download", &["a", "area"])),
            ("draggable", meta("draggable", &[])),
            ("enctype", meta("enctype", &["form"])),
            ("for", meta("htmlFor", &["label", "output"])),
            ("formaction", meta("formAction", &["input", "button"])),
            ("headers", meta("headers", &["td", "th"])),
            ("height", meta("height", &["canvas", "embed", "iframe", "img", "input", "object", "video"])),
            ("hidden", meta("hidden", &[])),
            ("high", meta("high", &["meter"])),
            ("href", meta("href", &["a", "area", "base", "link"])),
            ("hreflang", meta("hreflang", &["a", "area", "link"])),
            ("http-equiv", meta("httpEquiv", &["meta"])),
            ("id", meta("id", &[])),
            ("ismap", meta("isMap", &["img"])),
            ("kind", meta("kind", &["track"])),
            ("label", meta("label", &["track"])),
            ("lang", meta("lang", &[])),
            ("loop", meta("loop", &["audio", "bgsound", "marquee", "video"])),
            ("low", meta("low", &["meter"])),
            ("max", meta("max", &["input", "meter", "progress"])),
            ("maxlength", meta("maxLength", &["input", "textarea"])),
            ("media", meta("media", &["a", "area", "link", "source", "style"])),
            ("method", meta("method", &["form"])),
            ("min", meta("min", &["input", "meter"])),
            ("multiple", meta("multiple", &["input", "select"])),
            ("muted", meta("muted", &["video"])),
            ("name", meta("name", &[
                "button", "form", "fieldset", "iframe", "input", "keygen", "object", "output",
                "select", "textarea", "map", "meta", "param",
            ])),
            ("novalidate", meta("noValidate", &["form"])),
            ("open", meta("open", &["details"])),
            ("optimum", meta("optimum", &["meter"])),
            ("pattern", meta("pattern", &["input"])),
            ("placeholder", meta("placeholder", &["input", "textarea"])),
            ("poster", meta("poster", &["video"])),
            ("preload", meta("preload", &["audio", "video"])),
            ("readonly", meta("readOnly", &["input", "textarea"])),
            ("rel", meta("rel", &["a", "area", "link"])),
            ("required", meta("required", &["input", "select", "textarea"])),
            ("reversed", meta("reversed", &["ol"])),
            ("rows", meta("rows", &["textarea"])),
            ("rowspan", meta("rowSpan", &["td", "th"])),
            ("sandbox", meta("sandbox", &["iframe"])),
            ("scope", meta("scope", &["th"])),
            ("selected", meta("selected", &["option"])),
            ("shape", meta("shape", &["a", "area"])),
            ("size", meta("size", &["input", "select"])),
            ("sizes", meta("sizes", &["link", "img", "source"])),
            ("span", meta("span", &["col", "colgroup"])),
            ("spellcheck", meta("spellcheck", &[])),
            ("src", meta("src", &[
                "audio", "embed", "iframe", "img", "input", "script", "source", "track", "video",
            ])),
            ("srcdoc", meta("srcdoc", &["iframe"])),
            ("srclang", meta("srclang", &["track"])),
            ("srcset", meta("srcset", &["img"])),
            ("start", meta("start", &["ol"])),
            ("step", meta("step", &["input"])),
            ("style", meta("style.cssText", &[])),
            ("summary", meta("summary", &["table"])),
            ("tabindex", meta("tabIndex", &[])),
            ("target", meta("target", &["a", "area", "base", "form"])),
            ("title", meta("title", &[])),
            ("type", meta("type", &[
                "button", "input", "command", "embed", "object", "script", "source", "style", "menu",
            ])),
            ("usemap", meta("useMap", &["img", "input", "object"])),
            ("value", meta("value", &[
                "button", "option", "input", "li", "meter", "progress", "param", "select", "textarea",
            ])),
            ("width", meta("width", &["canvas", "embed", "iframe", "img", "input", "object", "video"])),
            ("wrap", meta("wrap", &["textarea"])),
        ];
        entries.iter().copied().collect()
    };
}

/// Returns the property an attribute should be written through on `tag`,
/// or `None` when `setAttribute` must be used instead.
pub fn property_for(attribute: &str, tag: &str) -> Option<&'static str> {
    let metadata = LOOKUP.get(attribute)?;
    if metadata.applies_to.is_empty() || metadata.applies_to.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
        Some(metadata.property)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_attributes_map_everywhere() {
        assert_eq!(property_for("class", "div"), Some("className"));
        assert_eq!(property_for("tabindex", "span"), Some("tabIndex"));
    }

    #[test]
    fn restricted_attributes_check_tag() {
        assert_eq!(property_for("value", "input"), Some("value"));
        assert_eq!(property_for("value", "div"), None);
        assert_eq!(property_for("for", "label"), Some("htmlFor"));
    }

    #[test]
    fn unknown_attribute_uses_set_attribute() {
        assert_eq!(property_for("data-id", "div"), None);
        assert_eq!(property_for("aria-label", "button"), None);
    }
}
