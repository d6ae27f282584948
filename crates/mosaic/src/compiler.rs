// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The compile entry points.

use crate::cache::{cache_key, Cache, MemoryCache, NoOpCache};
use crate::codegen::{generate, DomFlavor};
use crate::error::Result;
use crate::parser::parse;
use crate::sourcemap::{SourceMap, SourceMapV3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Settings for one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Component name, used for the generated file name in source maps.
    pub name: Option<String>,
    /// Path of the template, recorded as the source map's source.
    pub filename: Option<String>,
    /// How generated code reaches the DOM.
    pub dom: DomFlavor,
    /// Append the source map to the code as an inline comment.
    pub source_map: bool,
}

impl CompileOptions {
    /// Name of the generated file.
    pub fn output_file(&self) -> String {
        match (&self.name, &self.filename) {
            (Some(name), _) => format!("{}.js", name),
            (None, Some(filename)) => {
                let stem = std::path::Path::new(filename)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or("component");
                format!("{}.js", stem)
            }
            (None, None) => "component.js".to_string(),
        }
    }

    /// Name the template is referred to by in source maps.
    pub fn source_name(&self) -> String {
        self.filename.clone().unwrap_or_else(|| "component.html".to_string())
    }
}

/// A compiled component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOutput {
    /// The JavaScript module.
    pub code: String,
    /// Mapping from `code` back to the template source.
    pub map: SourceMap,
    /// Contents of the `<style>` block, if any.
    pub css: Option<String>,
    /// Renderer function names in emission order.
    pub renderers: Vec<String>,
}

impl CompileOutput {
    /// A Source Map v3 document for [`CompileOutput::code`].
    pub fn to_v3(&self, file: &str, source_name: &str, source: &str) -> SourceMapV3 {
        self.map.to_v3(&self.code, source, file, source_name)
    }

    /// The Source Map v3 document as JSON.
    pub fn to_v3_json(&self, file: &str, source_name: &str, source: &str) -> Result<String> {
        self.to_v3(file, source_name, source).to_json()
    }
}

/// Compiles template `source` into a component module.
///
/// ```rust
/// use mosaic::{compile, CompileOptions};
///
/// let output = compile("<p>{{greeting}}</p>", &CompileOptions::default()).unwrap();
/// assert!(output.code.contains("export default function createComponent ( options )"));
/// ```
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileOutput> {
    let template = parse(source)?;
    let mut output = generate(&template, source, options.dom)?;

    if options.source_map {
        let comment = output.to_v3(&options.output_file(), &options.source_name(), source).to_comment()?;
        output.code.push_str(&comment);
        output.code.push('\n');
    }

    debug!(
        file = options.filename.as_deref().unwrap_or("<inline>"),
        bytes = output.code.len(),
        renderers = output.renderers.len(),
        "compiled component"
    );
    Ok(output)
}

/// A compiler with fixed options and a cache of previous outputs.
#[derive(Debug)]
pub struct Compiler {
    options: CompileOptions,
    cache: Box<dyn Cache>,
}

impl Compiler {
    /// A compiler that never caches.
    pub fn new(options: CompileOptions) -> Self {
        Self::with_cache(options, Box::new(NoOpCache))
    }

    /// A compiler backed by an in-memory LRU cache of `capacity` outputs.
    pub fn with_memory_cache(options: CompileOptions, capacity: usize) -> Result<Self> {
        Ok(Self::with_cache(options, Box::new(MemoryCache::new(capacity)?)))
    }

    /// A compiler backed by `cache`.
    pub fn with_cache(options: CompileOptions, cache: Box<dyn Cache>) -> Self {
        Self { options, cache }
    }

    /// The options every compilation uses.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles `source`, reusing a cached output when the source and
    /// options are unchanged.
    pub fn compile(&self, source: &str) -> Result<Arc<CompileOutput>> {
        let key = cache_key(source, &self.options)?;
        if let Some(output) = self.cache.get(&key)? {
            debug!(key = %&key[..12], "cache hit");
            return Ok(output);
        }

        let output = Arc::new(compile(source, &self.options)?);
        self.cache.set(&key, Arc::clone(&output))?;
        info!(
            file = self.options.filename.as_deref().unwrap_or("<inline>"),
            "compiled and cached component"
        );
        Ok(output)
    }

    /// Forgets every cached output.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_file_names() {
        let named = CompileOptions { name: Some("Counter".to_string()), ..CompileOptions::default() };
        assert_eq!(named.output_file(), "Counter.js");

        let from_path = CompileOptions { filename: Some("src/Todo.html".to_string()), ..CompileOptions::default() };
        assert_eq!(from_path.output_file(), "Todo.js");
        assert_eq!(from_path.source_name(), "src/Todo.html");

        assert_eq!(CompileOptions::default().output_file(), "component.js");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: CompileOptions = serde_json::from_str(r#"{ "dom": "injected" }"#).unwrap();
        assert_eq!(options.dom, DomFlavor::Injected);
        assert!(!options.source_map);
    }

    #[test]
    fn inline_source_map() {
        let options = CompileOptions { source_map: true, ..CompileOptions::default() };
        let output = compile("<p>{{a}}</p>", &options).unwrap();
        assert!(output.code.contains("//# sourceMappingURL=data:application/json;charset=utf-8;base64,"));
    }

    #[test]
    fn cached_compiles_are_shared() {
        let compiler = Compiler::with_memory_cache(CompileOptions::default(), 8).unwrap();
        let first = compiler.compile("<p>{{a}}</p>").unwrap();
        let second = compiler.compile("<p>{{a}}</p>").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        compiler.clear_cache().unwrap();
        let third = compiler.compile("<p>{{a}}</p>").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first.code, third.code);
    }

    #[test]
    fn uncached_compiler_recompiles() {
        let compiler = Compiler::new(CompileOptions::default());
        let first = compiler.compile("<p>{{a}}</p>").unwrap();
        let second = compiler.compile("<p>{{a}}</p>").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }
}
