// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]
#![allow(clippy::result_large_err)]

//! # Mosaic
//!
//! Compiles declarative UI templates into self-contained, stateful
//! JavaScript components.
//!
//! A template is markup with `{{expressions}}`, `{{#if}}` and `{{#each}}`
//! blocks, `on:` event handlers, `bind:` two-way bindings and `ref:`
//! handles, plus an optional `<script>` exporting the component
//! definition (`data`, `computed`, `methods`, `helpers`, `events`,
//! `onrender`, `onteardown`). The output is an ES module whose default
//! export, `createComponent( options )`, mounts the component into
//! `options.target` and returns an object with `get`, `set`, `observe`
//! and `teardown`.
//!
//! ## Quick Start
//!
//! ```rust
//! use mosaic::{compile, CompileOptions};
//!
//! let source = "<h1>Hello {{name}}!</h1>";
//! let output = compile(source, &CompileOptions::default())?;
//!
//! assert!(output.code.contains("root.name"));
//! # Ok::<(), mosaic::CompileError>(())
//! ```

/// Template syntax tree.
pub mod ast;
/// Compiled output caching.
pub mod cache;
/// JavaScript generation.
pub mod codegen;
/// Compile entry points and options.
pub mod compiler;
/// Ordering of computed properties.
pub mod dependencies;
/// Error types and reporting.
pub mod error;
/// Expression syntax tree and reference analysis.
pub mod expr;
/// Template and expression parser.
pub mod parser;
/// Reading the template definition from `<script>`.
pub mod script_processor;
/// Attribute to DOM property lookup.
pub mod attributes;
/// Mapping generated code back to the template.
pub mod sourcemap;

pub use ast::{Span, Template};
pub use cache::{cache_key, Cache, MemoryCache, NoOpCache};
pub use codegen::{DomApi, DomFlavor};
pub use compiler::{compile, CompileOptions, CompileOutput, Compiler};
pub use error::{CompileError, Result, SourceContext};
pub use parser::{parse, parse_expression};
pub use sourcemap::{SourceMap, SourceMapV3};
