// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Mosaic CLI library.
//!
//! This crate provides the command-line interface for the Mosaic
//! component compiler.
//!
//! # Usage
//!
//! This crate is primarily used through the `mosaic` binary:
//!
//! ```bash
//! mosaic compile src/App.html -o dist/App.js --map
//! mosaic build     # Compile every template of the project
//! mosaic watch     # Rebuild templates as they change
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `mosaic.toml` at the project root.

/// CLI commands (compile, build, watch).
pub mod commands;
/// Project configuration from `mosaic.toml`.
pub mod config;
/// File system watching.
pub mod watcher;
