// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `compile`: Compile a single template
//! - `build`: Compile every template of a project
//! - `watch`: Rebuild templates as they change

/// Project build command.
pub mod build;
/// Single file compile command.
pub mod compile;
/// File watch command.
pub mod watch;
