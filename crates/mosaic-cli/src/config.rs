// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Mosaic project configuration.
//!
//! Configuration is loaded from `mosaic.toml` at the project root.
//!
//! # Example Configuration
//!
//! ```toml
//! [project]
//! name = "my-app"
//!
//! [build]
//! src_dir = "src"
//! out_dir = "dist"
//! extension = "html"
//! source_maps = true
//! dom = "document"
//! ```

use mosaic::DomFlavor;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "mosaic.toml";

/// Main configuration structure loaded from `mosaic.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Project metadata.
    #[serde(default)]
    pub project: ProjectConfig,
    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Project metadata configuration.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project name (default: "unnamed").
    #[serde(default = "default_name")]
    pub name: String,
}

/// Build configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Directory searched for templates (default: "src").
    #[serde(default = "default_src_dir")]
    pub src_dir: String,
    /// Directory compiled components are written to (default: "dist").
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    /// Template file extension, without the dot (default: "html").
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Write a `.js.map` next to every component (default: false).
    #[serde(default)]
    pub source_maps: bool,
    /// DOM flavor of the generated code (default: "document").
    #[serde(default)]
    pub dom: DomFlavor,
}

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_extension() -> String {
    "html".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name() }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            extension: default_extension(),
            source_maps: false,
            dom: DomFlavor::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `mosaic.toml` in the current directory.
    ///
    /// If no configuration file exists, returns default configuration.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&std::env::current_dir()?)
    }

    /// Loads configuration from `mosaic.toml` in `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load_from(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl BuildConfig {
    /// Glob pattern matching every template under `root`.
    pub fn pattern(&self, root: &Path) -> String {
        format!("{}/**/*.{}", root.join(&self.src_dir).display(), self.extension)
    }

    /// The source directory resolved against `root`.
    pub fn src_path(&self, root: &Path) -> PathBuf {
        root.join(&self.src_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.project.name, "unnamed");
        assert_eq!(config.build.src_dir, "src");
        assert_eq!(config.build.out_dir, "dist");
        assert_eq!(config.build.extension, "html");
        assert!(!config.build.source_maps);
        assert_eq!(config.build.dom, DomFlavor::Document);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[project]\nname = \"todo\"\n\n[build]\nextension = \"mosaic\"\ndom = \"injected\"\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.project.name, "todo");
        assert_eq!(config.build.extension, "mosaic");
        assert_eq!(config.build.dom, DomFlavor::Injected);
        assert_eq!(config.build.out_dir, "dist");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[build\n").unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }
}
