// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Watch command for rebuilding templates as they change.

use crate::commands::build::discover;
use crate::commands::compile::{options_for, write_component};
use crate::config::{BuildConfig, Config};
use crate::watcher::FileWatcher;
use console::style;
use mosaic::{cache_key, compile, Cache, MemoryCache};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, warn};

/// Number of compiled components remembered between rebuilds.
const CACHE_CAPACITY: usize = 256;

/// What a rebuild of one template did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rebuild {
    /// The module was (re)written.
    Written(PathBuf),
    /// The source was compiled before with identical contents.
    Unchanged,
    /// The template is gone, so its module was deleted.
    Removed(PathBuf),
}

/// Recompiles single templates, skipping ones whose contents are unchanged.
#[derive(Debug, Clone)]
pub struct Rebuilder {
    root: PathBuf,
    build: BuildConfig,
    cache: MemoryCache,
}

impl Rebuilder {
    /// A rebuilder for the project at `root`.
    pub fn new(root: PathBuf, build: BuildConfig) -> anyhow::Result<Self> {
        Ok(Self { root, build, cache: MemoryCache::new(CACHE_CAPACITY)? })
    }

    fn module_path(&self, template: &Path) -> PathBuf {
        let src_dir = self.build.src_path(&self.root);
        let relative = template.strip_prefix(&src_dir).unwrap_or(template);
        self.root.join(&self.build.out_dir).join(relative.with_extension("js"))
    }

    /// Brings the module for `template` up to date.
    pub fn rebuild(&self, template: &Path) -> anyhow::Result<Rebuild> {
        let module = self.module_path(template);

        if !template.exists() {
            if module.exists() {
                fs::remove_file(&module)?;
            }
            let map = module.with_extension("js.map");
            if map.exists() {
                fs::remove_file(&map)?;
            }
            return Ok(Rebuild::Removed(module));
        }

        let source = fs::read_to_string(template)?;
        let options = options_for(template, &self.root, self.build.dom);
        let key = cache_key(&source, &options)?;
        if self.cache.contains_key(&key) && module.exists() {
            debug!(template = %template.display(), "unchanged, skipping");
            return Ok(Rebuild::Unchanged);
        }

        let output = Arc::new(compile(&source, &options)?);
        write_component(&output, &source, &options, &module, self.build.source_maps)?;
        self.cache.set(&key, output)?;
        Ok(Rebuild::Written(module))
    }
}

/// Runs the file watcher, rebuilding every changed template.
pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let working_dir = std::env::current_dir()?;
    let rebuilder = Rebuilder::new(working_dir.clone(), config.build.clone())?;

    for template in discover(&working_dir, &config.build)? {
        report(&template, rebuilder.rebuild(&template));
    }

    let src_dir = config.build.src_path(&working_dir);
    println!("Watching for changes in: {}", src_dir.display());
    println!("Press Ctrl+C to stop...");
    println!();

    let _watcher = FileWatcher::new(&src_dir, &config.build.extension, move |paths: Vec<PathBuf>| {
        for template in paths {
            report(&template, rebuilder.rebuild(&template));
        }
    })?;

    signal::ctrl_c().await?;

    println!("\nStopping file watcher...");
    Ok(())
}

fn report(template: &Path, result: anyhow::Result<Rebuild>) {
    match result {
        Ok(Rebuild::Written(module)) => {
            println!("  {} {}", style("Built").green(), module.display());
        }
        Ok(Rebuild::Removed(module)) => {
            println!("  {} {}", style("Removed").yellow(), module.display());
        }
        Ok(Rebuild::Unchanged) => {}
        Err(err) => {
            warn!(template = %template.display(), error = %err, "rebuild failed");
            eprintln!("  {} {}: {:#}", style("Error:").red().bold(), template.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> (tempfile::TempDir, Rebuilder) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let rebuilder = Rebuilder::new(dir.path().to_path_buf(), BuildConfig::default()).unwrap();
        (dir, rebuilder)
    }

    #[test]
    fn rebuild_writes_then_skips_unchanged() {
        let (dir, rebuilder) = project();
        let template = dir.path().join("src/Greeting.html");
        fs::write(&template, "<p>Hello {{name}}</p>").unwrap();

        let module = dir.path().join("dist/Greeting.js");
        assert_eq!(rebuilder.rebuild(&template).unwrap(), Rebuild::Written(module.clone()));
        assert!(fs::read_to_string(&module).unwrap().contains("root.name"));

        assert_eq!(rebuilder.rebuild(&template).unwrap(), Rebuild::Unchanged);

        fs::write(&template, "<p>Bye {{name}}</p>").unwrap();
        assert_eq!(rebuilder.rebuild(&template).unwrap(), Rebuild::Written(module));
    }

    #[test]
    fn deleted_template_removes_module() {
        let (dir, rebuilder) = project();
        let template = dir.path().join("src/Gone.html");
        fs::write(&template, "<p>soon gone</p>").unwrap();
        rebuilder.rebuild(&template).unwrap();

        fs::remove_file(&template).unwrap();
        let module = dir.path().join("dist/Gone.js");
        assert_eq!(rebuilder.rebuild(&template).unwrap(), Rebuild::Removed(module.clone()));
        assert!(!module.exists());
    }

    #[test]
    fn compile_errors_propagate() {
        let (dir, rebuilder) = project();
        let template = dir.path().join("src/Broken.html");
        fs::write(&template, "<div><p></div>").unwrap();
        assert!(rebuilder.rebuild(&template).is_err());
    }
}
