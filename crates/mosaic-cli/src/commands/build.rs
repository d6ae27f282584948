// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Build command for compiling every template of a project.

use crate::commands::compile::{options_for, write_component};
use crate::config::{BuildConfig, Config};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mosaic::compile;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome of a project build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Modules written, relative to the output directory.
    pub written: Vec<PathBuf>,
    /// Templates that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Runs the build command.
pub async fn run(out_dir: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(out_dir) = out_dir {
        config.build.out_dir = out_dir;
    }
    let working_dir = std::env::current_dir()?;

    println!(
        "{} {}",
        style("Building templates from:").cyan(),
        config.build.src_dir
    );

    let templates = discover(&working_dir, &config.build)?;
    if templates.is_empty() {
        println!("No templates found in {}", config.build.src_dir);
        return Ok(());
    }

    println!(
        "{} {} template(s)",
        style("Found").green(),
        templates.len()
    );

    let pb = ProgressBar::new(templates.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.green} Compiling [{bar:30.cyan/blue}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let start = Instant::now();
    let report = build_templates(&working_dir, &config.build, &templates, &pb)?;
    pb.finish_and_clear();

    for (path, message) in &report.failed {
        eprintln!("{} {}: {}", style("Error:").red().bold(), path.display(), message);
    }
    if !report.failed.is_empty() {
        anyhow::bail!("{} of {} template(s) failed to compile", report.failed.len(), templates.len());
    }

    println!(
        "{} {} {} {}",
        style("Build complete!").green().bold(),
        style(format!("{} component(s) written to {} in", report.written.len(), config.build.out_dir)).dim(),
        style(format!("{}ms", start.elapsed().as_millis())).cyan(),
        if config.build.source_maps { style("(with source maps)").dim().to_string() } else { String::new() }
    );
    Ok(())
}

/// Every template under the configured source directory, sorted.
pub fn discover(root: &Path, build: &BuildConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut templates: Vec<PathBuf> = glob::glob(&build.pattern(root))?.flatten().collect();
    templates.sort();
    Ok(templates)
}

/// Compiles `templates` into the configured output directory, mirroring
/// their layout below the source directory.
///
/// A template that fails to compile is recorded in the report and does
/// not stop the others.
pub fn build_templates(
    root: &Path,
    build: &BuildConfig,
    templates: &[PathBuf],
    pb: &ProgressBar,
) -> anyhow::Result<BuildReport> {
    let src_dir = build.src_path(root);
    let out_dir = root.join(&build.out_dir);
    fs::create_dir_all(&out_dir)?;

    let mut report = BuildReport::default();
    for path in templates {
        let relative = path.strip_prefix(&src_dir).unwrap_or(path).with_extension("js");
        let source = fs::read_to_string(path)?;
        let options = options_for(path, root, build.dom);

        match compile(&source, &options) {
            Ok(output) => {
                write_component(&output, &source, &options, &out_dir.join(&relative), build.source_maps)?;
                debug!(template = %path.display(), module = %relative.display(), "built component");
                report.written.push(relative);
            }
            Err(err) => {
                warn!(template = %path.display(), error = %err, "template failed to compile");
                report.failed.push((path.clone(), err.to_string()));
            }
        }
        pb.inc(1);
    }
    Ok(report)
}
