// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compile command for turning one template into a component module.

use crate::config::Config;
use anyhow::Context;
use console::style;
use mosaic::{compile, CompileOptions, CompileOutput, DomFlavor};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arguments of `mosaic compile`.
#[derive(Debug, Clone)]
pub struct CompileArgs {
    /// Template to compile.
    pub input: PathBuf,
    /// Where to write the module; stdout when absent.
    pub output: Option<PathBuf>,
    /// Write a `.map` file next to the output.
    pub map: bool,
    /// Append the source map to the module as a comment.
    pub inline_map: bool,
    /// DOM flavor, overriding `mosaic.toml`.
    pub dom: Option<DomFlavor>,
}

/// Runs the compile command.
pub async fn run(args: CompileArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let dom = args.dom.unwrap_or(config.build.dom);

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mut options = options_for(&args.input, Path::new(""), dom);
    options.source_map = args.inline_map;

    let output = compile(&source, &options)
        .with_context(|| format!("failed to compile {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            write_component(&output, &source, &options, path, args.map)?;
            eprintln!("{} {}", style("Compiled").green(), path.display());
        }
        None => {
            if args.map {
                anyhow::bail!("--map needs --output to know where to write the map file");
            }
            std::io::stdout().write_all(output.code.as_bytes())?;
        }
    }
    Ok(())
}

/// Compile options for the template at `path`, named after its file stem
/// and recorded relative to `root`.
pub fn options_for(path: &Path, root: &Path, dom: DomFlavor) -> CompileOptions {
    let relative = path.strip_prefix(root).unwrap_or(path);
    CompileOptions {
        name: path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string),
        filename: Some(relative.to_string_lossy().replace('\\', "/")),
        dom,
        source_map: false,
    }
}

/// Writes a compiled component to `js_path`, and its source map to
/// `<js_path>.map` when `map` is set.
pub fn write_component(
    output: &CompileOutput,
    source: &str,
    options: &CompileOptions,
    js_path: &Path,
    map: bool,
) -> anyhow::Result<()> {
    if let Some(parent) = js_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = js_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| options.output_file());

    if !map {
        fs::write(js_path, &output.code)?;
        return Ok(());
    }

    let map_file = format!("{}.map", file);
    let map_path = js_path.with_file_name(&map_file);
    let json = output.to_v3_json(&file, &options.source_name(), source)?;
    fs::write(&map_path, json)?;
    fs::write(js_path, format!("{}//# sourceMappingURL={}\n", output.code, map_file))?;
    debug!(js = %js_path.display(), map = %map_path.display(), "wrote component");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_named_after_the_file() {
        let options = options_for(Path::new("app/src/widgets/Counter.html"), Path::new("app"), DomFlavor::Injected);
        assert_eq!(options.name.as_deref(), Some("Counter"));
        assert_eq!(options.filename.as_deref(), Some("src/widgets/Counter.html"));
        assert_eq!(options.dom, DomFlavor::Injected);
        assert_eq!(options.output_file(), "Counter.js");
    }

    #[test]
    fn writes_code_and_map() {
        let dir = tempfile::tempdir().unwrap();
        let source = "<p>{{message}}</p>";
        let options = options_for(Path::new("Hello.html"), Path::new(""), DomFlavor::Document);
        let output = compile(source, &options).unwrap();

        let js_path = dir.path().join("out/Hello.js");
        write_component(&output, source, &options, &js_path, true).unwrap();

        let code = fs::read_to_string(&js_path).unwrap();
        assert!(code.starts_with(&output.code));
        assert!(code.ends_with("//# sourceMappingURL=Hello.js.map\n"));

        let map = fs::read_to_string(dir.path().join("out/Hello.js.map")).unwrap();
        assert!(map.contains("\"version\":3"));
        assert!(map.contains("Hello.html"));
    }

    #[test]
    fn writes_code_only_without_map() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_for(Path::new("Plain.html"), Path::new(""), DomFlavor::Document);
        let output = compile("<p>plain</p>", &options).unwrap();

        let js_path = dir.path().join("Plain.js");
        write_component(&output, "<p>plain</p>", &options, &js_path, false).unwrap();

        assert_eq!(fs::read_to_string(&js_path).unwrap(), output.code);
        assert!(!dir.path().join("Plain.js.map").exists());
    }
}
