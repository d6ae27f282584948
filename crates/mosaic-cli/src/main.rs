// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use mosaic::DomFlavor;
use mosaic_cli::commands;
use mosaic_cli::commands::compile::CompileArgs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Compile UI templates into self-contained JavaScript components", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a single template
    Compile {
        /// Template file
        input: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write a source map next to the output
        #[arg(long)]
        map: bool,
        /// Append the source map to the output as a data URL
        #[arg(long)]
        inline_map: bool,
        /// DOM flavor: document, injected
        #[arg(long)]
        dom: Option<DomFlavor>,
    },
    /// Compile every template of the project
    Build {
        /// Output directory (overrides mosaic.toml)
        #[arg(long)]
        out_dir: Option<String>,
    },
    /// Watch templates and rebuild on change
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile { input, output, map, inline_map, dom } => {
            commands::compile::run(CompileArgs { input, output, map, inline_map, dom }).await
        }
        Commands::Build { out_dir } => commands::build::run(out_dir).await,
        Commands::Watch => commands::watch::run().await,
    }
}
