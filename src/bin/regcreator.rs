//! regcreator CLI
//!
//! Reads a JSON menu description and writes the `.reg` file installing it,
//! plus the twin file removing the same keys.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use regcreator::{regfile_from_json, remove_file_path, RegConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "regcreator")]
#[command(about = "Create a Windows reg file to edit registry keys")]
#[command(version)]
struct Cli {
    /// Path to the JSON file describing the keys
    source: PathBuf,

    /// Path to the reg file to write on disk (defaults to the source with a .reg extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comment to add to the header of the generated files (repeatable)
    #[arg(short, long = "comment")]
    comments: Vec<String>,

    /// Path to a configuration file
    #[arg(long)]
    config: Option<String>,

    /// Do not write the removal file
    #[arg(long)]
    no_remove: bool,

    /// Toggle logging at debug level
    #[arg(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RegConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let mut regfile = regfile_from_json(&cli.source)
        .with_context(|| format!("Failed to build keys from <{}>", cli.source.display()))?;
    regfile.set_line_ending(config.output.line_ending);

    for comment in config.header.comments.iter().chain(cli.comments.iter()) {
        regfile.insert_header_comment(comment.as_str());
    }
    if let Some(file_name) = cli.source.file_name() {
        regfile.insert_header_comment(format!("Source: {}", file_name.to_string_lossy()));
    }

    let output = cli.output.clone().unwrap_or_else(|| default_output(&cli.source));
    regfile
        .write_to(&output)
        .with_context(|| format!("Failed to write <{}>", output.display()))?;
    println!("Reg file created at: {}", output.display());

    if config.output.write_remove_file && !cli.no_remove {
        let remove_output = remove_file_path(&output, &config.output.remove_suffix);
        regfile.set_removing(true);
        regfile
            .write_to(&remove_output)
            .with_context(|| format!("Failed to write <{}>", remove_output.display()))?;
        println!("Reg file created at: {}", remove_output.display());
    }

    Ok(())
}

fn default_output(source: &Path) -> PathBuf {
    source.with_extension("reg")
}
