// Command-line entry point for flowsketch.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flowsketch::application::BuildUsecase;
use flowsketch::infrastructure::EstreeLoader;
use flowsketch::ports::dot_exporter::DotExporter;
use flowsketch::ports::json_exporter::JsonExporter;
use flowsketch::ports::GraphExporter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input AST file (ESTree-style JSON)
    #[arg(short, long)]
    input: String,

    /// Output file path
    #[arg(short, long)]
    output: String,

    /// Output format (dot, json)
    #[arg(short, long, default_value = "dot")]
    format: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let src = fs::read_to_string(&cli.input)
        .with_context(|| format!("cannot read input file {}", cli.input))?;

    let loader = EstreeLoader;
    let exporter: &dyn GraphExporter = match cli.format.as_str() {
        "dot" => &DotExporter,
        "json" => &JsonExporter,
        other => bail!("unsupported format `{other}` (expected dot or json)"),
    };

    let usecase = BuildUsecase { loader: &loader, exporter };
    let cfg = usecase.run(&src, Path::new(&cli.output))?;

    println!(
        "Analysis completed! {} blocks written to {} (format: {})",
        cfg.reachable().len(),
        cli.output,
        cli.format
    );
    if !cfg.unhandled_kinds().is_empty() {
        eprintln!("[WARN] unhandled syntax kinds: {}", cfg.unhandled_kinds().join(", "));
    }
    Ok(())
}
