//! climeta — compile the `cli` struct tags of a Go command type into metadata.
//!
//! - **stdin mode**: `climeta -t Tester < tester.go`
//! - **file mode**: `climeta -t Tester -f text -o tester.txt tester.go`
//! - **directory output**: `climeta -t Tester -o out/ tester.go` writes `out/<command>.json`

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use climeta::{render, CompileOptions, DEFAULT_TAG_KEY};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "climeta",
    about = "Compile cli struct tags on a Go type into command metadata"
)]
struct Cli {
    /// Go source file. If omitted, reads from stdin.
    file: Option<PathBuf>,

    /// Name of the struct type implementing the command
    #[arg(short = 't', long = "type")]
    type_name: String,

    /// Struct tag key holding the annotations
    #[arg(short = 'k', long, default_value = DEFAULT_TAG_KEY)]
    tag_key: String,

    /// Output format: json (default), text
    #[arg(short = 'f', long, default_value = "json")]
    format: String,

    /// Output file, or a directory to write NAME.EXT into. If omitted, writes to stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let renderer = render::create_renderer(&cli.format)?;
    let options = CompileOptions {
        tag_key: cli.tag_key.clone(),
    };

    let command = match &cli.file {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            climeta::from_reader(&path.display().to_string(), file, &cli.type_name, &options)?
        }
        None => climeta::from_reader("<stdin>", io::stdin().lock(), &cli.type_name, &options)?,
    };

    let output = renderer.render(&command)?;
    match &cli.output {
        Some(path) => {
            let out_path = if path.is_dir() {
                path.join(format!("{}.{}", command.name, renderer.file_extension()))
            } else {
                path.clone()
            };
            fs::write(&out_path, output)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}
