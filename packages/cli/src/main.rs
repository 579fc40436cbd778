mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, convert, extensions, init, schema, ApplyArgs, ConvertArgs, ExtensionsArgs, InitArgs, SchemaArgs};
use std::path::PathBuf;

/// Folio CLI - build editor schemas and run commands on documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to folio.config.json in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a folio.config.json enabling every built-in extension
    Init(InitArgs),

    /// List the registered extensions and their options
    Extensions(ExtensionsArgs),

    /// Print the composite schema for the configured extensions
    Schema(SchemaArgs),

    /// Convert a document between markup and JSON
    Convert(ConvertArgs),

    /// Run a command script against a document
    Apply(ApplyArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("{} Cannot read the working directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };
    let config = cli.config.as_deref();

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Extensions(args) => extensions(args),
        Command::Schema(args) => schema(args, &cwd, config).await,
        Command::Convert(args) => convert(args, &cwd, config).await,
        Command::Apply(args) => apply(args, &cwd, config).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
