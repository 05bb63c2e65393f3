mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{catalog, check, init, serve, CatalogArgs, CheckArgs, InitArgs, ServeArgs};
use tracing_subscriber::EnvFilter;

/// Pagewright CLI - section-based page builder workspace
#[derive(Parser, Debug)]
#[command(name = "pagewright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a pagewright.config.json and an empty settings file
    Init(InitArgs),

    /// Serve the settings, stylesheet and media endpoints
    Serve(ServeArgs),

    /// Check saved settings against the section catalog
    Check(CheckArgs),

    /// List the registered section types
    Catalog(CatalogArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Serve(args) => serve(args, &cwd),
            Command::Check(args) => check(args, &cwd),
            Command::Catalog(args) => catalog(args),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
