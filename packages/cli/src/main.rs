mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{render, scan, RenderArgs, ScanArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Diagrammer CLI - Reed-Kellogg style sentence diagrams from the terminal
#[derive(Parser, Debug)]
#[command(name = "diagrammer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a sentence into words and show their ids
    Scan(ScanArgs),

    /// Replay an edit script over a sentence and print its labels
    Render(RenderArgs),
}

fn init_logging(cwd: &str) {
    let fallback = Config::load(cwd)
        .map(|config| config.log_filter)
        .unwrap_or_else(|_| Config::default().log_filter);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    init_logging(&cwd);

    let result = match cli.command {
        Command::Scan(args) => scan(args),
        Command::Render(args) => render(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
