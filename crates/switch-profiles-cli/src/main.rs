use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

mod commands;
mod configuration;

use configuration::{Overrides, Settings};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the Go switch profile sources
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Directory the JSON profiles are written to; must already exist
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Glob matched against file names in the input directory
    #[arg(long, global = true)]
    pattern: Option<String>,

    /// Settings file (defaults to ./switch-profiles.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every profile source into JSON (the default)
    Convert,

    /// Parse and validate every profile without writing anything
    Check,

    /// List the switch models found in the input directory
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())
        .context("Failed to load settings")?
        .apply(Overrides {
            input_dir: cli.input_dir,
            output_dir: cli.output_dir,
            pattern: cli.pattern,
        });

    match cli.command.unwrap_or(Command::Convert) {
        Command::Convert => commands::convert::execute(&settings),
        Command::Check => commands::check::execute(&settings),
        Command::List { json } => commands::list::execute(&settings, json),
        Command::Version => commands::version::execute(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
