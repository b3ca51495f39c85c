//! Ferry CLI - Python constants and native extension builds from a C project

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ferry::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Arc<Shell>,
    pub manifest_path: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; FERRY_LOG overrides the flag-derived level
    let default_filter = if cli.quiet {
        "ferry=error"
    } else if cli.verbose {
        "ferry=debug"
    } else {
        "ferry=info"
    };
    let filter =
        EnvFilter::try_from_env("FERRY_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global_opts = GlobalOptions {
        shell: Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color)),
        manifest_path: cli.manifest_path,
    };

    // Execute command
    match cli.command {
        Commands::Generate => commands::generate::execute(&global_opts),
        Commands::Build(args) => commands::build::execute(args, &global_opts),
        Commands::Show(args) => commands::show::execute(args, &global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
