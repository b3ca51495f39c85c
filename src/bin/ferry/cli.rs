//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use ferry::util::shell::ColorChoice;

/// Ferry - generate Python constants from C headers and build the native extension
#[derive(Parser)]
#[command(name = "ferry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors (wins over --verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Path to Ferry.toml (defaults to searching upward from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the constants module from the configured headers
    Generate,

    /// Regenerate constants, then configure and build the native extension
    Build(BuildArgs),

    /// Print the extracted constants without writing anything
    Show(ShowArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the CMake commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the cmake executable
    #[arg(long, value_name = "PATH", env = "FERRY_CMAKE")]
    pub cmake: Option<PathBuf>,

    /// CMake generator, e.g. "Ninja"
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Extra arguments for the configure step (after `--`)
    #[arg(last = true)]
    pub cmake_args: Vec<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Only list constants that could not be resolved
    #[arg(long)]
    pub unresolved: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
