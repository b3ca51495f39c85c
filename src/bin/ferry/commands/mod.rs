//! Command implementations

pub mod build;
pub mod completions;
pub mod generate;
pub mod show;

use anyhow::{Context, Result};

use crate::GlobalOptions;
use ferry::core::{find_manifest, Workspace};

/// Load the workspace from `--manifest-path`, or the nearest `Ferry.toml`
/// above the current directory.
pub fn load_workspace(global_opts: &GlobalOptions) -> Result<Workspace> {
    let manifest_path = match global_opts.manifest_path {
        Some(ref path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            find_manifest(&cwd)?
        }
    };

    Workspace::new(&manifest_path)
}
