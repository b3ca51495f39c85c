//! `ferry generate` command

use anyhow::Result;

use crate::GlobalOptions;
use ferry::ops::{generate, GenerateResult};
use ferry::util::fs::relative_path;
use ferry::util::shell::{Shell, Status};
use ferry::Workspace;

pub fn execute(global_opts: &GlobalOptions) -> Result<()> {
    let ws = super::load_workspace(global_opts)?;
    let result = generate(&ws)?;
    report(&global_opts.shell, &ws, &result);
    Ok(())
}

/// Print the generated module path and any unresolved constants.
pub fn report(shell: &Shell, ws: &Workspace, result: &GenerateResult) {
    for name in result.unresolved() {
        shell.warn(format!("`{}` was written as a string, fix it by hand", name));
    }

    shell.status(
        Status::Generated,
        format!(
            "{} ({} constants)",
            relative_path(ws.root(), &result.output).display(),
            result.table.len()
        ),
    );
}
