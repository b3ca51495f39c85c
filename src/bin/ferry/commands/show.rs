//! `ferry show` command
//!
//! Prints what `ferry generate` would write, without writing it.

use anyhow::{Context, Result};

use crate::cli::ShowArgs;
use crate::GlobalOptions;
use ferry::ops::extract;
use ferry::util::fs::relative_path;

pub fn execute(args: ShowArgs, global_opts: &GlobalOptions) -> Result<()> {
    let ws = super::load_workspace(global_opts)?;
    let table = extract(&ws)?;

    if args.json {
        let mut json = table.to_json();
        if args.unresolved {
            if let Some(constants) = json["constants"].as_object_mut() {
                constants.retain(|_, c| c["value"]["type"] == "unresolved");
            }
        }
        let out = serde_json::to_string_pretty(&json).context("failed to serialize constants")?;
        println!("{}", out);
        return Ok(());
    }

    for (name, constant) in table.iter() {
        if args.unresolved && !constant.value.is_unresolved() {
            continue;
        }
        println!(
            "{} = {}    [{}, {}]",
            name,
            constant.value,
            constant.kind.as_str(),
            relative_path(ws.root(), &constant.source).display()
        );
    }

    Ok(())
}
