//! `ferry build` command

use std::time::Instant;

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::GlobalOptions;
use ferry::builder::BuildProfile;
use ferry::ops::{build, BuildOptions};
use ferry::util::config::{global_config_path, load_config, project_config_path};
use ferry::util::fs::relative_path;
use ferry::util::shell::{format_duration, Status};
use ferry::util::SystemRunner;

pub fn execute(args: BuildArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let start = Instant::now();

    let profile = BuildProfile::from_release_flag(args.release);
    let ws = super::load_workspace(global_opts)?.with_profile(profile);

    // Load configuration (global + project)
    let global_path = global_config_path();
    let config = load_config(global_path.as_deref(), &project_config_path(ws.root()));

    // CLI > config > default
    let defaults = BuildOptions::default();
    let cmake_args = if args.cmake_args.is_empty() {
        config.build.cmake_args
    } else {
        args.cmake_args
    };
    let opts = BuildOptions {
        jobs: args.jobs.or(config.build.jobs).unwrap_or(defaults.jobs),
        dry_run: args.dry_run,
        cmake: args.cmake.or(config.build.cmake),
        generator: args.generator.or(config.build.generator),
        cmake_args,
    };

    shell.status(
        Status::Building,
        format!("`{}` ({})", ws.manifest().name(), profile),
    );
    let mut runner = SystemRunner::new(shell.clone());
    let result = build(&ws, &opts, &mut runner)?;

    super::generate::report(shell, &ws, &result.generated);

    if result.dry_run {
        for cmd in &result.commands {
            shell.status(Status::Skipped, cmd);
        }
        shell.note(format!(
            "dry run, would build in {}",
            relative_path(ws.root(), &result.build_dir).display()
        ));
        return Ok(());
    }

    shell.status(
        Status::Finished,
        format!(
            "`{}` ({}) in {}",
            ws.manifest().name(),
            profile,
            format_duration(start.elapsed())
        ),
    );
    shell.note(format!(
        "extension module in {}",
        result.extension_dir.display()
    ));

    Ok(())
}
