//! Implementation of `ferry build`.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::builder::cmake::{is_cmake_project, CMakeBuilder, DEFAULT_JOBS};
use crate::core::Workspace;
use crate::ops::ferry_generate::{generate, GenerateResult};
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, CommandRunner};

/// Options for the build command.
///
/// The build profile is carried by the [`Workspace`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Number of parallel jobs for the build step
    pub jobs: usize,

    /// Log the CMake commands instead of running them
    pub dry_run: bool,

    /// Explicit cmake executable (otherwise searched on PATH)
    pub cmake: Option<PathBuf>,

    /// CMake generator passed with `-G`
    pub generator: Option<String>,

    /// Extra arguments for the configure step
    pub cmake_args: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            jobs: DEFAULT_JOBS,
            dry_run: false,
            cmake: None,
            generator: None,
            cmake_args: Vec::new(),
        }
    }
}

/// Result of a build.
#[derive(Debug)]
pub struct BuildResult {
    /// The constants module regenerated before the build
    pub generated: GenerateResult,

    /// Directory the CMake steps ran in
    pub build_dir: PathBuf,

    /// Where the host loader finds the compiled extension
    pub extension_dir: PathBuf,

    /// Command lines in execution order (or that would have run, on a dry run)
    pub commands: Vec<String>,

    pub dry_run: bool,
}

/// Regenerate the constants module, then configure and build the native
/// extension with CMake.
///
/// The constants module is written even when the CMake steps fail. A failed
/// configure step skips the build step.
pub fn build(
    ws: &Workspace,
    opts: &BuildOptions,
    runner: &mut dyn CommandRunner,
) -> Result<BuildResult> {
    let generated = generate(ws)?;

    let ext = ws.extension()?;
    let source_dir = ws.source_dir();
    if !is_cmake_project(&source_dir) {
        bail!(
            "no CMakeLists.txt in {}\n\
             hint: set `source-dir` in the [extension] section of {}",
            source_dir.display(),
            ws.manifest_path().display()
        );
    }

    let build_dir = ws.build_dir();
    let extension_dir = ws.extension_dir().unwrap_or_else(|| ws.lib_dir());
    ensure_dir(&build_dir)?;
    ensure_dir(&extension_dir)?;

    let program = match opts.cmake.clone().or_else(find_cmake) {
        Some(program) => program,
        None if opts.dry_run => PathBuf::from("cmake"),
        None => bail!(
            "CMake not found\n\
             \n\
             CMake is required to build the `{}` extension.\n\
             Install CMake and ensure it's in your PATH, or pass --cmake <path>.",
            ext.name
        ),
    };

    let cmake = CMakeBuilder::new(program, &source_dir, &build_dir, &extension_dir)
        .profile(ws.profile())
        .jobs(opts.jobs)
        .generator(opts.generator.clone())
        .args(opts.cmake_args.iter().cloned());

    let commands = vec![
        cmake.configure_command().display_command(),
        cmake.build_command().display_command(),
    ];

    if opts.dry_run {
        for cmd in &commands {
            tracing::info!("would run `{}` in {}", cmd, build_dir.display());
        }
    } else {
        cmake.configure(runner)?;
        cmake.compile(runner)?;
    }

    Ok(BuildResult {
        generated,
        build_dir,
        extension_dir,
        commands,
        dry_run: opts.dry_run,
    })
}
