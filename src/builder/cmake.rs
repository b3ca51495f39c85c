//! CMake adapter for the native extension build.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::profile::BuildProfile;
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Default number of parallel build jobs.
pub const DEFAULT_JOBS: usize = 4;

/// CMake build adapter.
///
/// Both steps run with the build directory as their working directory.
#[derive(Debug, Clone)]
pub struct CMakeBuilder {
    program: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    library_output_dir: PathBuf,
    profile: BuildProfile,
    jobs: usize,
    generator: Option<String>,
    cmake_args: Vec<String>,
}

impl CMakeBuilder {
    /// Create a new CMake builder.
    ///
    /// `library_output_dir` should be absolute; CMake resolves a relative one
    /// against the build directory.
    pub fn new(
        program: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
        library_output_dir: impl Into<PathBuf>,
    ) -> Self {
        CMakeBuilder {
            program: program.into(),
            source_dir: source_dir.into(),
            build_dir: build_dir.into(),
            library_output_dir: library_output_dir.into(),
            profile: BuildProfile::Debug,
            jobs: DEFAULT_JOBS,
            generator: None,
            cmake_args: Vec::new(),
        }
    }

    pub fn profile(mut self, profile: BuildProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the parallelism of the build step. Zero is treated as one.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Add CMake arguments to the configure step.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.cmake_args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// The configure command.
    pub fn configure_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .arg(&self.source_dir)
            .arg(format!(
                "-DCMAKE_LIBRARY_OUTPUT_DIRECTORY={}",
                self.library_output_dir.display()
            ))
            .arg(format!(
                "-DCMAKE_BUILD_TYPE={}",
                self.profile.cmake_build_type()
            ));

        if let Some(ref generator) = self.generator {
            cmd = cmd.arg("-G").arg(generator);
        }

        cmd.args(&self.cmake_args).cwd(&self.build_dir)
    }

    /// The build command.
    pub fn build_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .args(["--build", "."])
            // Configuration for multi-config generators like Visual Studio
            .arg("--config")
            .arg(self.profile.cmake_build_type())
            .arg("--parallel")
            .arg(self.jobs.to_string())
            .cwd(&self.build_dir)
    }

    /// Run CMake configuration.
    pub fn configure(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        tracing::info!("Configuring CMake project in {}", self.build_dir.display());
        run_step("configuration", &self.configure_command(), runner)
    }

    /// Run CMake build.
    pub fn compile(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        tracing::info!("Building CMake project with {} job(s)", self.jobs);
        run_step("build", &self.build_command(), runner)
    }
}

fn run_step(step: &str, cmd: &ProcessBuilder, runner: &mut dyn CommandRunner) -> Result<()> {
    let output = runner.run(cmd)?;

    if !output.success() {
        let status = match output.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "CMake {} failed ({})\n  command: {}\n{}",
            step,
            status,
            cmd.display_command(),
            stderr.trim_end()
        );
    }

    Ok(())
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRunner;

    fn builder() -> CMakeBuilder {
        CMakeBuilder::new("cmake", "/proj", "/proj/build/temp", "/proj/build/lib")
    }

    #[test]
    fn test_is_cmake_project() {
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();

        // Not a CMake project initially
        assert!(!is_cmake_project(tmp.path()));

        std::fs::write(
            tmp.path().join("CMakeLists.txt"),
            "cmake_minimum_required(VERSION 3.10)",
        )
        .unwrap();

        assert!(is_cmake_project(tmp.path()));
    }

    #[test]
    fn test_configure_command() {
        let cmd = builder().configure_command();

        assert_eq!(
            cmd.display_command(),
            "cmake /proj -DCMAKE_LIBRARY_OUTPUT_DIRECTORY=/proj/build/lib -DCMAKE_BUILD_TYPE=Debug"
        );
        assert_eq!(cmd.get_cwd(), Some(Path::new("/proj/build/temp")));
    }

    #[test]
    fn test_configure_command_with_generator_and_args() {
        let cmd = builder()
            .profile(BuildProfile::Release)
            .generator(Some("Ninja".to_string()))
            .args(["-DVKY_TESTS=OFF"])
            .configure_command();

        assert_eq!(
            cmd.get_args()[2..],
            [
                "-DCMAKE_BUILD_TYPE=Release",
                "-G",
                "Ninja",
                "-DVKY_TESTS=OFF"
            ]
        );
    }

    #[test]
    fn test_build_command() {
        let cmd = builder().build_command();
        assert_eq!(
            cmd.display_command(),
            "cmake --build . --config Debug --parallel 4"
        );
        assert_eq!(cmd.get_cwd(), Some(Path::new("/proj/build/temp")));

        let cmd = builder().jobs(0).build_command();
        assert!(cmd.display_command().ends_with("--parallel 1"));
    }

    #[test]
    fn test_failed_step_reports_command_and_stderr() {
        let mut runner = MockRunner::new().fail_with(1, "CMake Error: no CMAKE_CXX_COMPILER");

        let err = builder().configure(&mut runner).unwrap_err();
        let msg = format!("{:#}", err);

        assert!(msg.contains("CMake configuration failed (exit code 1)"));
        assert!(msg.contains("-DCMAKE_BUILD_TYPE=Debug"));
        assert!(msg.contains("no CMAKE_CXX_COMPILER"));
    }

    #[test]
    fn test_successful_steps_use_the_runner() {
        let mut runner = MockRunner::new();
        let cmake = builder();

        cmake.configure(&mut runner).unwrap();
        cmake.compile(&mut runner).unwrap();

        assert_eq!(runner.calls().len(), 2);
        assert!(runner.calls()[1].command.contains("--build ."));
    }
}
