//! Test utilities and mocks for Ferry unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use ferry::test_support::{fixtures::ProjectFixture, MockRunner};
//!
//! #[test]
//! fn test_example() {
//!     let mut runner = MockRunner::new().succeed().fail_with(2, "link error");
//!     // Use the runner where a CommandRunner is expected...
//! }
//! ```

pub mod fixtures;

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::Result;

use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

/// A command seen by [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Full command line as displayed to the user
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Mock command runner.
///
/// Records every command and answers with scripted outputs in order. Once
/// the script runs out, every command succeeds.
#[derive(Debug, Default)]
pub struct MockRunner {
    script: VecDeque<ProcessOutput>,
    calls: Vec<RecordedCall>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Queue a successful, silent result.
    pub fn succeed(self) -> Self {
        self.respond(ProcessOutput {
            code: Some(0),
            ..ProcessOutput::default()
        })
    }

    /// Queue a failure with the given exit code and stderr.
    pub fn fail_with(self, code: i32, stderr: &str) -> Self {
        self.respond(ProcessOutput {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        })
    }

    /// Queue an arbitrary result.
    pub fn respond(mut self, output: ProcessOutput) -> Self {
        self.script.push_back(output);
        self
    }

    /// Get all commands that were run.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        self.calls.push(RecordedCall {
            command: cmd.display_command(),
            args: cmd.get_args().to_vec(),
            cwd: cmd.get_cwd().map(|p| p.to_path_buf()),
        });

        Ok(self.script.pop_front().unwrap_or(ProcessOutput {
            code: Some(0),
            ..ProcessOutput::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_script_then_default() {
        let mut runner = MockRunner::new().fail_with(3, "boom");
        let cmd = ProcessBuilder::new("cmake").arg("--version").cwd("/tmp");

        let first = runner.run(&cmd).unwrap();
        assert_eq!(first.code, Some(3));
        assert_eq!(first.stderr, b"boom");

        assert!(runner.run(&cmd).unwrap().success());

        assert_eq!(runner.calls().len(), 2);
        assert_eq!(runner.calls()[0].command, "cmake --version");
        assert_eq!(runner.calls()[0].cwd, Some(PathBuf::from("/tmp")));
    }
}
