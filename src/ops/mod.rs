//! High-level operations.
//!
//! This module contains the implementation of Ferry commands.

pub mod ferry_build;
pub mod ferry_generate;

pub use ferry_build::{build, BuildOptions, BuildResult};
pub use ferry_generate::{extract, generate, GenerateResult};
