//! Ferry - constant extraction and native-extension builds for Python bindings
//!
//! This crate provides the core library functionality for Ferry: scanning C
//! headers for prefixed constants, writing them out as a Python module, and
//! driving the CMake build of the native extension.

pub mod builder;
pub mod constants;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Ferry unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use constants::{ConstantTable, ConstantValue, PatternExtractor};
pub use core::{Manifest, Workspace};
