//! Native extension build.
//!
//! This module drives an out-of-tree CMake build of the extension.

pub mod cmake;
pub mod profile;

pub use cmake::{is_cmake_project, CMakeBuilder};
pub use profile::BuildProfile;
