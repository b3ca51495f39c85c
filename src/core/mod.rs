//! Core data structures for Ferry.
//!
//! - Manifest parsing and validation
//! - Workspace path resolution

pub mod manifest;
pub mod workspace;

pub use manifest::{ConstantsConfig, ExtensionConfig, Manifest, MANIFEST_NAME};
pub use workspace::{find_manifest, ManifestError, Workspace};
