//! Workspace - central configuration hub.
//!
//! A Workspace wraps the loaded manifest and resolves every path it names
//! against the manifest's directory, independent of the process's current
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use thiserror::Error;

use crate::builder::profile::BuildProfile;
use crate::core::manifest::{ExtensionConfig, Manifest, MANIFEST_NAME};
use crate::util::fs::{absolutize, normalize_path};

/// Errors locating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `{}` in `{}` or any parent directory", MANIFEST_NAME, .dir.display())]
    NotFound { dir: PathBuf },
}

/// Find `Ferry.toml` in `start` or the nearest parent directory.
pub fn find_manifest(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ManifestError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}

/// A loaded project.
#[derive(Debug)]
pub struct Workspace {
    manifest: Manifest,
    manifest_path: PathBuf,

    /// Absolute project root (the manifest's directory)
    root: PathBuf,

    /// Target directory for build outputs
    target_dir: PathBuf,

    profile: BuildProfile,
}

impl Workspace {
    /// Create a new workspace from a manifest path.
    pub fn new(manifest_path: &Path) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        Ok(Self::from_manifest(manifest, manifest_path))
    }

    /// Create a workspace from an already-parsed manifest.
    pub fn from_manifest(manifest: Manifest, manifest_path: &Path) -> Self {
        let dir = manifest.manifest_dir();
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let root = normalize_path(dir);

        // Default target directory is .ferry/target in the workspace root
        let target_dir = root.join(".ferry").join("target");

        Workspace {
            manifest,
            manifest_path: manifest_path.to_path_buf(),
            root,
            target_dir,
            profile: BuildProfile::default(),
        }
    }

    /// Set the build profile.
    pub fn with_profile(mut self, profile: BuildProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile(&self) -> BuildProfile {
        self.profile
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Get the profile-specific output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.target_dir.join(self.profile.as_str())
    }

    /// The constant prefix.
    pub fn prefix(&self) -> &str {
        &self.manifest.constants().prefix
    }

    /// Headers to scan, in manifest order.
    pub fn header_paths(&self) -> Vec<PathBuf> {
        self.manifest
            .constants()
            .headers
            .iter()
            .map(|h| absolutize(&self.root, h))
            .collect()
    }

    /// Where the generated module is written.
    pub fn output_path(&self) -> PathBuf {
        absolutize(&self.root, &self.manifest.constants().output)
    }

    /// The `[extension]` section, or an error explaining how to add one.
    pub fn extension(&self) -> Result<&ExtensionConfig> {
        match self.manifest.extension() {
            Some(ext) => Ok(ext),
            None => bail!(
                "no [extension] section in {}\n\
                 \n\
                 Add one to build the native module, e.g.\n\
                 \n\
                 [extension]\n\
                 name = \"{}\"",
                self.manifest_path.display(),
                self.manifest.name()
            ),
        }
    }

    /// Directory handed to the configure step.
    pub fn source_dir(&self) -> PathBuf {
        match self.manifest.extension() {
            Some(ext) => absolutize(&self.root, &ext.source_dir),
            None => self.root.clone(),
        }
    }

    /// Scratch directory the CMake steps run in.
    pub fn build_dir(&self) -> PathBuf {
        match self.manifest.extension().and_then(|e| e.build_dir.as_ref()) {
            Some(dir) => absolutize(&self.root, dir),
            None => self.output_dir().join("cmake-build"),
        }
    }

    /// Destination directory for the built library.
    pub fn lib_dir(&self) -> PathBuf {
        match self.manifest.extension().and_then(|e| e.lib_dir.as_ref()) {
            Some(dir) => absolutize(&self.root, dir),
            None => self.output_dir().join("lib"),
        }
    }

    /// Location the host loader imports the compiled module from: the lib
    /// dir plus the parent packages of a dotted extension name.
    pub fn extension_dir(&self) -> Option<PathBuf> {
        let ext = self.manifest.extension()?;
        let mut dir = self.lib_dir();
        let mut parts: Vec<&str> = ext.name.split('.').collect();
        parts.pop();
        for part in parts {
            dir.push(part);
        }
        Some(dir)
    }
}
