//! Ferry.toml manifest parsing and schema.
//!
//! The manifest names the headers to scan, where the generated constants
//! module goes, and which native extension the CMake project produces.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Ferry.toml";

/// A parsed and validated manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    package: PackageMetadata,
    constants: ConstantsConfig,
    extension: Option<ExtensionConfig>,
    manifest_dir: PathBuf,
}

/// `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
}

/// `[constants]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantsConfig {
    /// Required name prefix, e.g. `VKY_`
    pub prefix: String,

    /// Headers to scan, in order. Later headers override earlier ones.
    pub headers: Vec<PathBuf>,

    /// Path of the generated module
    pub output: PathBuf,
}

/// `[extension]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionConfig {
    /// Importable name of the native module, dotted for a sub-package
    pub name: String,

    /// Directory holding the top-level CMakeLists.txt
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Scratch directory for the configure and build steps
    pub build_dir: Option<PathBuf>,

    /// Destination of the built library
    pub lib_dir: Option<PathBuf>,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    package: PackageMetadata,
    constants: ConstantsConfig,
    #[serde(default)]
    extension: Option<ExtensionConfig>,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let manifest = Manifest {
            package: raw.package,
            constants: raw.constants,
            extension: raw.extension,
            manifest_dir,
        };
        manifest
            .validate()
            .with_context(|| format!("invalid manifest at {}", path.display()))?;

        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.package.name.trim().is_empty() {
            bail!("package name cannot be empty");
        }

        if !is_identifier(&self.constants.prefix) {
            bail!(
                "constants.prefix `{}` must be a non-empty C identifier (e.g. `VKY_`)",
                self.constants.prefix
            );
        }

        if self.constants.headers.is_empty() {
            bail!("constants.headers must list at least one header");
        }

        if self.constants.output.as_os_str().is_empty() {
            bail!("constants.output cannot be empty");
        }

        if let Some(ref ext) = self.extension {
            if !ext.name.split('.').all(is_identifier) {
                bail!(
                    "extension.name `{}` must be a dotted module path (e.g. `visky` or `visky.ext`)",
                    ext.name
                );
            }
        }

        Ok(())
    }

    pub fn package(&self) -> &PackageMetadata {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.package.name
    }

    pub fn constants(&self) -> &ConstantsConfig {
        &self.constants
    }

    pub fn extension(&self) -> Option<&ExtensionConfig> {
        self.extension.as_ref()
    }

    /// Directory containing the manifest; relative paths resolve against it.
    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
