//! Test fixtures: sample headers and a complete project on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A constants header in the style of a scientific visualization library.
pub const CONSTANTS_HEADER: &str = r#"#ifndef VKY_CONSTANTS_HEADER
#define VKY_CONSTANTS_HEADER

#include <stdint.h>

/*************************************************************************************************/
/*  Window                                                                                       */
/*************************************************************************************************/

#define VKY_DEFAULT_WIDTH 800
#define VKY_DEFAULT_HEIGHT 600 // pixels
#define VKY_AXES_MARGIN 0.1
#define VKY_TICK_LENGTH 8.5f
#define VKY_CLEAR_COLOR 0.2, 0.3, 0.4
#define VKY_MAX_VERTEX_COUNT 16 * 1024 * 1024

#endif
"#;

/// A scene header with enumerators and wrapped constants.
pub const SCENE_HEADER: &str = r#"#ifndef VKY_SCENE_HEADER
#define VKY_SCENE_HEADER

#include "constants.h"

#define VKY_CONST(type, x) (x)
#define VKY_CONST_INT(type, x) ((int)(x))

#define VKY_MAX_OBJECTS VKY_CONST_INT(uint32_t, 256)
#define VKY_GRID_SPACING VKY_CONST(float, 0.25)

typedef enum
{
    VKY_PANEL_STATUS_NONE = 0,
    VKY_PANEL_STATUS_ACTIVE = 1,
    VKY_PANEL_STATUS_LINKED = 2,
} VkyPanelStatus;

#endif
"#;

/// An app header that overrides one earlier constant.
pub const APP_HEADER: &str = r#"#ifndef VKY_APP_HEADER
#define VKY_APP_HEADER

#define VKY_DEFAULT_WIDTH 1024
#define VKY_DEFAULT_BACKEND VKY_BACKEND_GLFW

typedef enum
{
    VKY_BACKEND_NONE,
    VKY_BACKEND_GLFW,
    VKY_BACKEND_OFFSCREEN,
} VkyBackendType;

#endif
"#;

const MANIFEST_HEAD: &str = r#"[package]
name = "visky"

[constants]
prefix = "VKY_"
headers = [
    "include/visky/constants.h",
    "include/visky/scene.h",
    "include/visky/app.h",
]
output = "bindings/python/visky/_constants.py"
"#;

const DEFAULT_EXTENSION: &str = r#"
[extension]
name = "visky"
build-dir = "build/temp"
lib-dir = "build/lib"
"#;

const CMAKE_LISTS: &str = r#"cmake_minimum_required(VERSION 3.10)
project(visky C)
add_library(visky SHARED src/visky.c)
"#;

/// Fixture for a complete project structure.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Project directory name.
    pub name: String,
    /// `[extension]` section appended to the manifest.
    pub extension: String,
    /// Files (path relative to project root -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// The three-header project with a CMake build.
    pub fn visky() -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            PathBuf::from("include/visky/constants.h"),
            CONSTANTS_HEADER.to_string(),
        );
        files.insert(
            PathBuf::from("include/visky/scene.h"),
            SCENE_HEADER.to_string(),
        );
        files.insert(PathBuf::from("include/visky/app.h"), APP_HEADER.to_string());
        files.insert(PathBuf::from("CMakeLists.txt"), CMAKE_LISTS.to_string());

        ProjectFixture {
            name: "visky".to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            files,
        }
    }

    /// Replace the `[extension]` section (empty to drop it).
    pub fn with_extension(mut self, section: impl Into<String>) -> Self {
        self.extension = section.into();
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn without_header(mut self, path: impl AsRef<Path>) -> Self {
        self.files.remove(path.as_ref());
        self
    }

    pub fn without_cmakelists(self) -> Self {
        self.without_header("CMakeLists.txt")
    }

    /// Full manifest text.
    pub fn manifest(&self) -> String {
        format!("{}{}", MANIFEST_HEAD, self.extension)
    }

    /// Write the project under `base_path`, returning its root.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let project_path = base_path.join(&self.name);
        std::fs::create_dir_all(&project_path)?;

        std::fs::write(project_path.join("Ferry.toml"), self.manifest())?;

        for (rel_path, content) in &self.files {
            let full_path = project_path.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        Ok(project_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_to() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = ProjectFixture::visky().write_to(tmp.path()).unwrap();

        assert!(root.join("Ferry.toml").is_file());
        assert!(root.join("include/visky/scene.h").is_file());
        assert!(root.join("CMakeLists.txt").is_file());
    }

    #[test]
    fn test_without_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = ProjectFixture::visky()
            .without_header("include/visky/app.h")
            .write_to(tmp.path())
            .unwrap();

        assert!(!root.join("include/visky/app.h").exists());
        assert!(root.join("include/visky/constants.h").exists());
    }
}
