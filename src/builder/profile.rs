//! Build profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Build profile for the native extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    /// Unoptimized build with debug info (default)
    #[default]
    Debug,
    /// Optimized build
    Release,
}

impl BuildProfile {
    /// Profile name used for directory layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildProfile::Debug => "debug",
            BuildProfile::Release => "release",
        }
    }

    /// Value for `CMAKE_BUILD_TYPE` and `--config`.
    pub fn cmake_build_type(&self) -> &'static str {
        match self {
            BuildProfile::Debug => "Debug",
            BuildProfile::Release => "Release",
        }
    }

    pub fn from_release_flag(release: bool) -> Self {
        if release {
            BuildProfile::Release
        } else {
            BuildProfile::Debug
        }
    }
}

impl fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "dev" => Ok(BuildProfile::Debug),
            "release" => Ok(BuildProfile::Release),
            _ => Err(format!(
                "invalid profile '{}'; expected 'debug' or 'release'",
                s
            )),
        }
    }
}
