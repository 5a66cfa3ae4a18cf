//! Build mode, target platform and per-user data directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::PathError;

/// Whether workers come from the source tree or from the installed bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Packaged,
}

impl BuildMode {
    /// Debug builds run from the source tree; release builds are packaged.
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Packaged
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "packaged" | "release" => Ok(Self::Packaged),
            other => Err(format!("expected development or packaged, got {other:?}")),
        }
    }
}

/// Target platform, as far as worker launching cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Environment variable the dynamic loader searches for shared
    /// libraries bundled next to the interpreter, if the platform has one
    /// that packaged workers need.
    pub const fn library_path_var(self) -> Option<&'static str> {
        match self {
            Self::MacOs => Some("DYLD_LIBRARY_PATH"),
            Self::Linux => Some("LD_LIBRARY_PATH"),
            Self::Windows | Self::Other => None,
        }
    }
}

/// Get the root directory for application data (logs).
///
/// Resolution order:
/// 1. `RAGPIQ_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/ragpiq-link`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = std::env::var("RAGPIQ_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    let root = data_dir.join("ragpiq-link");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}
