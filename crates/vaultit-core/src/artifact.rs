//! Backup artifact model and filename timestamp parsing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Where an artifact lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Local,
    Remote,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Local => write!(f, "local"),
            Location::Remote => write!(f, "remote"),
        }
    }
}

/// A single backup artifact, local or remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// File name, e.g. `myproject_20260807_031500.zip`.
    pub name: String,
    /// Timestamp embedded in the name. `None` means the name does not
    /// follow the backup naming scheme; such artifacts are unmanaged
    /// and never deleted automatically.
    pub timestamp: Option<DateTime<Utc>>,
    pub location: Location,
    /// Size in bytes, when the listing reported one.
    pub size_bytes: Option<u64>,
    /// Absolute path for local artifacts; path relative to the remote
    /// folder for remote ones. Used for deletion.
    pub path: PathBuf,
}

impl Artifact {
    /// Build a local artifact from its filesystem path.
    pub fn local(path: &Path, size_bytes: Option<u64>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            timestamp: parse_timestamp(&name),
            name,
            location: Location::Local,
            size_bytes,
            path: path.to_path_buf(),
        }
    }

    /// Build a remote artifact from its path relative to the remote folder.
    pub fn remote(path: &str, size_bytes: Option<u64>) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            timestamp: parse_timestamp(&name),
            name,
            location: Location::Remote,
            size_bytes,
            path: PathBuf::from(path),
        }
    }

    /// Whether this artifact participates in retention decisions.
    pub fn is_managed(&self) -> bool {
        self.timestamp.is_some()
    }
}

// Names must end in _YYYYMMDD_HHMMSS.zip; anything else is unmanaged.
static TIMESTAMP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d{8}_\d{6})\.zip$").unwrap());

/// Extract the UTC timestamp embedded in a backup file name.
///
/// Returns `None` for names that do not follow the naming scheme or
/// that encode an invalid calendar date or time. There is no fallback
/// to file mtime: the name is the source of truth.
pub fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let captures = TIMESTAMP_REGEX.captures(name)?;
    let raw = captures.get(1)?.as_str();
    NaiveDateTime::parse_from_str(raw, "%Y%m%d_%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}
