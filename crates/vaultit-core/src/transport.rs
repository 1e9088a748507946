//! Transport trait: the boundary to the external remote-copy tool.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A remote destination, e.g. the rclone remote `gdrive` with folder
/// `backups/myproject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSpec {
    pub remote: String,
    pub folder: String,
}

impl RemoteSpec {
    pub fn new(remote: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            folder: folder.into(),
        }
    }
}

impl std::fmt::Display for RemoteSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.remote, self.folder)
    }
}

/// One object in a remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Path relative to the listed folder.
    pub path: String,
    pub size: u64,
}

/// Upload, list and delete operations against a remote store.
///
/// Implementations shell out to an external tool; a non-zero exit
/// status surfaces as [`crate::Error::TransportFailed`] carrying the
/// captured diagnostics.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Upload a local file into the remote folder.
    async fn upload(&self, local: &Path, remote: &RemoteSpec) -> Result<()>;

    /// List objects under the remote folder, recursively.
    async fn list(&self, remote: &RemoteSpec) -> Result<Vec<RemoteEntry>>;

    /// Delete a single object, addressed relative to the remote folder.
    async fn delete(&self, remote: &RemoteSpec, path: &str) -> Result<()>;
}
