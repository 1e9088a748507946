//! Archiver trait: produces the compressed backup artifact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::Result;

/// Result of a successful archive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Compresses a source directory into a single archive file.
///
/// The core only consumes the resulting path and size; how the archive
/// is produced is up to the implementation.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Compress `source` into the archive file at `dest`.
    async fn create(&self, source: &Path, dest: &Path) -> Result<ArchiveInfo>;
}
