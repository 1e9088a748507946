//! Zip archiver: shells out to the zip binary.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info};

use vaultit_core::archive::{ArchiveInfo, Archiver};
use vaultit_core::{Error, Result};

/// Archiver that invokes the external zip tool.
pub struct ZipArchiver {
    /// Path to the zip binary.
    zip_bin: String,
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipArchiver {
    pub fn new() -> Self {
        let zip_bin = std::env::var("ZIP_BIN").unwrap_or_else(|_| "zip".to_string());
        Self { zip_bin }
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    async fn create(&self, source: &Path, dest: &Path) -> Result<ArchiveInfo> {
        info!(source = %source.display(), dest = %dest.display(), "Creating archive");

        // zip resolves the destination relative to its working directory,
        // which is set to the source so archive members stay relative.
        let dest = if dest.is_absolute() {
            dest.to_path_buf()
        } else {
            std::env::current_dir()?.join(dest)
        };

        let output = Command::new(&self.zip_bin)
            .args(["-r", "-q"])
            .arg(&dest)
            .arg(".")
            .current_dir(source)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(output = %stderr, "zip failed");
            return Err(Error::ArchiveFailed(format!(
                "zip exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let metadata = tokio::fs::metadata(&dest).await?;
        let info = ArchiveInfo {
            path: dest,
            size_bytes: metadata.len(),
        };
        info!(file = %info.path.display(), size = info.size_bytes, "Archive created");
        Ok(info)
    }
}
