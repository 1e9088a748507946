//! Rclone invocation: upload, listing and deletion of remote artifacts.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use vaultit_core::transport::{RemoteEntry, RemoteSpec, Transport};
use vaultit_core::{Error, Result};

/// Transport that shells out to the rclone binary.
pub struct RcloneTransport {
    /// Path to the rclone binary.
    rclone_bin: String,
    /// Extra flags appended to every invocation.
    extra_flags: Vec<String>,
}

impl Default for RcloneTransport {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RcloneTransport {
    pub fn new(extra_flags: Vec<String>) -> Self {
        let rclone_bin = std::env::var("RCLONE_BIN").unwrap_or_else(|_| "rclone".to_string());
        Self {
            rclone_bin,
            extra_flags,
        }
    }

    /// Run one rclone subcommand, returning captured stdout.
    async fn run(&self, args: &[String]) -> Result<String> {
        debug!(args = ?args, "Running rclone");

        let output = Command::new(&self.rclone_bin)
            .args(args)
            .args(&self.extra_flags)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::TransportFailed(format!(
                "rclone {} exited with {}: {}",
                args.first().map(String::as_str).unwrap_or(""),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// One entry of `rclone lsjson` output.
#[derive(Debug, Deserialize)]
struct LsJsonEntry {
    #[serde(rename = "Path")]
    path: String,
    #[serde(rename = "Size")]
    size: i64,
    #[serde(rename = "IsDir")]
    is_dir: bool,
}

fn parse_lsjson(output: &str) -> Result<Vec<RemoteEntry>> {
    let entries: Vec<LsJsonEntry> = serde_json::from_str(output)
        .map_err(|e| Error::TransportFailed(format!("failed to parse rclone listing: {}", e)))?;

    Ok(entries
        .into_iter()
        .filter(|e| !e.is_dir)
        .map(|e| RemoteEntry {
            path: e.path,
            // rclone reports -1 for unknown sizes
            size: e.size.max(0) as u64,
        })
        .collect())
}

#[async_trait]
impl Transport for RcloneTransport {
    async fn upload(&self, local: &Path, remote: &RemoteSpec) -> Result<()> {
        info!(file = %local.display(), remote = %remote, "Uploading archive");
        let args = vec![
            "copy".to_string(),
            local.display().to_string(),
            remote.to_string(),
        ];
        self.run(&args).await?;
        info!(remote = %remote, "Upload complete");
        Ok(())
    }

    async fn list(&self, remote: &RemoteSpec) -> Result<Vec<RemoteEntry>> {
        let args = vec![
            "lsjson".to_string(),
            "--recursive".to_string(),
            remote.to_string(),
        ];
        let output = self.run(&args).await?;
        let entries = parse_lsjson(&output)?;
        debug!(remote = %remote, count = entries.len(), "Listed remote artifacts");
        Ok(entries)
    }

    async fn delete(&self, remote: &RemoteSpec, path: &str) -> Result<()> {
        info!(remote = %remote, path = %path, "Deleting remote artifact");
        let args = vec!["deletefile".to_string(), format!("{}/{}", remote, path)];
        self.run(&args).await?;
        Ok(())
    }
}
