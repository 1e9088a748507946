//! Artifact catalog: local and remote listings.

use std::path::Path;

use async_recursion::async_recursion;
use tracing::debug;

use vaultit_core::Result;
use vaultit_core::artifact::Artifact;
use vaultit_core::transport::{RemoteSpec, Transport};

/// List backup artifacts under `backup_dir`, recursively.
///
/// Only `.zip` files are considered; anything else is left alone and
/// unreported. Zip files whose name does not carry a timestamp come
/// back as unmanaged artifacts.
pub async fn list_local(backup_dir: &Path) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    scan_directory(backup_dir, &mut artifacts).await?;
    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(dir = %backup_dir.display(), count = artifacts.len(), "Listed local artifacts");
    Ok(artifacts)
}

#[async_recursion]
async fn scan_directory(dir: &Path, artifacts: &mut Vec<Artifact>) -> Result<()> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            scan_directory(&path, artifacts).await?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("zip") {
            let size = entry.metadata().await.ok().map(|m| m.len());
            artifacts.push(Artifact::local(&path, size));
        }
    }
    Ok(())
}

/// List backup artifacts in the remote folder via the transport.
///
/// This call is the sole boundary to the external listing tool.
pub async fn list_remote(transport: &dyn Transport, remote: &RemoteSpec) -> Result<Vec<Artifact>> {
    let entries = transport.list(remote).await?;
    let mut artifacts: Vec<Artifact> = entries
        .into_iter()
        .filter(|e| e.path.ends_with(".zip"))
        .map(|e| Artifact::remote(&e.path, Some(e.size)))
        .collect();
    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(artifacts)
}
