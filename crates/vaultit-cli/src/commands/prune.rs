//! Retention-only commands: prune and list.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use vaultit_config::BackupConfig;
use vaultit_core::retention::{bucket_for, classify};
use vaultit_runner::{catalog, rotation};
use vaultit_transport::RcloneTransport;

/// Apply the retention policy to existing artifacts without creating a
/// new backup.
pub async fn prune(config: BackupConfig, dry_run: bool) -> Result<()> {
    let transport = Arc::new(RcloneTransport::new(config.remote.flags.clone()));
    let now = Utc::now();

    let mut artifacts = catalog::list_local(&config.backup_dir).await?;
    artifacts.extend(catalog::list_remote(transport.as_ref(), &config.remote.spec).await?);

    let decision = classify(&artifacts, now, &config.retention);
    println!(
        "{} artifacts: keep {}, delete {}, unmanaged {}",
        artifacts.len(),
        decision.keep.len(),
        decision.delete.len(),
        decision.unmanaged.len()
    );

    if dry_run {
        for artifact in &decision.delete {
            println!("  would delete {} ({})", artifact.name, artifact.location);
        }
        return Ok(());
    }

    let result = rotation::apply(&decision, transport.as_ref(), &config.remote.spec).await;
    println!(
        "Deleted {} local, {} remote",
        result.deleted_local, result.deleted_remote
    );
    for error in &result.errors {
        println!("  ! {}", error);
    }
    Ok(())
}

/// List artifacts with the retention bucket each falls into.
pub async fn list(config: BackupConfig) -> Result<()> {
    let transport = Arc::new(RcloneTransport::new(config.remote.flags.clone()));
    let now = Utc::now();

    let mut artifacts = catalog::list_local(&config.backup_dir).await?;
    artifacts.extend(catalog::list_remote(transport.as_ref(), &config.remote.spec).await?);

    for artifact in &artifacts {
        let bucket = bucket_for(artifact, now, &config.retention);
        let size = artifact
            .size_bytes
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<10} {:<7} {:>12}  {}",
            bucket.to_string(),
            artifact.location.to_string(),
            size,
            artifact.name
        );
    }
    println!("{} artifacts", artifacts.len());
    Ok(())
}
