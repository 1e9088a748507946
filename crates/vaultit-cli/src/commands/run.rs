//! Full backup run command.

use std::sync::Arc;

use anyhow::Result;
use vaultit_config::BackupConfig;
use vaultit_runner::archive::ZipArchiver;
use vaultit_runner::webhook::WebhookNotifier;
use vaultit_runner::{BackupOrchestrator, StageState};
use vaultit_transport::RcloneTransport;

/// Run the full backup pipeline from a loaded configuration.
pub async fn run(config: BackupConfig) -> Result<()> {
    println!("Backing up: {}", config.source.display());

    let transport = Arc::new(RcloneTransport::new(config.remote.flags.clone()));
    let archiver = Arc::new(ZipArchiver::new());

    let mut orchestrator = BackupOrchestrator::new(config.clone(), archiver, transport);
    if let Some(notify) = &config.notify {
        if notify.enabled {
            let notifier = WebhookNotifier::new(notify.url.clone())?;
            orchestrator = orchestrator.with_notifier(Arc::new(notifier));
        }
    }

    let report = orchestrator.run().await?;

    println!("\n--- Backup Summary ---");
    println!(
        "  archive  - {} ({} bytes)",
        report.archive,
        report.size_bytes.unwrap_or(0)
    );
    print_stage("upload", &report.upload);
    print_stage("rotation", &report.rotation);
    if let Some(result) = &report.rotation_result {
        println!(
            "  deleted  - {} local, {} remote",
            result.deleted_local, result.deleted_remote
        );
        for error in &result.errors {
            println!("  ! {}", error);
        }
    }

    if report.is_success() {
        println!("\n✓ Backup succeeded");
    } else {
        println!("\n✗ Backup failed");
    }
    Ok(())
}

fn print_stage(name: &str, state: &StageState) {
    let status = match state {
        StageState::Succeeded => "✓ succeeded".to_string(),
        StageState::Failed { message } => format!("✗ failed: {}", message),
        StageState::Skipped { reason } => format!("⊘ skipped: {}", reason),
    };
    println!("  {} - {}", name, status);
}
