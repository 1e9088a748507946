//! Backup orchestrator: archive, upload, rotate, notify.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use vaultit_config::BackupConfig;
use vaultit_core::Result;
use vaultit_core::archive::{ArchiveInfo, Archiver};
use vaultit_core::notify::{Notifier, NotifyPayload};
use vaultit_core::retention::classify;
use vaultit_core::rotation::RotationResult;
use vaultit_core::transport::Transport;

use crate::{catalog, rotation};

/// State of one pipeline stage after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageState {
    Succeeded,
    Failed { message: String },
    Skipped { reason: String },
}

impl StageState {
    pub fn is_success(&self) -> bool {
        matches!(self, StageState::Succeeded)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// Name of the archive this run produced.
    pub archive: String,
    pub size_bytes: Option<u64>,
    pub upload: StageState,
    pub rotation: StageState,
    pub rotation_result: Option<RotationResult>,
}

impl BackupReport {
    /// A run succeeds when the archive was uploaded; per-artifact
    /// rotation errors do not fail it.
    pub fn is_success(&self) -> bool {
        self.upload.is_success()
    }
}

/// Runs the sequential backup pipeline for one configured job.
pub struct BackupOrchestrator {
    config: BackupConfig,
    archiver: Arc<dyn Archiver>,
    transport: Arc<dyn Transport>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl BackupOrchestrator {
    pub fn new(
        config: BackupConfig,
        archiver: Arc<dyn Archiver>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            archiver,
            transport,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run the full pipeline: archive, upload, rotate, notify.
    ///
    /// Archive failure is fatal. Upload failure skips rotation (the
    /// existing artifacts are left untouched) and is reported via the
    /// failure notification. Rotation errors are collected into the
    /// report and never fail the run.
    pub async fn run(&self) -> Result<BackupReport> {
        self.run_at(Utc::now()).await
    }

    async fn run_at(&self, now: DateTime<Utc>) -> Result<BackupReport> {
        let archive_name = format!(
            "{}_{}.zip",
            self.config.project,
            now.format("%Y%m%d_%H%M%S")
        );
        let archive_path = self.archive_path(now, &archive_name);

        let info = match self.create_archive(&archive_path).await {
            Ok(info) => info,
            Err(e) => {
                error!(file = %archive_path.display(), error = %e, "Archive creation failed");
                self.notify(NotifyPayload::failed(&archive_name, &e.to_string()))
                    .await;
                return Err(e);
            }
        };

        let remote = &self.config.remote.spec;
        if let Err(e) = self.transport.upload(&info.path, remote).await {
            error!(remote = %remote, error = %e, "Upload failed");
            self.notify(NotifyPayload::failed(&archive_name, &e.to_string()))
                .await;
            return Ok(BackupReport {
                archive: archive_name,
                size_bytes: Some(info.size_bytes),
                upload: StageState::Failed {
                    message: e.to_string(),
                },
                rotation: StageState::Skipped {
                    reason: "upload failed".to_string(),
                },
                rotation_result: None,
            });
        }

        let (rotation, rotation_result) = match self.rotate(now).await {
            Ok(result) => {
                info!(
                    deleted_local = result.deleted_local,
                    deleted_remote = result.deleted_remote,
                    errors = result.errors.len(),
                    "Rotation complete"
                );
                (StageState::Succeeded, Some(result))
            }
            Err(e) => {
                warn!(error = %e, "Rotation skipped: listing failed");
                (
                    StageState::Failed {
                        message: e.to_string(),
                    },
                    None,
                )
            }
        };

        let mut payload = NotifyPayload::success(&archive_name, info.size_bytes, &remote.to_string());
        payload.rotation_errors = match (&rotation, &rotation_result) {
            (_, Some(result)) => result.errors.iter().map(|e| e.to_string()).collect(),
            (StageState::Failed { message }, None) => vec![message.clone()],
            _ => Vec::new(),
        };
        self.notify(payload).await;

        Ok(BackupReport {
            archive: archive_name,
            size_bytes: Some(info.size_bytes),
            upload: StageState::Succeeded,
            rotation,
            rotation_result,
        })
    }

    async fn create_archive(&self, archive_path: &Path) -> Result<ArchiveInfo> {
        if let Some(parent) = archive_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.archiver
            .create(&self.config.source, archive_path)
            .await
    }

    async fn rotate(&self, now: DateTime<Utc>) -> Result<RotationResult> {
        let remote = &self.config.remote.spec;
        let mut artifacts = catalog::list_local(&self.config.backup_dir).await?;
        artifacts.extend(catalog::list_remote(self.transport.as_ref(), remote).await?);

        let decision = classify(&artifacts, now, &self.config.retention);
        info!(
            keep = decision.keep.len(),
            delete = decision.delete.len(),
            unmanaged = decision.unmanaged.len(),
            "Retention decision"
        );

        Ok(rotation::apply(&decision, self.transport.as_ref(), remote).await)
    }

    /// Archives are laid out under year/month/day subdirectories.
    fn archive_path(&self, now: DateTime<Utc>, name: &str) -> PathBuf {
        self.config
            .backup_dir
            .join(now.format("%Y/%m/%d").to_string())
            .join(name)
    }

    async fn notify(&self, payload: NotifyPayload) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.notify(&payload).await {
            warn!(error = %e, "Notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::path::Path;
    use std::sync::Mutex;
    use vaultit_core::Error;
    use vaultit_core::notify::NotifyStatus;
    use vaultit_core::transport::{RemoteEntry, RemoteSpec};
    use vaultit_config::RemoteConfig;
    use vaultit_core::policy::RetentionPolicy;

    struct MockArchiver {
        fail: bool,
    }

    #[async_trait]
    impl Archiver for MockArchiver {
        async fn create(&self, _source: &Path, dest: &Path) -> Result<ArchiveInfo> {
            if self.fail {
                return Err(Error::ArchiveFailed("disk full".to_string()));
            }
            tokio::fs::write(dest, b"archive").await?;
            Ok(ArchiveInfo {
                path: dest.to_path_buf(),
                size_bytes: 7,
            })
        }
    }

    struct MockTransport {
        uploads: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
        listing: Vec<RemoteEntry>,
        fail_upload: bool,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                deletes: Mutex::new(Vec::new()),
                listing: Vec::new(),
                fail_upload: false,
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn upload(&self, local: &Path, _remote: &RemoteSpec) -> Result<()> {
            if self.fail_upload {
                return Err(Error::TransportFailed("connection refused".to_string()));
            }
            self.uploads
                .lock()
                .unwrap()
                .push(local.file_name().unwrap().to_string_lossy().to_string());
            Ok(())
        }

        async fn list(&self, _remote: &RemoteSpec) -> Result<Vec<RemoteEntry>> {
            Ok(self.listing.clone())
        }

        async fn delete(&self, _remote: &RemoteSpec, path: &str) -> Result<()> {
            self.deletes.lock().unwrap().push(path.to_string());
            Ok(())
        }
    }

    struct MockNotifier {
        payloads: Mutex<Vec<NotifyPayload>>,
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify(&self, payload: &NotifyPayload) -> Result<()> {
            self.payloads.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 3, 15, 0).unwrap()
    }

    fn make_config(source: &Path, backup_dir: &Path) -> BackupConfig {
        BackupConfig {
            project: "proj".to_string(),
            source: source.to_path_buf(),
            backup_dir: backup_dir.to_path_buf(),
            log_file: None,
            retention: RetentionPolicy::default(),
            remote: RemoteConfig {
                spec: RemoteSpec::new("gdrive", "backups/proj"),
                flags: Vec::new(),
            },
            notify: None,
        }
    }

    fn make_fixture() -> (tempfile::TempDir, tempfile::TempDir, BackupConfig) {
        let source = tempfile::tempdir().unwrap();
        let backup_dir = tempfile::tempdir().unwrap();
        std::fs::write(source.path().join("data.txt"), b"payload").unwrap();
        let config = make_config(source.path(), backup_dir.path());
        (source, backup_dir, config)
    }

    #[tokio::test]
    async fn test_successful_run_uploads_and_notifies() {
        let (_source, backup_dir, config) = make_fixture();
        let transport = Arc::new(MockTransport::new());
        let notifier = Arc::new(MockNotifier {
            payloads: Mutex::new(Vec::new()),
        });

        let orchestrator = BackupOrchestrator::new(
            config,
            Arc::new(MockArchiver { fail: false }),
            transport.clone(),
        )
        .with_notifier(notifier.clone());

        let report = orchestrator.run_at(fixed_now()).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.archive, "proj_20260807_031500.zip");
        assert_eq!(report.size_bytes, Some(7));
        assert_eq!(
            *transport.uploads.lock().unwrap(),
            vec!["proj_20260807_031500.zip"]
        );
        // Archive lands under the date path.
        assert!(
            backup_dir
                .path()
                .join("2026/08/07/proj_20260807_031500.zip")
                .exists()
        );

        let payloads = notifier.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].status, NotifyStatus::Success);
        assert_eq!(payloads[0].uploaded_to.as_deref(), Some("gdrive:backups/proj"));
    }

    #[tokio::test]
    async fn test_upload_failure_skips_rotation() {
        let (_source, backup_dir, config) = make_fixture();
        // An expired artifact that rotation would otherwise delete.
        let expired = backup_dir.path().join("proj_20240101_000000.zip");
        std::fs::write(&expired, b"old").unwrap();

        let mut transport = MockTransport::new();
        transport.fail_upload = true;
        let transport = Arc::new(transport);
        let notifier = Arc::new(MockNotifier {
            payloads: Mutex::new(Vec::new()),
        });

        let orchestrator = BackupOrchestrator::new(
            config,
            Arc::new(MockArchiver { fail: false }),
            transport.clone(),
        )
        .with_notifier(notifier.clone());

        let report = orchestrator.run_at(fixed_now()).await.unwrap();

        assert!(!report.is_success());
        assert!(matches!(report.upload, StageState::Failed { .. }));
        assert!(matches!(report.rotation, StageState::Skipped { .. }));
        assert!(report.rotation_result.is_none());
        // Existing artifacts are left untouched.
        assert!(expired.exists());

        let payloads = notifier.payloads.lock().unwrap();
        assert_eq!(payloads[0].status, NotifyStatus::Failed);
        assert!(payloads[0].error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_archive_failure_is_fatal() {
        let (_source, _backup_dir, config) = make_fixture();
        let notifier = Arc::new(MockNotifier {
            payloads: Mutex::new(Vec::new()),
        });

        let orchestrator = BackupOrchestrator::new(
            config,
            Arc::new(MockArchiver { fail: true }),
            Arc::new(MockTransport::new()),
        )
        .with_notifier(notifier.clone());

        let result = orchestrator.run_at(fixed_now()).await;
        assert!(result.is_err());

        let payloads = notifier.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].status, NotifyStatus::Failed);
    }

    #[tokio::test]
    async fn test_rotation_prunes_expired_artifacts() {
        let (_source, backup_dir, config) = make_fixture();
        let expired_local = backup_dir.path().join("proj_20240101_000000.zip");
        std::fs::write(&expired_local, b"old").unwrap();

        let mut transport = MockTransport::new();
        transport.listing = vec![RemoteEntry {
            path: "proj_20240102_000000.zip".to_string(),
            size: 3,
        }];
        let transport = Arc::new(transport);

        let orchestrator = BackupOrchestrator::new(
            config,
            Arc::new(MockArchiver { fail: false }),
            transport.clone(),
        );

        let report = orchestrator.run_at(fixed_now()).await.unwrap();

        assert!(report.is_success());
        assert!(report.rotation.is_success());
        let result = report.rotation_result.unwrap();
        assert_eq!(result.deleted_local, 1);
        assert_eq!(result.deleted_remote, 1);
        assert!(result.is_clean());
        assert!(!expired_local.exists());
        assert_eq!(
            *transport.deletes.lock().unwrap(),
            vec!["proj_20240102_000000.zip"]
        );
    }

    #[tokio::test]
    async fn test_fresh_archive_survives_rotation() {
        let (_source, backup_dir, config) = make_fixture();
        let orchestrator = BackupOrchestrator::new(
            config,
            Arc::new(MockArchiver { fail: false }),
            Arc::new(MockTransport::new()),
        );

        let report = orchestrator.run_at(fixed_now()).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.rotation_result.unwrap().deleted_local, 0);
        assert!(
            backup_dir
                .path()
                .join("2026/08/07/proj_20260807_031500.zip")
                .exists()
        );
    }
}
