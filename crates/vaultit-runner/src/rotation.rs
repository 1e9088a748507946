//! Rotation executor: applies a retention decision.

use tracing::{info, warn};

use vaultit_core::artifact::Location;
use vaultit_core::retention::RetentionDecision;
use vaultit_core::rotation::{RotationError, RotationResult};
use vaultit_core::transport::{RemoteSpec, Transport};

/// Delete everything in the decision's delete set, best effort.
///
/// A failed deletion is recorded and the remaining artifacts are still
/// attempted; one failure never blocks the rest. The keep and unmanaged
/// sets are never touched.
pub async fn apply(
    decision: &RetentionDecision,
    transport: &dyn Transport,
    remote: &RemoteSpec,
) -> RotationResult {
    let mut result = RotationResult::default();

    for artifact in &decision.delete {
        match artifact.location {
            Location::Local => match tokio::fs::remove_file(&artifact.path).await {
                Ok(()) => {
                    info!(file = %artifact.path.display(), "Deleted local artifact");
                    result.deleted_local += 1;
                }
                Err(e) => {
                    warn!(file = %artifact.path.display(), error = %e, "Failed to delete local artifact");
                    result.errors.push(RotationError {
                        name: artifact.name.clone(),
                        location: Location::Local,
                        message: e.to_string(),
                    });
                }
            },
            Location::Remote => {
                let path = artifact.path.to_string_lossy();
                match transport.delete(remote, &path).await {
                    Ok(()) => {
                        info!(path = %path, remote = %remote, "Deleted remote artifact");
                        result.deleted_remote += 1;
                    }
                    Err(e) => {
                        warn!(path = %path, remote = %remote, error = %e, "Failed to delete remote artifact");
                        result.errors.push(RotationError {
                            name: artifact.name.clone(),
                            location: Location::Remote,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use vaultit_core::artifact::Artifact;
    use vaultit_core::transport::RemoteEntry;
    use vaultit_core::{Error, Result};

    struct MockTransport {
        deleted: Mutex<Vec<String>>,
        fail_paths: Vec<String>,
    }

    impl MockTransport {
        fn new(fail_paths: Vec<&str>) -> Self {
            Self {
                deleted: Mutex::new(Vec::new()),
                fail_paths: fail_paths.into_iter().map(String::from).collect(),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn upload(&self, _local: &Path, _remote: &RemoteSpec) -> Result<()> {
            Ok(())
        }

        async fn list(&self, _remote: &RemoteSpec) -> Result<Vec<RemoteEntry>> {
            Ok(Vec::new())
        }

        async fn delete(&self, _remote: &RemoteSpec, path: &str) -> Result<()> {
            if self.fail_paths.iter().any(|p| p == path) {
                return Err(Error::TransportFailed("permission denied".to_string()));
            }
            self.deleted.lock().unwrap().push(path.to_string());
            Ok(())
        }
    }

    fn remote_spec() -> RemoteSpec {
        RemoteSpec::new("gdrive", "backups/proj")
    }

    #[tokio::test]
    async fn test_local_delete_failure_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let present_a = dir.path().join("proj_20250101_000000.zip");
        let present_b = dir.path().join("proj_20250201_000000.zip");
        std::fs::write(&present_a, b"zip").unwrap();
        std::fs::write(&present_b, b"zip").unwrap();
        // Never created, so removal fails.
        let missing = dir.path().join("proj_20250301_000000.zip");

        let decision = RetentionDecision {
            keep: Vec::new(),
            delete: vec![
                Artifact::local(&present_a, None),
                Artifact::local(&missing, None),
                Artifact::local(&present_b, None),
            ],
            unmanaged: Vec::new(),
        };

        let transport = MockTransport::new(Vec::new());
        let result = apply(&decision, &transport, &remote_spec()).await;

        assert_eq!(result.deleted_local, 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].name, "proj_20250301_000000.zip");
        assert_eq!(result.errors[0].location, Location::Local);
        assert!(!present_a.exists());
        assert!(!present_b.exists());
    }

    #[tokio::test]
    async fn test_remote_delete_failure_does_not_abort() {
        let decision = RetentionDecision {
            keep: Vec::new(),
            delete: vec![
                Artifact::remote("proj_20250101_000000.zip", None),
                Artifact::remote("proj_20250201_000000.zip", None),
            ],
            unmanaged: Vec::new(),
        };

        let transport = MockTransport::new(vec!["proj_20250101_000000.zip"]);
        let result = apply(&decision, &transport, &remote_spec()).await;

        assert_eq!(result.deleted_remote, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].location, Location::Remote);
        assert_eq!(
            *transport.deleted.lock().unwrap(),
            vec!["proj_20250201_000000.zip"]
        );
    }

    #[tokio::test]
    async fn test_keep_set_is_never_touched() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("proj_20260807_000000.zip");
        std::fs::write(&kept, b"zip").unwrap();

        let decision = RetentionDecision {
            keep: vec![Artifact::local(&kept, None)],
            delete: Vec::new(),
            unmanaged: Vec::new(),
        };

        let transport = MockTransport::new(Vec::new());
        let result = apply(&decision, &transport, &remote_spec()).await;

        assert_eq!(result.deleted_local, 0);
        assert!(result.is_clean());
        assert!(kept.exists());
    }
}
