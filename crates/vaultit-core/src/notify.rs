//! Notification payload and delivery trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyStatus {
    Success,
    Failed,
}

/// Webhook payload describing the outcome of a backup run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyPayload {
    pub status: NotifyStatus,
    /// Name of the archive this run produced (or tried to produce).
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-artifact rotation failures; a successful backup with partial
    /// rotation errors still reports success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rotation_errors: Vec<String>,
}

impl NotifyPayload {
    pub fn success(file: &str, size_bytes: u64, uploaded_to: &str) -> Self {
        Self {
            status: NotifyStatus::Success,
            file: file.to_string(),
            size_bytes: Some(size_bytes),
            uploaded_to: Some(uploaded_to.to_string()),
            error: None,
            rotation_errors: Vec::new(),
        }
    }

    pub fn failed(file: &str, error: &str) -> Self {
        Self {
            status: NotifyStatus::Failed,
            file: file.to_string(),
            size_bytes: None,
            uploaded_to: None,
            error: Some(error.to_string()),
            rotation_errors: Vec::new(),
        }
    }
}

/// Delivers run outcome payloads.
///
/// Delivery failure is logged by callers and never escalates past the
/// notification step.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &NotifyPayload) -> Result<()>;
}
