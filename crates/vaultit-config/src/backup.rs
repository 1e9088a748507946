//! Backup job configuration parsing.

use std::path::PathBuf;

use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};

use vaultit_core::policy::RetentionPolicy;
use vaultit_core::transport::RemoteSpec;

use crate::{ConfigError, ConfigResult};

/// Full configuration for one backup job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Project name; becomes the archive name prefix.
    pub project: String,
    /// Directory to back up.
    pub source: PathBuf,
    /// Directory archives are written to.
    pub backup_dir: PathBuf,
    /// Log destination; stderr when absent.
    pub log_file: Option<PathBuf>,
    pub retention: RetentionPolicy,
    pub remote: RemoteConfig,
    pub notify: Option<NotifyConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub spec: RemoteSpec,
    /// Extra flags passed through to the transport tool.
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub url: String,
    pub enabled: bool,
}

/// Parse a backup configuration from KDL text.
///
/// Required fields are `backup` (with the project name), `source`,
/// `backup-dir` and `remote`. The retention node defaults to 7/30/365
/// day windows; mis-ordered windows are rejected here, before any side
/// effect.
pub fn parse_backup_config(kdl: &str) -> ConfigResult<BackupConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let backup = doc
        .nodes()
        .iter()
        .find(|n| n.name().value() == "backup")
        .ok_or_else(|| ConfigError::MissingField("backup".to_string()))?;

    let project = get_first_string_arg(backup)
        .ok_or_else(|| ConfigError::MissingField("backup project name".to_string()))?;

    let mut source = None;
    let mut backup_dir = None;
    let mut log_file = None;
    let mut retention = RetentionPolicy::default();
    let mut remote = None;
    let mut notify = None;

    if let Some(children) = backup.children() {
        for child in children.nodes() {
            match child.name().value() {
                "source" => {
                    source = get_first_string_arg(child).map(PathBuf::from);
                }
                "backup-dir" => {
                    backup_dir = get_first_string_arg(child).map(PathBuf::from);
                }
                "log-file" => {
                    log_file = get_first_string_arg(child).map(PathBuf::from);
                }
                "retention" => {
                    retention = parse_retention(child)?;
                }
                "remote" => {
                    remote = Some(parse_remote(child)?);
                }
                "notify" => {
                    notify = Some(parse_notify(child)?);
                }
                _ => {} // Ignore unknown nodes
            }
        }
    }

    Ok(BackupConfig {
        project,
        source: source.ok_or_else(|| ConfigError::MissingField("source".to_string()))?,
        backup_dir: backup_dir
            .ok_or_else(|| ConfigError::MissingField("backup-dir".to_string()))?,
        log_file,
        retention,
        remote: remote.ok_or_else(|| ConfigError::MissingField("remote".to_string()))?,
        notify,
    })
}

fn parse_retention(node: &KdlNode) -> ConfigResult<RetentionPolicy> {
    let defaults = RetentionPolicy::default();
    let daily_days = get_window_prop(node, "daily-days")?.unwrap_or(defaults.daily_days);
    let weekly_days = get_window_prop(node, "weekly-days")?.unwrap_or(defaults.weekly_days);
    let monthly_days = get_window_prop(node, "monthly-days")?.unwrap_or(defaults.monthly_days);

    RetentionPolicy::new(daily_days, weekly_days, monthly_days).map_err(|e| {
        ConfigError::InvalidValue {
            field: "retention".to_string(),
            message: e.to_string(),
        }
    })
}

fn parse_remote(node: &KdlNode) -> ConfigResult<RemoteConfig> {
    let remote = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("remote name".to_string()))?;
    let folder = get_string_prop(node, "folder")
        .ok_or_else(|| ConfigError::MissingField("remote folder".to_string()))?;

    let mut flags = Vec::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "flag" {
                if let Some(flag) = get_first_string_arg(child) {
                    flags.push(flag);
                }
            }
        }
    }

    Ok(RemoteConfig {
        spec: RemoteSpec::new(remote, folder),
        flags,
    })
}

fn parse_notify(node: &KdlNode) -> ConfigResult<NotifyConfig> {
    let url = get_string_prop(node, "url")
        .ok_or_else(|| ConfigError::MissingField("notify url".to_string()))?;
    let enabled = get_bool_prop(node, "enabled").unwrap_or(true);
    Ok(NotifyConfig { url, enabled })
}

fn get_window_prop(node: &KdlNode, name: &str) -> ConfigResult<Option<u32>> {
    match node.get(name).and_then(|v| v.as_integer()) {
        Some(days) => {
            let days = u32::try_from(days).map_err(|_| ConfigError::InvalidValue {
                field: name.to_string(),
                message: format!("window must be a non-negative day count, got {}", days),
            })?;
            Ok(Some(days))
        }
        None => Ok(None),
    }
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_bool_prop(node: &KdlNode, name: &str) -> Option<bool> {
    node.get(name).and_then(|v| v.as_bool())
}
