//! KDL configuration parsing for the VaultIt backup tool.
//!
//! This crate handles parsing of:
//! - Backup job definitions (vaultit.kdl)
//! - Retention window validation

pub mod backup;
pub mod error;

pub use backup::{BackupConfig, NotifyConfig, RemoteConfig, parse_backup_config};
pub use error::{ConfigError, ConfigResult};
