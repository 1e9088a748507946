//! Rclone-backed transport for VaultIt.
//!
//! Implements the core `Transport` trait by shelling out to the rclone
//! binary for upload, listing and deletion.

pub mod rclone;

pub use rclone::RcloneTransport;
