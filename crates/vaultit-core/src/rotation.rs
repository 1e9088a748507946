//! Rotation result types.

use serde::{Deserialize, Serialize};

use crate::artifact::Location;

/// A single failed deletion during rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationError {
    pub name: String,
    pub location: Location,
    pub message: String,
}

impl std::fmt::Display for RotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.location, self.message)
    }
}

/// Outcome of applying a retention decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationResult {
    pub deleted_local: u64,
    pub deleted_remote: u64,
    pub errors: Vec<RotationError>,
}

impl RotationResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
