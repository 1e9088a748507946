//! Tiered retention policy.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Retention windows, all expressed in days.
///
/// Artifacts younger than `daily_days` are always kept. Between
/// `daily_days` and `weekly_days` one artifact per ISO calendar week
/// survives; between `weekly_days` and `monthly_days` one per calendar
/// month. Anything older than `monthly_days` is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub daily_days: u32,
    pub weekly_days: u32,
    pub monthly_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            daily_days: 7,
            weekly_days: 30,
            monthly_days: 365,
        }
    }
}

impl RetentionPolicy {
    /// Create a policy, rejecting mis-ordered windows.
    pub fn new(daily_days: u32, weekly_days: u32, monthly_days: u32) -> Result<Self> {
        let policy = Self {
            daily_days,
            weekly_days,
            monthly_days,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Windows must satisfy daily <= weekly <= monthly.
    pub fn validate(&self) -> Result<()> {
        if self.daily_days > self.weekly_days || self.weekly_days > self.monthly_days {
            return Err(Error::InvalidPolicy(format!(
                "windows must satisfy daily <= weekly <= monthly, got {}d/{}d/{}d",
                self.daily_days, self.weekly_days, self.monthly_days
            )));
        }
        Ok(())
    }

    pub fn daily_window(&self) -> Duration {
        Duration::days(self.daily_days as i64)
    }

    pub fn weekly_window(&self) -> Duration {
        Duration::days(self.weekly_days as i64)
    }

    pub fn monthly_window(&self) -> Duration {
        Duration::days(self.monthly_days as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.daily_days, 7);
        assert_eq!(policy.weekly_days, 30);
        assert_eq!(policy.monthly_days, 365);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_equal_windows_are_valid() {
        assert!(RetentionPolicy::new(7, 7, 7).is_ok());
    }

    #[test]
    fn test_misordered_windows_rejected() {
        assert!(RetentionPolicy::new(30, 7, 365).is_err());
        assert!(RetentionPolicy::new(7, 365, 30).is_err());
    }
}
