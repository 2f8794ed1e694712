use chrono::TimeDelta;
use telemetry_core::{AppError, AppResult};

/// Tuning for delete-by-rule operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteByRuleConfig {
    /// Delete attempts per alarm before the operation fails.
    pub max_delete_attempts: u32,
    /// Successful deletions between two progress checkpoints.
    pub checkpoint_interval: u64,
    /// Alarm ids requested per query page.
    pub page_size: usize,
    /// Age after which an `InProgress` record is reported as `Unknown`.
    pub status_stale_after: TimeDelta,
}

impl DeleteByRuleConfig {
    /// Creates a validated configuration.
    pub fn new(
        max_delete_attempts: u32,
        checkpoint_interval: u64,
        page_size: usize,
        status_stale_after: TimeDelta,
    ) -> AppResult<Self> {
        if max_delete_attempts == 0 {
            return Err(AppError::Validation(
                "max_delete_attempts must be greater than zero".to_owned(),
            ));
        }

        if checkpoint_interval == 0 {
            return Err(AppError::Validation(
                "checkpoint_interval must be greater than zero".to_owned(),
            ));
        }

        if page_size == 0 {
            return Err(AppError::Validation(
                "page_size must be greater than zero".to_owned(),
            ));
        }

        if status_stale_after <= TimeDelta::zero() {
            return Err(AppError::Validation(
                "status_stale_after must be positive".to_owned(),
            ));
        }

        Ok(Self {
            max_delete_attempts,
            checkpoint_interval,
            page_size,
            status_stale_after,
        })
    }
}

impl Default for DeleteByRuleConfig {
    fn default() -> Self {
        Self {
            max_delete_attempts: 3,
            checkpoint_interval: 50,
            page_size: 1000,
            status_stale_after: TimeDelta::minutes(10),
        }
    }
}
