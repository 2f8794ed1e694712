use chrono::Utc;
use telemetry_domain::{DeleteStatus, effective_delete_status};
use tracing::warn;

use super::DeleteByRuleService;

impl DeleteByRuleService {
    /// Returns what a poller should see for one operation.
    ///
    /// Missing, stale, and unreadable records all report `Unknown`.
    pub async fn delete_status(&self, operation_id: &str) -> DeleteStatus {
        match self.status_repository.find_delete_status(operation_id).await {
            Ok(stored) => effective_delete_status(
                operation_id,
                stored,
                Utc::now(),
                self.config.status_stale_after,
            ),
            Err(read_error) => {
                warn!(
                    operation_id,
                    error = %read_error,
                    "failed to read delete by rule status"
                );
                DeleteStatus::unknown(operation_id)
            }
        }
    }
}
