use async_trait::async_trait;
use telemetry_core::AppResult;
use telemetry_domain::DeleteStatus;

/// Persistence port for delete-by-rule progress records.
#[async_trait]
pub trait DeleteStatusRepository: Send + Sync {
    /// Inserts or replaces the record keyed by the status id.
    async fn upsert_delete_status(&self, status: &DeleteStatus) -> AppResult<()>;

    /// Returns the stored record for one operation, if any.
    async fn find_delete_status(&self, operation_id: &str) -> AppResult<Option<DeleteStatus>>;
}
