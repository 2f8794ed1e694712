use std::collections::HashMap;

use async_trait::async_trait;
use telemetry_application::DeleteStatusRepository;
use telemetry_core::{AppError, AppResult};
use telemetry_domain::{DeleteStatus, DeleteStatusKind};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory delete status store keyed by operation id.
#[derive(Debug, Default)]
pub struct InMemoryDeleteStatusRepository {
    records: RwLock<HashMap<String, DeleteStatus>>,
}

impl InMemoryDeleteStatusRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeleteStatusRepository for InMemoryDeleteStatusRepository {
    async fn upsert_delete_status(&self, status: &DeleteStatus) -> AppResult<()> {
        if status.status() == DeleteStatusKind::Unknown {
            return Err(AppError::Validation(format!(
                "delete status '{}' cannot be stored as Unknown",
                status.id()
            )));
        }

        let mut records = self.records.write().await;
        if records
            .get(status.id())
            .is_some_and(|stored| stored.status().is_terminal())
        {
            debug!(operation_id = status.id(), "ignoring write over terminal delete status");
            return Ok(());
        }

        records.insert(status.id().to_owned(), status.clone());
        Ok(())
    }

    async fn find_delete_status(&self, operation_id: &str) -> AppResult<Option<DeleteStatus>> {
        Ok(self.records.read().await.get(operation_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use telemetry_application::DeleteStatusRepository;
    use telemetry_domain::{DeleteStatus, DeleteStatusKind};

    use super::InMemoryDeleteStatusRepository;

    #[tokio::test]
    async fn later_checkpoint_replaces_in_progress_record() {
        let repository = InMemoryDeleteStatusRepository::new();
        let now = Utc::now();

        let first = DeleteStatus::checkpoint("op-1", DeleteStatusKind::InProgress, now, 0);
        let second = DeleteStatus::checkpoint(
            "op-1",
            DeleteStatusKind::InProgress,
            now + TimeDelta::seconds(1),
            50,
        );
        assert!(repository.upsert_delete_status(&first).await.is_ok());
        assert!(repository.upsert_delete_status(&second).await.is_ok());

        let stored = repository.find_delete_status("op-1").await;
        assert_eq!(stored.unwrap_or_default(), Some(second));
    }

    #[tokio::test]
    async fn terminal_record_is_kept() {
        let repository = InMemoryDeleteStatusRepository::new();
        let now = Utc::now();

        let failed = DeleteStatus::checkpoint("op-2", DeleteStatusKind::Failed, now, 4);
        let late = DeleteStatus::checkpoint(
            "op-2",
            DeleteStatusKind::InProgress,
            now + TimeDelta::seconds(1),
            5,
        );
        assert!(repository.upsert_delete_status(&failed).await.is_ok());
        assert!(repository.upsert_delete_status(&late).await.is_ok());

        let stored = repository.find_delete_status("op-2").await;
        assert_eq!(stored.unwrap_or_default(), Some(failed));
    }

    #[tokio::test]
    async fn unknown_is_rejected_and_missing_reads_none() {
        let repository = InMemoryDeleteStatusRepository::new();

        let unknown = DeleteStatus::unknown("op-3");
        assert!(repository.upsert_delete_status(&unknown).await.is_err());

        let stored = repository.find_delete_status("op-3").await;
        assert!(matches!(stored, Ok(None)));
    }
}
