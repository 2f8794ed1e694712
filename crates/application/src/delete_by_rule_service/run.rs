use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use telemetry_domain::{DeleteStatus, DeleteStatusKind, PageWindow};
use tracing::{debug, error, info, warn};

use super::retry::DeleteAttemptOutcome;
use super::{DeleteByRuleRequest, DeleteByRuleService};

/// In-memory progress of one running operation.
#[derive(Debug)]
struct DeleteProgress {
    operation_id: String,
    records_deleted: u64,
    since_checkpoint: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl DeleteProgress {
    fn new(operation_id: &str) -> Self {
        Self {
            operation_id: operation_id.to_owned(),
            records_deleted: 0,
            since_checkpoint: 0,
            last_timestamp: None,
        }
    }

    fn record_deletion(&mut self) {
        self.records_deleted = self.records_deleted.saturating_add(1);
        self.since_checkpoint = self.since_checkpoint.saturating_add(1);
    }

    /// Builds the next record, keeping timestamps strictly increasing.
    fn snapshot(&mut self, status: DeleteStatusKind) -> DeleteStatus {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        self.since_checkpoint = 0;

        DeleteStatus::checkpoint(
            self.operation_id.as_str(),
            status,
            timestamp,
            self.records_deleted,
        )
    }
}

/// Returns the size of the next page, or `None` once the caller's limit is met.
pub(super) fn next_page_limit(
    page_size: usize,
    limit: Option<usize>,
    records_deleted: u64,
) -> Option<usize> {
    let Some(limit) = limit else {
        return Some(page_size);
    };

    let deleted = usize::try_from(records_deleted).unwrap_or(usize::MAX);
    let remaining = limit.saturating_sub(deleted);
    (remaining > 0).then(|| remaining.min(page_size))
}

impl DeleteByRuleService {
    /// Runs one operation to a terminal state and returns the final record.
    ///
    /// Never fails: every outcome is reported through the persisted status.
    pub async fn run_delete_by_rule(&self, request: DeleteByRuleRequest) -> DeleteStatus {
        let operation_id = request.operation_id.as_str();
        let rule_id = request.query.rule_id.as_str();
        let mut progress = DeleteProgress::new(operation_id);

        self.write_in_progress(&mut progress).await;

        let mut previous_page = HashSet::new();
        loop {
            let Some(page_limit) =
                next_page_limit(self.config.page_size, request.limit, progress.records_deleted)
            else {
                debug!(operation_id, rule_id, "delete limit reached");
                break;
            };

            let page = PageWindow::new(request.skip, page_limit);
            let alarm_ids = match self
                .alarm_repository
                .list_alarm_ids_by_rule(&request.query, page)
                .await
            {
                Ok(alarm_ids) => alarm_ids,
                Err(query_error) => {
                    error!(
                        operation_id,
                        rule_id,
                        records_deleted = progress.records_deleted,
                        error = %query_error,
                        "failed to query alarms for delete by rule"
                    );
                    return self.finish(&mut progress, DeleteStatusKind::Failed).await;
                }
            };

            // Ids from the previous page can reappear while the store catches up.
            let pending: Vec<String> = alarm_ids
                .into_iter()
                .filter(|alarm_id| !previous_page.contains(alarm_id))
                .collect();
            if pending.is_empty() {
                break;
            }

            for alarm_id in &pending {
                match self.delete_with_retry(operation_id, alarm_id).await {
                    DeleteAttemptOutcome::Deleted => {
                        progress.record_deletion();
                        if progress.since_checkpoint >= self.config.checkpoint_interval {
                            self.write_in_progress(&mut progress).await;
                        }
                    }
                    DeleteAttemptOutcome::Exhausted { attempts } => {
                        error!(
                            operation_id,
                            rule_id,
                            alarm_id = %alarm_id,
                            attempts,
                            records_deleted = progress.records_deleted,
                            "delete by rule aborted"
                        );
                        return self.finish(&mut progress, DeleteStatusKind::Failed).await;
                    }
                }
            }

            if progress.since_checkpoint > 0 {
                self.write_in_progress(&mut progress).await;
            }

            previous_page = pending.into_iter().collect();
        }

        self.finish(&mut progress, DeleteStatusKind::Success).await
    }

    async fn write_in_progress(&self, progress: &mut DeleteProgress) {
        let checkpoint = progress.snapshot(DeleteStatusKind::InProgress);

        if let Err(write_error) = self.status_repository.upsert_delete_status(&checkpoint).await {
            warn!(
                operation_id = %checkpoint.id(),
                records_deleted = progress.records_deleted,
                error = %write_error,
                "failed to write delete by rule checkpoint"
            );
        }
    }

    async fn finish(&self, progress: &mut DeleteProgress, status: DeleteStatusKind) -> DeleteStatus {
        let terminal = progress.snapshot(status);

        match self.status_repository.upsert_delete_status(&terminal).await {
            Ok(()) => info!(
                operation_id = %terminal.id(),
                status = terminal.status().as_str(),
                records_deleted = progress.records_deleted,
                "delete by rule finished"
            ),
            Err(write_error) => error!(
                operation_id = %terminal.id(),
                status = terminal.status().as_str(),
                records_deleted = progress.records_deleted,
                error = %write_error,
                "failed to write final delete by rule status"
            ),
        }

        terminal
    }
}
