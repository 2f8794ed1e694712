//! Background delete-by-rule operations and their status reporting.
//!
//! An operation runs detached on the tokio runtime. The only state it shares
//! with pollers is the `DeleteStatus` record it checkpoints through the
//! `DeleteStatusRepository` port.

use std::sync::Arc;

use telemetry_core::{AppError, AppResult, NonEmptyString};
use telemetry_domain::{AlarmsByRuleQuery, DeleteStatus};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span};

use crate::alarm_ports::{AlarmRepository, DeleteStatusRepository};

mod config;
mod retry;
mod run;
mod status;

pub use config::DeleteByRuleConfig;

/// Parameters for one delete-by-rule operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteByRuleRequest {
    /// Caller-supplied correlation id, also the status record key.
    pub operation_id: NonEmptyString,
    /// Filter selecting the alarms to delete.
    pub query: AlarmsByRuleQuery,
    /// Matching alarms to leave untouched at the start of the ordering.
    pub skip: usize,
    /// Maximum number of alarms to delete. `None` deletes every match.
    pub limit: Option<usize>,
}

/// Handle to a spawned delete-by-rule operation.
///
/// Dropping the handle detaches the task; it keeps running to completion.
#[derive(Debug)]
pub struct DeleteByRuleHandle {
    operation_id: String,
    task: JoinHandle<DeleteStatus>,
}

impl DeleteByRuleHandle {
    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        self.operation_id.as_str()
    }

    /// Waits for the operation and returns its terminal record.
    pub async fn wait(self) -> AppResult<DeleteStatus> {
        self.task.await.map_err(|error| {
            AppError::Internal(format!(
                "delete by rule task '{}' did not complete: {error}",
                self.operation_id
            ))
        })
    }
}

/// Orchestrates delete-by-rule operations and answers status polls.
#[derive(Clone)]
pub struct DeleteByRuleService {
    alarm_repository: Arc<dyn AlarmRepository>,
    status_repository: Arc<dyn DeleteStatusRepository>,
    config: DeleteByRuleConfig,
}

impl DeleteByRuleService {
    /// Creates a delete-by-rule service.
    #[must_use]
    pub fn new(
        alarm_repository: Arc<dyn AlarmRepository>,
        status_repository: Arc<dyn DeleteStatusRepository>,
        config: DeleteByRuleConfig,
    ) -> Self {
        Self {
            alarm_repository,
            status_repository,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &DeleteByRuleConfig {
        &self.config
    }

    /// Spawns one operation and returns without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_delete_by_rule(&self, request: DeleteByRuleRequest) -> DeleteByRuleHandle {
        let operation_id = request.operation_id.as_str().to_owned();
        let span = info_span!(
            "delete_by_rule",
            operation_id = %request.operation_id,
            rule_id = %request.query.rule_id,
        );

        info!(
            operation_id = %request.operation_id,
            rule_id = %request.query.rule_id,
            skip = request.skip,
            limit = ?request.limit,
            "delete by rule accepted"
        );

        let service = self.clone();
        let task = tokio::spawn(
            async move { service.run_delete_by_rule(request).await }.instrument(span),
        );

        DeleteByRuleHandle { operation_id, task }
    }
}
