//! Progress record shared between a delete-by-rule operation and its pollers.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use telemetry_core::{AppError, AppResult};

/// State of one delete-by-rule operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeleteStatusKind {
    /// Operation is running and has written at least one checkpoint.
    #[serde(alias = "In Progress")]
    InProgress,
    /// Operation deleted every matching alarm.
    Success,
    /// Operation aborted before finishing.
    Failed,
    /// Nothing usable is stored. Computed at read time, never persisted.
    Unknown,
}

impl DeleteStatusKind {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "InProgress",
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "InProgress" | "In Progress" => Ok(Self::InProgress),
            "Success" => Ok(Self::Success),
            "Failed" => Ok(Self::Failed),
            "Unknown" => Ok(Self::Unknown),
            _ => Err(AppError::Validation(format!(
                "unknown delete status '{value}'"
            ))),
        }
    }

    /// Returns whether no further checkpoint may follow this state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Persisted snapshot of delete-by-rule progress, keyed by operation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteStatus {
    id: String,
    status: DeleteStatusKind,
    timestamp: Option<DateTime<Utc>>,
    records_deleted: Option<u64>,
}

impl DeleteStatus {
    /// Creates the placeholder reported when no usable record exists.
    #[must_use]
    pub fn unknown(operation_id: impl Into<String>) -> Self {
        Self {
            id: operation_id.into(),
            status: DeleteStatusKind::Unknown,
            timestamp: None,
            records_deleted: None,
        }
    }

    /// Creates one checkpoint record.
    #[must_use]
    pub fn checkpoint(
        operation_id: impl Into<String>,
        status: DeleteStatusKind,
        timestamp: DateTime<Utc>,
        records_deleted: u64,
    ) -> Self {
        Self {
            id: operation_id.into(),
            status,
            timestamp: Some(timestamp),
            records_deleted: Some(records_deleted),
        }
    }

    /// Rebuilds a record from stored columns.
    #[must_use]
    pub fn from_parts(
        operation_id: impl Into<String>,
        status: DeleteStatusKind,
        timestamp: Option<DateTime<Utc>>,
        records_deleted: Option<u64>,
    ) -> Self {
        Self {
            id: operation_id.into(),
            status,
            timestamp,
            records_deleted,
        }
    }

    /// Returns the operation id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the operation state.
    #[must_use]
    pub fn status(&self) -> DeleteStatusKind {
        self.status
    }

    /// Returns when the record was written.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Returns the deletions recorded at this checkpoint.
    #[must_use]
    pub fn records_deleted(&self) -> Option<u64> {
        self.records_deleted
    }
}

/// Resolves what a poller should see for one operation.
///
/// A missing record, or an `InProgress` record whose timestamp is older than
/// `stale_after`, reports `Unknown` with no timestamp or count. Everything else
/// is returned unchanged.
#[must_use]
pub fn effective_delete_status(
    operation_id: &str,
    stored: Option<DeleteStatus>,
    now: DateTime<Utc>,
    stale_after: TimeDelta,
) -> DeleteStatus {
    let Some(stored) = stored else {
        return DeleteStatus::unknown(operation_id);
    };

    match stored.status {
        DeleteStatusKind::Success | DeleteStatusKind::Failed => stored,
        DeleteStatusKind::InProgress => match stored.timestamp {
            Some(timestamp) if now.signed_duration_since(timestamp) <= stale_after => stored,
            _ => DeleteStatus::unknown(operation_id),
        },
        DeleteStatusKind::Unknown => DeleteStatus::unknown(operation_id),
    }
}
