//! PostgreSQL-backed delete status repository using the `alarm_delete_status` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use telemetry_application::DeleteStatusRepository;
use telemetry_core::{AppError, AppResult};
use telemetry_domain::{DeleteStatus, DeleteStatusKind};

/// PostgreSQL implementation of the delete status repository port.
#[derive(Clone)]
pub struct PostgresDeleteStatusRepository {
    pool: PgPool,
}

impl PostgresDeleteStatusRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeleteStatusRepository for PostgresDeleteStatusRepository {
    async fn upsert_delete_status(&self, status: &DeleteStatus) -> AppResult<()> {
        if status.status() == DeleteStatusKind::Unknown {
            return Err(AppError::Validation(format!(
                "delete status '{}' cannot be stored as Unknown",
                status.id()
            )));
        }

        let records_deleted = status
            .records_deleted()
            .map(|count| {
                i64::try_from(count).map_err(|_| {
                    AppError::Validation(format!("records deleted value {count} is out of range"))
                })
            })
            .transpose()?;

        // Terminal rows stay as written.
        sqlx::query(
            r#"
            INSERT INTO alarm_delete_status (id, status, recorded_at, records_deleted)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET
                status = EXCLUDED.status,
                recorded_at = EXCLUDED.recorded_at,
                records_deleted = EXCLUDED.records_deleted
            WHERE alarm_delete_status.status NOT IN ('Success', 'Failed')
            "#,
        )
        .bind(status.id())
        .bind(status.status().as_str())
        .bind(status.timestamp())
        .bind(records_deleted)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to write delete status '{}': {error}",
                status.id()
            ))
        })?;

        Ok(())
    }

    async fn find_delete_status(&self, operation_id: &str) -> AppResult<Option<DeleteStatus>> {
        let row = sqlx::query_as::<_, DeleteStatusRow>(
            r#"
            SELECT id, status, recorded_at, records_deleted
            FROM alarm_delete_status
            WHERE id = $1
            "#,
        )
        .bind(operation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to read delete status '{operation_id}': {error}"
            ))
        })?;

        row.map(DeleteStatusRow::into_status).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DeleteStatusRow {
    id: String,
    status: String,
    recorded_at: Option<DateTime<Utc>>,
    records_deleted: Option<i64>,
}

impl DeleteStatusRow {
    fn into_status(self) -> AppResult<DeleteStatus> {
        let records_deleted = self
            .records_deleted
            .map(|count| {
                u64::try_from(count).map_err(|_| {
                    AppError::Internal(format!(
                        "negative records deleted {count} for operation '{}'",
                        self.id
                    ))
                })
            })
            .transpose()?;

        Ok(DeleteStatus::from_parts(
            self.id,
            DeleteStatusKind::parse(self.status.as_str())?,
            self.recorded_at,
            records_deleted,
        ))
    }
}
