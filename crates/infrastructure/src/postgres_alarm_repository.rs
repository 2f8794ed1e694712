//! PostgreSQL-backed alarm repository using the `alarms` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use telemetry_application::AlarmRepository;
use telemetry_core::{AppError, AppResult};
use telemetry_domain::{
    Alarm, AlarmCountByRule, AlarmCountQuery, AlarmStatus, AlarmTimeRange, AlarmsByRuleQuery,
    DeviceIdFilter, PageWindow, SortOrder,
};
use tracing::debug;

/// PostgreSQL implementation of the alarm repository port.
#[derive(Clone)]
pub struct PostgresAlarmRepository {
    pool: PgPool,
}

impl PostgresAlarmRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlarmRepository for PostgresAlarmRepository {
    async fn list_alarms_by_rule(
        &self,
        query: &AlarmsByRuleQuery,
        page: PageWindow,
    ) -> AppResult<Vec<Alarm>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT id, rule_id, device_id, status, description, created_at, modified_at
            FROM alarms
            WHERE rule_id = "#,
        );
        builder.push_bind(query.rule_id.as_str().to_owned());
        push_filters(&mut builder, &query.time_range, &query.device_ids);
        push_alarm_order(&mut builder, query.order);
        push_page(&mut builder, page)?;

        let rows = builder
            .build_query_as::<AlarmRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list alarms by rule: {error}")))?;

        rows.into_iter().map(AlarmRow::into_alarm).collect()
    }

    async fn list_alarm_ids_by_rule(
        &self,
        query: &AlarmsByRuleQuery,
        page: PageWindow,
    ) -> AppResult<Vec<String>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM alarms WHERE rule_id = ");
        builder.push_bind(query.rule_id.as_str().to_owned());
        push_filters(&mut builder, &query.time_range, &query.device_ids);
        push_alarm_order(&mut builder, query.order);
        push_page(&mut builder, page)?;

        builder
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list alarm ids by rule: {error}"))
            })
    }

    async fn count_alarms_by_rule(
        &self,
        query: &AlarmCountQuery,
        page: PageWindow,
    ) -> AppResult<Vec<AlarmCountByRule>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                rule_id,
                COUNT(*) AS alarm_count,
                (ARRAY_AGG(status ORDER BY created_at DESC, id DESC))[1] AS latest_status,
                MAX(created_at) AS last_occurrence
            FROM alarms
            WHERE TRUE"#,
        );
        push_filters(&mut builder, &query.time_range, &query.device_ids);
        builder.push(" GROUP BY rule_id ORDER BY last_occurrence ");
        builder.push(order_keyword(query.order));
        builder.push(", rule_id");
        push_page(&mut builder, page)?;

        let rows = builder
            .build_query_as::<AlarmCountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to count alarms by rule: {error}"))
            })?;

        rows.into_iter().map(AlarmCountRow::into_count).collect()
    }

    async fn delete_alarm(&self, alarm_id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM alarms
            WHERE id = $1
            "#,
        )
        .bind(alarm_id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete alarm '{alarm_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            debug!(alarm_id, "alarm already deleted");
        }

        Ok(())
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    time_range: &AlarmTimeRange,
    device_ids: &DeviceIdFilter,
) {
    if let Some(from) = time_range.from() {
        builder.push(" AND created_at >= ").push_bind(from);
    }

    if let Some(to) = time_range.to() {
        builder.push(" AND created_at <= ").push_bind(to);
    }

    if !device_ids.is_empty() {
        builder
            .push(" AND device_id = ANY(")
            .push_bind(device_ids.as_slice().to_vec())
            .push(")");
    }
}

fn push_alarm_order(builder: &mut QueryBuilder<'_, Postgres>, order: SortOrder) {
    let keyword = order_keyword(order);
    builder.push(format!(" ORDER BY created_at {keyword}, id {keyword}"));
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: PageWindow) -> AppResult<()> {
    builder
        .push(" OFFSET ")
        .push_bind(to_i64("skip", page.skip)?)
        .push(" LIMIT ")
        .push_bind(to_i64("limit", page.limit)?);
    Ok(())
}

fn order_keyword(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn to_i64(name: &str, value: usize) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("{name} value {value} is out of range")))
}

#[derive(Debug, sqlx::FromRow)]
struct AlarmRow {
    id: String,
    rule_id: String,
    device_id: String,
    status: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl AlarmRow {
    fn into_alarm(self) -> AppResult<Alarm> {
        Ok(Alarm {
            status: AlarmStatus::parse(self.status.as_str())?,
            id: self.id,
            rule_id: self.rule_id,
            device_id: self.device_id,
            description: self.description,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AlarmCountRow {
    rule_id: String,
    alarm_count: i64,
    latest_status: String,
    last_occurrence: DateTime<Utc>,
}

impl AlarmCountRow {
    fn into_count(self) -> AppResult<AlarmCountByRule> {
        let count = u64::try_from(self.alarm_count).map_err(|_| {
            AppError::Internal(format!(
                "negative alarm count {} for rule '{}'",
                self.alarm_count, self.rule_id
            ))
        })?;

        Ok(AlarmCountByRule {
            status: AlarmStatus::parse(self.latest_status.as_str())?,
            rule_id: self.rule_id,
            count,
            last_occurrence: self.last_occurrence,
        })
    }
}
