use async_trait::async_trait;
use telemetry_core::AppResult;
use telemetry_domain::{Alarm, AlarmCountByRule, AlarmCountQuery, AlarmsByRuleQuery, PageWindow};

/// Repository port for alarm documents.
#[async_trait]
pub trait AlarmRepository: Send + Sync {
    /// Lists alarms raised by one rule.
    async fn list_alarms_by_rule(
        &self,
        query: &AlarmsByRuleQuery,
        page: PageWindow,
    ) -> AppResult<Vec<Alarm>>;

    /// Lists only the ids of alarms raised by one rule, in query order.
    async fn list_alarm_ids_by_rule(
        &self,
        query: &AlarmsByRuleQuery,
        page: PageWindow,
    ) -> AppResult<Vec<String>>;

    /// Counts matching alarms grouped by rule.
    async fn count_alarms_by_rule(
        &self,
        query: &AlarmCountQuery,
        page: PageWindow,
    ) -> AppResult<Vec<AlarmCountByRule>>;

    /// Deletes one alarm by id.
    ///
    /// Deleting an id that no longer exists succeeds without doing anything.
    async fn delete_alarm(&self, alarm_id: &str) -> AppResult<()>;
}
