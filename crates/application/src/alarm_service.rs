use std::sync::Arc;

use telemetry_core::AppResult;
use telemetry_domain::{Alarm, AlarmCountByRule, AlarmCountQuery, AlarmsByRuleQuery, PageWindow};

use crate::alarm_ports::AlarmRepository;

/// Read-only alarm queries.
#[derive(Clone)]
pub struct AlarmService {
    repository: Arc<dyn AlarmRepository>,
}

impl AlarmService {
    /// Creates an alarm service.
    #[must_use]
    pub fn new(repository: Arc<dyn AlarmRepository>) -> Self {
        Self { repository }
    }

    /// Lists alarms raised by one rule.
    pub async fn list_by_rule(
        &self,
        query: &AlarmsByRuleQuery,
        page: PageWindow,
    ) -> AppResult<Vec<Alarm>> {
        self.repository.list_alarms_by_rule(query, page).await
    }

    /// Counts alarms grouped by rule.
    pub async fn count_by_rule(
        &self,
        query: &AlarmCountQuery,
        page: PageWindow,
    ) -> AppResult<Vec<AlarmCountByRule>> {
        self.repository.count_alarms_by_rule(query, page).await
    }
}
