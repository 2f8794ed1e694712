use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use telemetry_application::AlarmRepository;
use telemetry_core::AppResult;
use telemetry_domain::{
    Alarm, AlarmCountByRule, AlarmCountQuery, AlarmsByRuleQuery, PageWindow, SortOrder,
};
use tokio::sync::RwLock;

/// In-memory alarm store used for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryAlarmRepository {
    alarms: RwLock<HashMap<String, Alarm>>,
}

impl InMemoryAlarmRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an alarm, replacing any alarm with the same id.
    pub async fn insert_alarm(&self, alarm: Alarm) {
        self.alarms.write().await.insert(alarm.id.clone(), alarm);
    }

    async fn matching_alarms(&self, query: &AlarmsByRuleQuery) -> Vec<Alarm> {
        let alarms = self.alarms.read().await;

        let mut matching: Vec<Alarm> = alarms
            .values()
            .filter(|alarm| {
                alarm.rule_id == query.rule_id.as_str()
                    && query.time_range.contains(alarm.created_at)
                    && query.device_ids.allows(alarm.device_id.as_str())
            })
            .cloned()
            .collect();

        matching.sort_by(|left, right| apply_order(compare_alarms(left, right), query.order));
        matching
    }
}

#[async_trait]
impl AlarmRepository for InMemoryAlarmRepository {
    async fn list_alarms_by_rule(
        &self,
        query: &AlarmsByRuleQuery,
        page: PageWindow,
    ) -> AppResult<Vec<Alarm>> {
        Ok(self
            .matching_alarms(query)
            .await
            .into_iter()
            .skip(page.skip)
            .take(page.limit)
            .collect())
    }

    async fn list_alarm_ids_by_rule(
        &self,
        query: &AlarmsByRuleQuery,
        page: PageWindow,
    ) -> AppResult<Vec<String>> {
        Ok(self
            .matching_alarms(query)
            .await
            .into_iter()
            .skip(page.skip)
            .take(page.limit)
            .map(|alarm| alarm.id)
            .collect())
    }

    async fn count_alarms_by_rule(
        &self,
        query: &AlarmCountQuery,
        page: PageWindow,
    ) -> AppResult<Vec<AlarmCountByRule>> {
        let alarms = self.alarms.read().await;

        let mut grouped: HashMap<&str, (u64, &Alarm)> = HashMap::new();
        for alarm in alarms.values().filter(|alarm| {
            query.time_range.contains(alarm.created_at)
                && query.device_ids.allows(alarm.device_id.as_str())
        }) {
            grouped
                .entry(alarm.rule_id.as_str())
                .and_modify(|(count, latest)| {
                    *count += 1;
                    if compare_alarms(alarm, *latest) == Ordering::Greater {
                        *latest = alarm;
                    }
                })
                .or_insert((1, alarm));
        }

        let mut counts: Vec<AlarmCountByRule> = grouped
            .into_iter()
            .map(|(rule_id, (count, latest))| AlarmCountByRule {
                rule_id: rule_id.to_owned(),
                count,
                status: latest.status,
                last_occurrence: latest.created_at,
            })
            .collect();

        counts.sort_by(|left, right| {
            apply_order(left.last_occurrence.cmp(&right.last_occurrence), query.order)
                .then_with(|| left.rule_id.cmp(&right.rule_id))
        });

        Ok(counts
            .into_iter()
            .skip(page.skip)
            .take(page.limit)
            .collect())
    }

    async fn delete_alarm(&self, alarm_id: &str) -> AppResult<()> {
        self.alarms.write().await.remove(alarm_id);
        Ok(())
    }
}

fn compare_alarms(left: &Alarm, right: &Alarm) -> Ordering {
    left.created_at
        .cmp(&right.created_at)
        .then_with(|| left.id.cmp(&right.id))
}

fn apply_order(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests;
