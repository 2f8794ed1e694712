use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use telemetry_application::AlarmRepository;
use telemetry_core::NonEmptyString;
use telemetry_domain::{
    Alarm, AlarmCountQuery, AlarmStatus, AlarmTimeRange, AlarmsByRuleQuery, DeviceIdFilter,
    PageWindow, SortOrder,
};

use super::InMemoryAlarmRepository;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

fn alarm(id: &str, rule_id: &str, device_id: &str, minutes: i64, status: AlarmStatus) -> Alarm {
    let created_at = base_time() + TimeDelta::minutes(minutes);
    Alarm {
        id: id.to_owned(),
        rule_id: rule_id.to_owned(),
        device_id: device_id.to_owned(),
        status,
        description: None,
        created_at,
        modified_at: created_at,
    }
}

fn rule_query(rule_id: &str, order: SortOrder) -> AlarmsByRuleQuery {
    AlarmsByRuleQuery {
        rule_id: NonEmptyString::new(rule_id).unwrap_or_else(|_| unreachable!()),
        time_range: AlarmTimeRange::default(),
        order,
        device_ids: DeviceIdFilter::default(),
    }
}

async fn seeded_repository() -> InMemoryAlarmRepository {
    let repository = InMemoryAlarmRepository::new();
    repository
        .insert_alarm(alarm("a-1", "rule-a", "device-1", 0, AlarmStatus::Open))
        .await;
    repository
        .insert_alarm(alarm("a-2", "rule-a", "device-2", 10, AlarmStatus::Closed))
        .await;
    repository
        .insert_alarm(alarm("a-3", "rule-a", "device-1", 20, AlarmStatus::Open))
        .await;
    repository
        .insert_alarm(alarm("b-1", "rule-b", "device-1", 30, AlarmStatus::Acknowledged))
        .await;
    repository
}

#[tokio::test]
async fn list_alarms_by_rule_sorts_and_pages() {
    let repository = seeded_repository().await;

    let ascending = repository
        .list_alarm_ids_by_rule(&rule_query("rule-a", SortOrder::Asc), PageWindow::new(0, 10))
        .await;
    assert_eq!(
        ascending.unwrap_or_default(),
        vec!["a-1".to_owned(), "a-2".to_owned(), "a-3".to_owned()]
    );

    let descending = repository
        .list_alarms_by_rule(&rule_query("rule-a", SortOrder::Desc), PageWindow::new(1, 1))
        .await;
    assert!(descending.is_ok());
    let descending = descending.unwrap_or_default();
    assert_eq!(descending.len(), 1);
    assert_eq!(descending[0].id, "a-2");
}

#[tokio::test]
async fn list_alarms_by_rule_applies_time_and_device_filters() {
    let repository = seeded_repository().await;

    let time_range = AlarmTimeRange::new(
        Some(base_time() + TimeDelta::minutes(5)),
        Some(base_time() + TimeDelta::minutes(25)),
    )
    .unwrap_or_default();
    let query = AlarmsByRuleQuery {
        time_range,
        device_ids: DeviceIdFilter::new(vec!["device-1".to_owned()]).unwrap_or_default(),
        ..rule_query("rule-a", SortOrder::Asc)
    };

    let listed = repository
        .list_alarm_ids_by_rule(&query, PageWindow::new(0, 10))
        .await;
    assert_eq!(listed.unwrap_or_default(), vec!["a-3".to_owned()]);
}

#[tokio::test]
async fn count_alarms_by_rule_groups_with_latest_status() {
    let repository = seeded_repository().await;

    let counts = repository
        .count_alarms_by_rule(&AlarmCountQuery::default(), PageWindow::new(0, 10))
        .await;
    assert!(counts.is_ok());
    let counts = counts.unwrap_or_default();
    assert_eq!(counts.len(), 2);

    assert_eq!(counts[0].rule_id, "rule-a");
    assert_eq!(counts[0].count, 3);
    assert_eq!(counts[0].status, AlarmStatus::Open);
    assert_eq!(counts[0].last_occurrence, base_time() + TimeDelta::minutes(20));

    assert_eq!(counts[1].rule_id, "rule-b");
    assert_eq!(counts[1].count, 1);
    assert_eq!(counts[1].status, AlarmStatus::Acknowledged);

    let descending = repository
        .count_alarms_by_rule(
            &AlarmCountQuery {
                order: SortOrder::Desc,
                ..AlarmCountQuery::default()
            },
            PageWindow::new(0, 1),
        )
        .await;
    let descending = descending.unwrap_or_default();
    assert_eq!(descending.len(), 1);
    assert_eq!(descending[0].rule_id, "rule-b");
}

#[tokio::test]
async fn delete_alarm_is_idempotent() {
    let repository = seeded_repository().await;

    assert!(repository.delete_alarm("a-2").await.is_ok());
    assert!(repository.delete_alarm("a-2").await.is_ok());
    assert!(repository.delete_alarm("never-existed").await.is_ok());

    let remaining = repository
        .list_alarm_ids_by_rule(&rule_query("rule-a", SortOrder::Asc), PageWindow::new(0, 10))
        .await;
    assert_eq!(
        remaining.unwrap_or_default(),
        vec!["a-1".to_owned(), "a-3".to_owned()]
    );
}
