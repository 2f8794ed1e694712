use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemetry_core::{AppError, AppResult, NonEmptyString};
use telemetry_domain::{
    Alarm, AlarmCountByRule, AlarmCountQuery, AlarmStatus, AlarmTimeRange, AlarmsByRuleQuery,
    DeviceIdFilter, PageWindow, SortOrder,
};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Query string shared by the alarms-by-rule endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AlarmsByRuleParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub order: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub devices: Option<String>,
}

impl AlarmsByRuleParams {
    pub fn count_query(&self) -> AppResult<AlarmCountQuery> {
        Ok(AlarmCountQuery {
            time_range: self.time_range()?,
            order: SortOrder::parse(self.order.as_deref())?,
            device_ids: self.device_ids()?,
        })
    }

    pub fn rule_query(&self, rule_id: String) -> AppResult<AlarmsByRuleQuery> {
        Ok(AlarmsByRuleQuery {
            rule_id: NonEmptyString::new(rule_id)?,
            time_range: self.time_range()?,
            order: SortOrder::parse(self.order.as_deref())?,
            device_ids: self.device_ids()?,
        })
    }

    pub fn read_page(&self, default_limit: usize) -> PageWindow {
        PageWindow::new(
            self.skip.unwrap_or(0),
            self.limit.unwrap_or(default_limit),
        )
    }

    fn device_ids(&self) -> AppResult<DeviceIdFilter> {
        DeviceIdFilter::parse(self.devices.as_deref())
    }

    fn time_range(&self) -> AppResult<AlarmTimeRange> {
        AlarmTimeRange::new(
            parse_timestamp("from", self.from.as_deref())?,
            parse_timestamp("to", self.to.as_deref())?,
        )
    }
}

fn parse_timestamp(name: &str, value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|error| {
                    AppError::Validation(format!("invalid '{name}' timestamp '{value}': {error}"))
                })
        })
        .transpose()
}

/// List envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

/// API representation of an alarm.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlarmResponse {
    pub id: String,
    pub rule_id: String,
    pub device_id: String,
    pub status: AlarmStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<Alarm> for AlarmResponse {
    fn from(value: Alarm) -> Self {
        Self {
            id: value.id,
            rule_id: value.rule_id,
            device_id: value.device_id,
            status: value.status,
            description: value.description,
            created_at: value.created_at,
            modified_at: value.modified_at,
        }
    }
}

/// API representation of one rule's alarm count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlarmCountResponse {
    pub rule_id: String,
    pub count: u64,
    pub status: AlarmStatus,
    pub last_occurrence: DateTime<Utc>,
}

impl From<AlarmCountByRule> for AlarmCountResponse {
    fn from(value: AlarmCountByRule) -> Self {
        Self {
            rule_id: value.rule_id,
            count: value.count,
            status: value.status,
            last_occurrence: value.last_occurrence,
        }
    }
}

/// Body of an accepted delete-by-rule request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteByRuleAcceptedResponse {
    pub operation_id: String,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use telemetry_domain::{PageWindow, SortOrder};

    use super::{AlarmsByRuleParams, DeleteByRuleAcceptedResponse, ItemsResponse};

    #[test]
    fn read_params_fall_back_to_defaults() {
        let params = AlarmsByRuleParams::default();

        let query = params.rule_query("rule-1".to_owned());
        assert!(query.is_ok());
        let query = query.unwrap_or_else(|_| unreachable!());
        assert_eq!(query.order, SortOrder::Asc);
        assert!(query.device_ids.is_empty());
        assert_eq!(query.time_range.from(), None);
        assert_eq!(params.read_page(1000), PageWindow::new(0, 1000));
    }

    #[test]
    fn timestamps_are_parsed_as_rfc3339() {
        let params = AlarmsByRuleParams {
            from: Some("2024-06-01T10:00:00+02:00".to_owned()),
            to: Some("2024-06-02T00:00:00Z".to_owned()),
            order: Some("DESC".to_owned()),
            ..AlarmsByRuleParams::default()
        };

        let query = params.count_query().unwrap_or_default();
        assert_eq!(
            query.time_range.from(),
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).single()
        );
        assert_eq!(query.order, SortOrder::Desc);

        let malformed = AlarmsByRuleParams {
            from: Some("yesterday".to_owned()),
            ..AlarmsByRuleParams::default()
        };
        assert!(malformed.count_query().is_err());
    }

    #[test]
    fn inverted_range_and_blank_rule_are_rejected() {
        let inverted = AlarmsByRuleParams {
            from: Some("2024-06-02T00:00:00Z".to_owned()),
            to: Some("2024-06-01T00:00:00Z".to_owned()),
            ..AlarmsByRuleParams::default()
        };
        assert!(inverted.count_query().is_err());
        assert!(
            AlarmsByRuleParams::default()
                .rule_query("  ".to_owned())
                .is_err()
        );
    }

    #[test]
    fn too_many_devices_is_rejected() {
        let devices = (0..201)
            .map(|index| format!("device-{index}"))
            .collect::<Vec<_>>()
            .join(",");
        let params = AlarmsByRuleParams {
            devices: Some(devices),
            ..AlarmsByRuleParams::default()
        };

        assert!(params.count_query().is_err());

        let with_blank = AlarmsByRuleParams {
            devices: Some(format!("{},", ["device"; 200].join(","))),
            ..AlarmsByRuleParams::default()
        };
        assert!(with_blank.count_query().is_err());
    }

    #[test]
    fn blank_device_list_is_rejected() {
        let params = AlarmsByRuleParams {
            devices: Some(",".to_owned()),
            ..AlarmsByRuleParams::default()
        };

        assert!(params.rule_query("rule-1".to_owned()).is_err());
        assert!(params.count_query().is_err());
    }

    #[test]
    fn responses_use_pascal_case_keys() {
        let accepted = serde_json::to_value(DeleteByRuleAcceptedResponse {
            operation_id: "op-1".to_owned(),
        })
        .unwrap_or_default();
        assert_eq!(accepted, serde_json::json!({ "OperationId": "op-1" }));

        let items = serde_json::to_value(ItemsResponse::<u32> { items: vec![1, 2] })
            .unwrap_or_default();
        assert_eq!(items, serde_json::json!({ "Items": [1, 2] }));
    }
}
