use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemetry_core::{AppError, AppResult};

/// Lifecycle state of one alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmStatus {
    /// Alarm was raised and nobody has looked at it yet.
    Open,
    /// An operator acknowledged the alarm.
    Acknowledged,
    /// Alarm was resolved.
    Closed,
}

impl AlarmStatus {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Acknowledged => "acknowledged",
            Self::Closed => "closed",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "open" => Ok(Self::Open),
            "acknowledged" => Ok(Self::Acknowledged),
            "closed" => Ok(Self::Closed),
            _ => Err(AppError::Validation(format!(
                "unknown alarm status '{value}'"
            ))),
        }
    }
}

/// Alarm raised by a rule for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Stable alarm identifier.
    pub id: String,
    /// Rule that raised the alarm.
    pub rule_id: String,
    /// Device the telemetry came from.
    pub device_id: String,
    /// Current lifecycle state.
    pub status: AlarmStatus,
    /// Optional human readable description.
    pub description: Option<String>,
    /// When the alarm was raised.
    pub created_at: DateTime<Utc>,
    /// Last time the alarm changed.
    pub modified_at: DateTime<Utc>,
}

/// Aggregated alarm count for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmCountByRule {
    /// Rule identifier.
    pub rule_id: String,
    /// Number of matching alarms.
    pub count: u64,
    /// Status of the most recent matching alarm.
    pub status: AlarmStatus,
    /// Creation time of the most recent matching alarm.
    pub last_occurrence: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::AlarmStatus;

    #[test]
    fn alarm_status_parses_storage_values() {
        for status in [
            AlarmStatus::Open,
            AlarmStatus::Acknowledged,
            AlarmStatus::Closed,
        ] {
            let parsed = AlarmStatus::parse(status.as_str());
            assert!(matches!(parsed, Ok(value) if value == status));
        }
    }

    #[test]
    fn alarm_status_rejects_unknown_value() {
        assert!(AlarmStatus::parse("snoozed").is_err());
    }
}
