//! Filter and paging value types shared by alarm reads and delete-by-rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemetry_core::{AppError, AppResult, NonEmptyString};

/// Maximum number of device ids accepted in one filter.
///
/// Matches the storage backend limit for `IN`-style predicates.
pub const MAX_DEVICE_IDS: usize = 200;

/// Sort direction applied to alarm creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    /// Returns stable query value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parses an optional query value, defaulting to ascending.
    pub fn parse(value: Option<&str>) -> AppResult<Self> {
        let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::Asc);
        };

        if value.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(AppError::Validation(format!(
                "order must be 'asc' or 'desc', got '{value}'"
            )))
        }
    }
}

/// Optional inclusive bounds on alarm creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AlarmTimeRange {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl AlarmTimeRange {
    /// Creates a validated time range.
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> AppResult<Self> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(AppError::Validation(format!(
                "time range start '{from}' is after its end '{to}'"
            )));
        }

        Ok(Self { from, to })
    }

    /// Returns the lower bound.
    #[must_use]
    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    /// Returns the upper bound.
    #[must_use]
    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    /// Returns whether the timestamp falls inside the range.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| timestamp >= from) && self.to.is_none_or(|to| timestamp <= to)
    }
}

/// Device allow-list. Empty means every device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DeviceIdFilter(Vec<String>);

impl DeviceIdFilter {
    /// Creates a validated filter from individual ids.
    ///
    /// Fails on more than `MAX_DEVICE_IDS` ids or on a blank id.
    pub fn new(device_ids: Vec<String>) -> AppResult<Self> {
        if device_ids.len() > MAX_DEVICE_IDS {
            return Err(AppError::Validation(format!(
                "the number of devices cannot exceed {MAX_DEVICE_IDS}"
            )));
        }

        if device_ids.iter().any(|device_id| device_id.trim().is_empty()) {
            return Err(AppError::Validation(
                "device ids must not be empty".to_owned(),
            ));
        }

        Ok(Self(device_ids))
    }

    /// Parses a comma-separated device list.
    ///
    /// A missing or blank list means every device. Every entry counts toward
    /// the limit, and a blank entry is rejected rather than dropped.
    pub fn parse(devices: Option<&str>) -> AppResult<Self> {
        let Some(devices) = devices.filter(|value| !value.trim().is_empty()) else {
            return Ok(Self::default());
        };

        Self::new(
            devices
                .split(',')
                .map(|device_id| device_id.trim().to_owned())
                .collect(),
        )
    }

    /// Returns the allowed device ids.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        self.0.as_slice()
    }

    /// Returns whether the filter lets every device through.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether the device passes the filter.
    #[must_use]
    pub fn allows(&self, device_id: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|allowed| allowed == device_id)
    }
}

/// Offset/limit window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    /// Rows skipped before the page starts.
    pub skip: usize,
    /// Maximum rows in the page.
    pub limit: usize,
}

impl PageWindow {
    /// Creates a page window.
    #[must_use]
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }
}

/// Filter selecting alarms raised by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlarmsByRuleQuery {
    /// Rule identifier.
    pub rule_id: NonEmptyString,
    /// Creation time bounds.
    pub time_range: AlarmTimeRange,
    /// Sort direction.
    pub order: SortOrder,
    /// Device allow-list.
    pub device_ids: DeviceIdFilter,
}

/// Filter for alarm counts grouped by rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AlarmCountQuery {
    /// Creation time bounds.
    pub time_range: AlarmTimeRange,
    /// Sort direction applied to each rule's last occurrence.
    pub order: SortOrder,
    /// Device allow-list.
    pub device_ids: DeviceIdFilter,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{AlarmTimeRange, DeviceIdFilter, MAX_DEVICE_IDS, SortOrder};

    #[test]
    fn sort_order_defaults_to_ascending() {
        assert!(matches!(SortOrder::parse(None), Ok(SortOrder::Asc)));
        assert!(matches!(SortOrder::parse(Some("")), Ok(SortOrder::Asc)));
        assert!(matches!(SortOrder::parse(Some("DESC")), Ok(SortOrder::Desc)));
        assert!(SortOrder::parse(Some("sideways")).is_err());
    }

    #[test]
    fn time_range_rejects_inverted_bounds() {
        let now = Utc::now();
        assert!(AlarmTimeRange::new(Some(now), Some(now - Duration::hours(1))).is_err());

        let range = AlarmTimeRange::new(Some(now - Duration::hours(1)), Some(now));
        assert!(range.is_ok());
        let range = range.unwrap_or_default();
        assert!(range.contains(now));
        assert!(!range.contains(now + Duration::seconds(1)));
    }

    #[test]
    fn device_filter_parses_comma_separated_ids() {
        let filter = DeviceIdFilter::parse(Some("device-1, device-2"));
        assert!(filter.is_ok());
        let filter = filter.unwrap_or_default();
        assert_eq!(filter.as_slice(), ["device-1", "device-2"]);
        assert!(filter.allows("device-2"));
        assert!(!filter.allows("device-3"));
    }

    #[test]
    fn device_filter_rejects_blank_entries() {
        assert!(DeviceIdFilter::parse(Some(",")).is_err());
        assert!(DeviceIdFilter::parse(Some(" , ")).is_err());
        assert!(DeviceIdFilter::parse(Some("device-1,,device-2")).is_err());
        assert!(DeviceIdFilter::parse(Some("device-1,")).is_err());
        assert!(DeviceIdFilter::new(vec!["device-1".to_owned(), String::new()]).is_err());
    }

    #[test]
    fn empty_device_filter_allows_everything() {
        let filter = DeviceIdFilter::parse(None).unwrap_or_default();
        assert!(filter.is_empty());
        assert!(filter.allows("anything"));

        let blank = DeviceIdFilter::parse(Some("  "));
        assert!(blank.is_ok());
        assert!(blank.unwrap_or_default().is_empty());
    }

    #[test]
    fn device_filter_enforces_limit() {
        let at_limit = (0..MAX_DEVICE_IDS)
            .map(|index| format!("device-{index}"))
            .collect::<Vec<_>>()
            .join(",");
        assert!(DeviceIdFilter::parse(Some(at_limit.as_str())).is_ok());

        let over_limit = format!("{at_limit},one-more");
        assert!(DeviceIdFilter::parse(Some(over_limit.as_str())).is_err());

        let blank_in_overflow = format!("{at_limit},");
        assert!(DeviceIdFilter::parse(Some(blank_in_overflow.as_str())).is_err());
    }
}
