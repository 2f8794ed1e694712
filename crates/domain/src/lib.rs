//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod alarm;
mod delete_status;
mod query;

pub use alarm::{Alarm, AlarmCountByRule, AlarmStatus};
pub use delete_status::{DeleteStatus, DeleteStatusKind, effective_delete_status};
pub use query::{
    AlarmCountQuery, AlarmTimeRange, AlarmsByRuleQuery, DeviceIdFilter, MAX_DEVICE_IDS,
    PageWindow, SortOrder,
};
