//! Application services and ports.

#![forbid(unsafe_code)]

mod alarm_ports;
mod alarm_service;
mod delete_by_rule_service;

pub use alarm_ports::{AlarmRepository, DeleteStatusRepository};
pub use alarm_service::AlarmService;
pub use delete_by_rule_service::{
    DeleteByRuleConfig, DeleteByRuleHandle, DeleteByRuleRequest, DeleteByRuleService,
};
