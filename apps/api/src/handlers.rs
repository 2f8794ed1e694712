pub mod alarms_by_rule;
pub mod health;
