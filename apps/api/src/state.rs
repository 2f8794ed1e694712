use telemetry_application::{AlarmService, DeleteByRuleService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub alarm_service: AlarmService,
    pub delete_by_rule_service: DeleteByRuleService,
    /// Page size used by read endpoints when the caller sends no `limit`.
    pub default_page_size: usize,
}
