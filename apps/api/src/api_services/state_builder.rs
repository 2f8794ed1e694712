use std::sync::Arc;

use sqlx::PgPool;
use telemetry_application::{
    AlarmRepository, AlarmService, DeleteByRuleConfig, DeleteByRuleService,
    DeleteStatusRepository,
};
use telemetry_infrastructure::{
    InMemoryAlarmRepository, InMemoryDeleteStatusRepository, PostgresAlarmRepository,
    PostgresDeleteStatusRepository,
};

use crate::state::AppState;

/// Storage adapters selected by `STORAGE_BACKEND`.
pub struct StorageRepositories {
    alarm_repository: Arc<dyn AlarmRepository>,
    status_repository: Arc<dyn DeleteStatusRepository>,
}

impl StorageRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            alarm_repository: Arc::new(PostgresAlarmRepository::new(pool.clone())),
            status_repository: Arc::new(PostgresDeleteStatusRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            alarm_repository: Arc::new(InMemoryAlarmRepository::new()),
            status_repository: Arc::new(InMemoryDeleteStatusRepository::new()),
        }
    }
}

pub fn build_app_state(repositories: StorageRepositories, config: DeleteByRuleConfig) -> AppState {
    let alarm_service = AlarmService::new(repositories.alarm_repository.clone());
    let delete_by_rule_service = DeleteByRuleService::new(
        repositories.alarm_repository,
        repositories.status_repository,
        config,
    );

    AppState {
        alarm_service,
        default_page_size: delete_by_rule_service.config().page_size,
        delete_by_rule_service,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use telemetry_application::DeleteByRuleConfig;

    use super::{StorageRepositories, build_app_state};

    #[test]
    fn read_paging_follows_delete_page_size() {
        let config = DeleteByRuleConfig::new(3, 50, 250, TimeDelta::minutes(10))
            .unwrap_or_else(|_| unreachable!());

        let state = build_app_state(StorageRepositories::in_memory(), config);

        assert_eq!(state.default_page_size, 250);
        assert_eq!(state.delete_by_rule_service.config(), &config);
    }
}
