//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_alarm_repository;
mod in_memory_delete_status_repository;
mod postgres_alarm_repository;
mod postgres_delete_status_repository;

pub use in_memory_alarm_repository::InMemoryAlarmRepository;
pub use in_memory_delete_status_repository::InMemoryDeleteStatusRepository;
pub use postgres_alarm_repository::PostgresAlarmRepository;
pub use postgres_delete_status_repository::PostgresDeleteStatusRepository;
