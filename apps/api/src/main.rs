//! Alarms API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod state;

use telemetry_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, StorageBackendConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{StorageRepositories, build_app_state, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let repositories = match &config.storage {
        StorageBackendConfig::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            StorageRepositories::postgres(pool)
        }
        StorageBackendConfig::Memory => {
            if config.migrate_only {
                return Err(AppError::Validation(
                    "migrate requires STORAGE_BACKEND=postgres".to_owned(),
                ));
            }

            info!("using in-memory alarm storage");
            StorageRepositories::in_memory()
        }
    };

    let app = build_router(build_app_state(repositories, config.delete_by_rule));

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "telemetry-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
