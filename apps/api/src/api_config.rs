use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::TimeDelta;
use telemetry_application::DeleteByRuleConfig;
use telemetry_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendConfig {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub storage: StorageBackendConfig,
    pub delete_by_rule: DeleteByRuleConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let storage = match lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => StorageBackendConfig::Postgres {
                database_url: required_non_empty(&lookup, "DATABASE_URL")?,
            },
            "memory" => StorageBackendConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "STORAGE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let defaults = DeleteByRuleConfig::default();
        let stale_seconds = parse_or_default(
            &lookup,
            "ALARMS_DELETE_STATUS_STALE_SECONDS",
            defaults.status_stale_after.num_seconds(),
        )?;
        let status_stale_after = TimeDelta::try_seconds(stale_seconds).ok_or_else(|| {
            AppError::Validation(format!(
                "ALARMS_DELETE_STATUS_STALE_SECONDS value {stale_seconds} is out of range"
            ))
        })?;

        let delete_by_rule = DeleteByRuleConfig::new(
            parse_or_default(
                &lookup,
                "ALARMS_MAX_DELETE_ATTEMPTS",
                defaults.max_delete_attempts,
            )?,
            parse_or_default(
                &lookup,
                "ALARMS_DELETE_CHECKPOINT_INTERVAL",
                defaults.checkpoint_interval,
            )?,
            parse_or_default(&lookup, "ALARMS_DEFAULT_PAGE_SIZE", defaults.page_size)?,
            status_stale_after,
        )?;

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            storage,
            delete_by_rule,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
