use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use telemetry_application::DeleteByRuleRequest;
use telemetry_core::{AppError, NonEmptyString};
use telemetry_domain::DeleteStatus;
use tracing::warn;
use uuid::Uuid;

use crate::dto::{
    AlarmCountResponse, AlarmResponse, AlarmsByRuleParams, DeleteByRuleAcceptedResponse,
    ItemsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_alarm_counts_handler(
    State(state): State<AppState>,
    Query(params): Query<AlarmsByRuleParams>,
) -> ApiResult<Json<ItemsResponse<AlarmCountResponse>>> {
    let query = params.count_query().inspect_err(log_rejected_query)?;

    let items = state
        .alarm_service
        .count_by_rule(&query, params.read_page(state.default_page_size))
        .await?
        .into_iter()
        .map(AlarmCountResponse::from)
        .collect();

    Ok(Json(ItemsResponse { items }))
}

pub async fn list_alarms_by_rule_handler(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    Query(params): Query<AlarmsByRuleParams>,
) -> ApiResult<Json<ItemsResponse<AlarmResponse>>> {
    let query = params.rule_query(rule_id).inspect_err(log_rejected_query)?;

    let items = state
        .alarm_service
        .list_by_rule(&query, params.read_page(state.default_page_size))
        .await?
        .into_iter()
        .map(AlarmResponse::from)
        .collect();

    Ok(Json(ItemsResponse { items }))
}

/// Starts a background delete and answers before it finishes.
pub async fn delete_alarms_by_rule_handler(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    Query(params): Query<AlarmsByRuleParams>,
) -> ApiResult<(StatusCode, Json<DeleteByRuleAcceptedResponse>)> {
    let query = params.rule_query(rule_id).inspect_err(log_rejected_query)?;

    let handle = state
        .delete_by_rule_service
        .start_delete_by_rule(DeleteByRuleRequest {
            operation_id: NonEmptyString::new(Uuid::new_v4().to_string())?,
            query,
            skip: params.skip.unwrap_or(0),
            limit: params.limit,
        });

    Ok((
        StatusCode::ACCEPTED,
        Json(DeleteByRuleAcceptedResponse {
            operation_id: handle.operation_id().to_owned(),
        }),
    ))
}

pub async fn delete_status_handler(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Json<DeleteStatus> {
    Json(
        state
            .delete_by_rule_service
            .delete_status(operation_id.as_str())
            .await,
    )
}

fn log_rejected_query(error: &AppError) {
    warn!(error = %error, "rejected alarms by rule query");
}
