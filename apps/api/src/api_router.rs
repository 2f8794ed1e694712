use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let alarms_by_rule_routes = Router::new()
        .route(
            "/v1/alarmsbyrule",
            get(handlers::alarms_by_rule::list_alarm_counts_handler),
        )
        .route(
            "/v1/alarmsbyrule/{rule_id}",
            get(handlers::alarms_by_rule::list_alarms_by_rule_handler),
        )
        .route(
            "/v1/alarmsbyrule/delete/{rule_id}",
            post(handlers::alarms_by_rule::delete_alarms_by_rule_handler),
        )
        .route(
            "/v1/alarmsbyrule/deletestatus/{operation_id}",
            get(handlers::alarms_by_rule::delete_status_handler),
        );

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(alarms_by_rule_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
