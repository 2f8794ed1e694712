use axum::Json;

use crate::dto::HealthResponse;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::health_handler;

    #[tokio::test]
    async fn reports_ok() {
        let response = health_handler().await;
        assert_eq!(response.0.status, "ok");
    }
}
