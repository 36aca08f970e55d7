use crate::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub staging: String,
    pub output: String,
    pub version: String,
}

fn dir_status(present: bool) -> String {
    let status = if present { "ready" } else { "missing" };
    status.to_string()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Storage directories are in place", body = HealthResponse),
        (status = 503, description = "A storage directory is missing", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (staging, output) = state.storage.is_ready().await;
    let healthy = staging && output;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            staging: dir_status(staging),
            output: dir_status(output),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
