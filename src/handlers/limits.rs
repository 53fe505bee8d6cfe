use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use std::sync::Arc;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetLimitRequest {
    pub user_id: String,
}

// Admin convenience: hand a user a fresh rate-limit window
pub async fn reset_limit_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetLimitRequest>,
) -> impl IntoResponse {
    state.rate_limiter.reset(&format!("analyze-{}", payload.user_id));
    Json(serde_json::json!({ "status": "ok" }))
}
