use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use crate::metrics::{RATE_LIMITED_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{AnalysisJob, AnalyzeRequest};
use crate::normalizer::fallback;
use crate::state::AppState;

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Response {
    REQUEST_TOTAL.inc();

    if payload.user_id.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "user_id is required").into_response();
    }

    // Reject junk before paying for an upstream call
    if payload.image.is_empty() || BASE64.decode(&payload.image).is_err() {
        return (StatusCode::BAD_REQUEST, "image must be base64-encoded").into_response();
    }

    // Admission control, keyed per user per operation
    let limit_key = format!("analyze-{}", payload.user_id);
    if !state.rate_limiter.check_and_admit(&limit_key) {
        RATE_LIMITED_TOTAL.inc();
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Try again later.",
        )
            .into_response();
    }

    let start_time = Instant::now();

    let (response_tx, response_rx) = oneshot::channel();

    let job = AnalysisJob {
        request: payload,
        response_tx,
    };

    if state.batch_tx.send(job).await.is_err() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to queue request").into_response();
    }

    let result = match response_rx.await {
        Ok(result) => result,
        Err(_) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Worker failed to respond")
                .into_response();
        }
    };

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    // Graceful degradation: an upstream failure still produces a
    // populated analysis card, never a blank error screen
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(err) => fallback(&err),
    };

    Json(analysis).into_response()
}
