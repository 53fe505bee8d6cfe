use tokio::sync::mpsc;
use crate::models::AnalysisJob;
use crate::rate_limit::RateLimiter;

// App's shared state. The analysis cache lives inside the worker,
// which is the only component that reads or fills it.
pub struct AppState {
    pub rate_limiter: RateLimiter, // per-user admission control
    pub batch_tx: mpsc::Sender<AnalysisJob>,
}
