mod health;
mod metrics;
mod analyze;
mod limits;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use analyze::analyze_handler;
pub use limits::reset_limit_handler;
