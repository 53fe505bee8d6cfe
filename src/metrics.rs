use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("vinolens_requests_total", "Total number of analyze requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("vinolens_rate_limited_total", "Requests rejected by admission control").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("vinolens_cache_hits_total", "Total analysis cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("vinolens_cache_misses_total", "Total analysis cache misses").unwrap();
    pub static ref ANALYSIS_FAILURES: Counter =
        register_counter!("vinolens_analysis_failures_total", "Upstream analysis calls that failed").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "vinolens_request_latency_seconds",
        "Analyze request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("vinolens_cache_size", "Current number of cached analyses").unwrap();
}
