use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

mod cache;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod normalizer;
mod rate_limit;
mod state;
mod worker;

use config::Args;
use handlers::{analyze_handler, health_handler, metrics_handler, reset_limit_handler};
use models::AnalysisJob;
use rate_limit::RateLimiter;
use state::AppState;
use worker::analysis_worker;

#[tokio::main]
async fn main() {
    // parse cli arguments
    let args = Args::parse();
    let (batch_tx, batch_rx) = mpsc::channel::<AnalysisJob>(100);

    // creating shared state
    let state = Arc::new(AppState {
        rate_limiter: RateLimiter::new(args.rate_limit, Duration::from_secs(args.rate_window)),
        batch_tx,
    });

    // spawn the background worker that talks to the vision model
    let worker_client = reqwest::Client::new();
    let worker_backend = args.backend.clone();
    let worker_model = args.model.clone();
    let worker_ttl = Duration::from_secs(args.cache_ttl);

    tokio::spawn(async move {
        analysis_worker(batch_rx, worker_client, worker_backend, worker_model, worker_ttl).await;
    });

    // creating the router with routes
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/limits/reset", post(reset_limit_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    println!("vinolens running on http://localhost:{}", args.port);
    println!("Forwarding labels to {} (model: {})", args.backend, args.model);
    println!("Cache TTL: {} seconds", args.cache_ttl);
    println!(
        "Rate limit: {} requests per {} seconds per user",
        args.rate_limit, args.rate_window
    );
    axum::serve(listener, app).await.unwrap();
}
