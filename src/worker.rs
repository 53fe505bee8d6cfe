use dashmap::DashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use crate::cache::{CacheEntry, make_cache_key};
use crate::error::AnalysisError;
use crate::metrics::{ANALYSIS_FAILURES, CACHE_HITS, CACHE_MISSES, CACHE_SIZE};
use crate::models::{AnalysisJob, GenerateRequest, GenerateResponse};
use crate::normalizer::normalize;

// The model is asked to keep its answer inside one JSON object; the
// normalizer tolerates prose around it.
const ANALYSIS_PROMPT: &str = "You are a sommelier. Look at this wine bottle label and reply \
with a single JSON object using these keys: wineName, wineType, region, vintage, \
grapeVarieties (array of strings), tastingNotes, tasteProfile (object with fruit, citrus, \
floral, herbal, earthy, mineral, spice, oak, sweetness, acidity, tannin, alcohol, body as \
numbers from 0 to 5, plus primaryFlavors and secondaryFlavors arrays), interestingFact, \
and confidence (number from 0 to 1). Omit any key you cannot determine.";

pub async fn analysis_worker(
    mut rx: mpsc::Receiver<AnalysisJob>,
    client: reqwest::Client,
    backend_url: String,
    default_model: String,
    ttl: Duration,
) {
    let cache: DashMap<String, CacheEntry> = DashMap::new();

    println!("Analysis worker started - processing label photos sequentially");

    // keep receiving jobs from the queue
    while let Some(job) = rx.recv().await {
        let model = job
            .request
            .model
            .clone()
            .unwrap_or_else(|| default_model.clone());
        let cache_key = make_cache_key(&job.request, &model);

        // check cache first
        if let Some(entry) = cache.get(&cache_key) {
            if entry.created_at.elapsed() < ttl {
                CACHE_HITS.inc();
                println!("[Worker] Cache HIT");
                let _ = job.response_tx.send(Ok(entry.analysis.clone()));
                continue;
            }
        }
        CACHE_MISSES.inc();
        println!("[Worker] Cache MISS - calling vision model");

        let upstream = GenerateRequest {
            model,
            prompt: ANALYSIS_PROMPT.to_string(),
            images: vec![job.request.image.clone()],
            stream: false,
        };

        let result = call_vision_model(&client, &backend_url, &upstream).await;

        let response = match result {
            Ok(raw) => {
                let analysis = normalize(&raw);
                // Fallback cards (confidence 0) are not cached; a
                // garbled reply should not stick for the whole TTL
                if analysis.confidence > 0.0 {
                    cache.insert(cache_key, CacheEntry {
                        analysis: analysis.clone(),
                        created_at: Instant::now(),
                    });
                    CACHE_SIZE.set(cache.len() as f64);
                } else {
                    ANALYSIS_FAILURES.inc();
                }
                Ok(analysis)
            }
            Err(err) => {
                ANALYSIS_FAILURES.inc();
                println!("[Worker] Upstream call failed: {}", err);
                Err(err)
            }
        };

        // Send result back to handler
        let _ = job.response_tx.send(response);
    }
}

// One upstream round trip: returns the model's raw text reply, or a
// classified error for the fallback path.
async fn call_vision_model(
    client: &reqwest::Client,
    backend_url: &str,
    request: &GenerateRequest,
) -> Result<String, AnalysisError> {
    let res = client
        .post(format!("{}/api/generate", backend_url))
        .json(request)
        .send()
        .await
        .map_err(|e| AnalysisError::Unknown(format!("request failed: {}", e)))?;

    if !res.status().is_success() {
        return Err(AnalysisError::from_status(res.status()));
    }

    let body: GenerateResponse = res
        .json()
        .await
        .map_err(|e| AnalysisError::Unknown(format!("could not decode upstream reply: {}", e)))?;

    Ok(body.response)
}
