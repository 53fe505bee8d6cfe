use sha2::{Digest, Sha256};
use std::time::Instant;
use crate::models::{AnalyzeRequest, WineAnalysis};

// Cached analysis with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub analysis: WineAnalysis,
    pub created_at: Instant,
}

// Cache key: hash of model + image payload (same label photo and
// model produce the same analysis)
pub fn make_cache_key(req: &AnalyzeRequest, model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model);
    hasher.update(&req.image);
    format!("{:x}", hasher.finalize())
}
