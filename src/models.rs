use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use crate::error::AnalysisError;

// Inbound analyze request: one label photo per call
#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub user_id: String,
    pub image: String, // base64-encoded photo bytes
    #[serde(default)]
    pub media_type: Option<String>, // carried for collaborators, unused here
    #[serde(default)]
    pub model: Option<String>, // per-request model override
}

// Ollama API request format (vision models take base64 images)
#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<String>,
    #[serde(default)]
    pub stream: bool,
}

// Ollama API response format
#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateResponse {
    pub model: String,
    pub response: String,
}

// Structured sensory scores, each 0-5 as produced by the model
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TasteProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fruit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citrus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floral: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub herbal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earthy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mineral: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spice: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oak: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweetness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tannin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alcohol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_flavors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_flavors: Vec<String>,
}

// Normalized analysis returned to the client. Every field except
// confidence and analysis_date is independently optional - partial
// information is a normal outcome, not an error.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WineAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wine_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vintage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grape_varieties: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasting_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taste_profile: Option<TasteProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interesting_fact: Option<String>,
    pub confidence: f64,
    pub analysis_date: String, // RFC 3339, always set by the normalizer
}

// Queued job - holds request + one-time channel to send back the result
pub struct AnalysisJob {
    pub request: AnalyzeRequest,
    pub response_tx: oneshot::Sender<Result<WineAnalysis, AnalysisError>>,
}
