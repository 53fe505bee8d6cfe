use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "vinolens")]
#[command(about = "Rate-limiting gateway for AI wine-label analysis")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Vision model backend (Ollama-compatible /api/generate)
    #[arg(short, long, default_value = "http://localhost:11434")]
    pub backend: String,

    // Vision model to run against the label photo
    #[arg(short, long, default_value = "llava")]
    pub model: String,

    // Analysis cache TTL in seconds
    #[arg(short, long, default_value_t = 300)]
    pub cache_ttl: u64,

    // Rate limit max requests per window, per user
    #[arg(long, default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,
}
