use clap::Parser;
use std::time::Duration;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "profile-gateway")]
#[command(about = "Caching, rate-limited proxy for GitHub user lookups")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "GATEWAY_PORT", default_value_t = 8080)]
    pub port: u16,

    // Base url of the profile API
    #[arg(short, long, env = "GATEWAY_UPSTREAM_URL", default_value = "https://api.github.com")]
    pub upstream_url: String,

    // User-Agent sent upstream
    #[arg(long, env = "GATEWAY_USER_AGENT", default_value = "github-user-search-app")]
    pub user_agent: String,

    // Optional personal access token, read once at startup
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    // Cache TTL in seconds
    #[arg(short, long, env = "GATEWAY_CACHE_TTL", default_value_t = 600)]
    pub cache_ttl: u64,

    // Rate limit max requests per window
    #[arg(long, env = "GATEWAY_RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: usize,

    // Rate limit window in seconds
    #[arg(long, env = "GATEWAY_RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Emit logs as JSON lines
    #[arg(long, env = "GATEWAY_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Args {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }
}
