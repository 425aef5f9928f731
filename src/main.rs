use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use profile_gateway::app;
use profile_gateway::config::Args;
use profile_gateway::state::AppState;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    init_tracing(args.log_json);

    // creating shared state
    let state = Arc::new(AppState::from_args(&args)?);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        upstream = %args.upstream_url,
        cache_ttl_secs = args.cache_ttl,
        rate_limit = args.rate_limit,
        rate_window_secs = args.rate_window,
        "gateway listening"
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
