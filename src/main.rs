//! Sentiment Gateway — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::sync::Arc;

use sentiment_gateway::api::{create_router, AppState};
use sentiment_gateway::config::Settings;
use sentiment_gateway::scorer::HttpScorer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sentiment_gateway=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env();
    tracing::info!(
        upstream = %settings.upstream_url,
        connect_timeout_ms = settings.connect_timeout.as_millis() as u64,
        read_timeout_ms = settings.read_timeout.as_millis() as u64,
        "starting sentiment gateway"
    );

    let scorer = Arc::new(HttpScorer::new(&settings)?);
    let state = AppState::new(scorer);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
