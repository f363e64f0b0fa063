//! Binary entrypoint for the xhub HTTP server.
//!
//! Configuration comes from `XHUB_*` environment variables (see
//! [`xhub_server::config`]); a `.env` file in the working directory is loaded
//! first. Log filtering follows `RUST_LOG`.

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use xhub_server::config::ServerConfig;
use xhub_server::router::build_router;
use xhub_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xhub=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(&config).context("failed to open resource store")?;
    let app = build_router(state);

    tracing::info!(
        addr = %config.addr,
        base_url = %config.base_url,
        write_mode = ?config.write_mode,
        "xhub server starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
