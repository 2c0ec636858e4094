use anyhow::Context;
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinema_booking::{
    config::{Config, LogFormat},
    router, AppState,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;

    let json = config.app.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.app.rust_log))
        .with((!json).then(fmt::layer))
        .with(json.then(|| fmt::layer().json()))
        .init();

    info!(
        "Starting {} booking API ({})",
        config.app.brand, config.app.environment
    );

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .context("invalid HOST/PORT")?;

    let state = AppState::new(config).context("failed to build notification sender")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
