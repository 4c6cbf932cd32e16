//! Binary entrypoint for the Galeria admin panel.
use anyhow::Context;
use galeria_api::{run, ServerConfig};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = ServerConfig::from_env().context("panel misconfigured")?;
    run(config).await.context("panel server failed")
}
