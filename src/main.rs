use anyhow::Context as _;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use server::{Store, gateway};

mod config;
mod datamodel;
mod server;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let gateway = gateway::start(&config, Store::seeded())
        .await
        .context("failed to start the gateway")?;

    let port = gateway.local_addr().port();
    tracing::info!("🚀 Server ready at http://localhost:{port}{}", config.http_path);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("shutdown signal received");

    gateway.shutdown().await.context("unclean shutdown")?;
    Ok(())
}
