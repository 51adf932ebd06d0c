use anyhow::Context;
use order_server::core::{config::Config, logger, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    logger::init_logger(&config.log_level, config.log_json);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Order server starting"
    );

    if let Err(e) = server::run(config).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
