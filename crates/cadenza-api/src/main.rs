use anyhow::Context;
use cadenza_api::{setup, telemetry};
use cadenza_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (_state, router) = setup::initialize_app(&config)
        .await
        .context("Failed to initialize application")?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
