use rust_quote_gateway::api::{run_server, AppState};
use rust_quote_gateway::quotes::coinmarketcap::CoinMarketCapClient;
use rust_quote_gateway::{AppConfig, PriceAggregator};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Quote Gateway...");

    // Load Configuration
    let config = AppConfig::load()?;
    info!("Loaded Configuration: {:?}", config);

    let provider = Arc::new(CoinMarketCapClient::from_config(&config)?);
    let aggregator = PriceAggregator::new(provider, &config);
    info!(
        "Reporting prices in {} ({:?} fan-out)",
        config.target_currencies.join(", "),
        config.fan_out
    );

    let app_state = Arc::new(AppState { aggregator });

    // Start API Server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    run_server(listener, app_state).await?;

    Ok(())
}
