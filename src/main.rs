//! Liquidation candidate exporter
//!
//! Discovers every Aave v3 Polygon participant from the protocol subgraph,
//! enriches each address with DeBank borrow positions and writes the
//! positions that meet the liquidation risk thresholds to a CSV file.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use liquidation_export_api::{DebankClient, SubgraphClient};
use liquidation_export_core::{ExportConfig, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Print startup banner
    print_banner();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,liquidation_export_core=debug,liquidation_export_api=debug")
        }))
        .init();

    // Load config (EXPORT_CONFIG file + env overrides)
    let config = ExportConfig::from_env()?;
    config.log_config();

    if config.api_key.is_none() {
        warn!("DEBANK_API_KEY not set, portfolio requests are unauthenticated and may fail");
    }

    // API clients
    let timeout = config.enrichment.request_timeout();
    let subgraph = Arc::new(SubgraphClient::new(&config.sources.subgraph_url, timeout)?);
    let debank = Arc::new(DebankClient::new(
        &config.sources.portfolio_url,
        config.api_key.clone(),
        timeout,
    )?);

    let pipeline = Pipeline::from_config(subgraph, debank, &config);

    info!("Starting liquidation export");
    let summary = pipeline.run().await?;
    summary.log();

    if let Some(path) = &summary.output {
        println!(
            "{} liquidatable candidates written to {}",
            summary.candidates,
            path.display()
        );
    }

    Ok(())
}

/// Print startup banner.
fn print_banner() {
    println!(
        r#"
    Liquidation Export v{}
    Aave v3 Polygon -> CSV
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
