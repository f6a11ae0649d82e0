//! API clients for the liquidation export pipeline.
//!
//! This crate provides HTTP clients for:
//! - The Graph: paginated discovery of every protocol participant
//! - DeBank: per-wallet protocol portfolios with borrow positions and health rates

mod debank;
mod error;
mod subgraph;

pub use debank::{
    BorrowEntry, DebankClient, PortfolioApi, PortfolioDetail, PortfolioItem, ProtocolPortfolio,
    DEFAULT_DEBANK_URL,
};
pub use error::ApiError;
pub use subgraph::{AddressPageSource, SubgraphClient, DEFAULT_SUBGRAPH_URL};

use std::time::Duration;

/// Build the shared HTTP client with a per-request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ApiError::from)
}
