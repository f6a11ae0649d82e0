//! Per-address enrichment through the portfolio API.

use alloy::primitives::Address;
use futures::stream::{self, StreamExt};
use liquidation_export_api::{PortfolioApi, ProtocolPortfolio};
use std::pin::pin;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::position::PositionRecord;

/// Log progress every this many enriched addresses.
const PROGRESS_INTERVAL: usize = 500;

/// Result of enriching one address. Failures stay attached to the address
/// instead of propagating.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// Zero or more positions in the tracked protocol
    Records(Vec<PositionRecord>),
    /// The request or response decoding failed
    Failed { reason: String },
}

impl EnrichmentOutcome {
    /// Records of a successful outcome, empty on failure.
    pub fn records(&self) -> &[PositionRecord] {
        match self {
            Self::Records(records) => records,
            Self::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn into_records(self) -> Vec<PositionRecord> {
        match self {
            Self::Records(records) => records,
            Self::Failed { .. } => Vec::new(),
        }
    }
}

/// Fetches and normalizes borrow positions for the tracked protocol.
#[derive(Debug, Clone)]
pub struct RiskEnricher {
    api: Arc<dyn PortfolioApi>,
    protocol_id: String,
    concurrency: usize,
}

impl RiskEnricher {
    /// Create an enricher for `protocol_id`. Requests run one at a time.
    pub fn new(api: Arc<dyn PortfolioApi>, protocol_id: impl Into<String>) -> Self {
        Self {
            api,
            protocol_id: protocol_id.into(),
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` requests in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn protocol_id(&self) -> &str {
        &self.protocol_id
    }

    /// Enrich one address. Never fails: errors become [`EnrichmentOutcome::Failed`].
    pub async fn enrich(&self, address: Address) -> EnrichmentOutcome {
        match self.api.protocol_list(address).await {
            Ok(protocols) => {
                let records = extract_positions(address, &protocols, &self.protocol_id);
                debug!(
                    address = %address,
                    records = records.len(),
                    "Enriched address"
                );
                EnrichmentOutcome::Records(records)
            }
            Err(e) => {
                warn!(
                    address = %address,
                    error = %e,
                    auth = e.is_auth(),
                    "Enrichment failed, skipping address"
                );
                EnrichmentOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Enrich many addresses with bounded concurrency.
    ///
    /// Output order matches input order and every outcome carries its address.
    #[instrument(skip(self, addresses), fields(count = addresses.len(), concurrency = self.concurrency))]
    pub async fn enrich_all(&self, addresses: &[Address]) -> Vec<(Address, EnrichmentOutcome)> {
        let mut outcomes = pin!(stream::iter(addresses.iter().copied())
            .map(|address| async move { (address, self.enrich(address).await) })
            .buffered(self.concurrency));

        let mut results = Vec::with_capacity(addresses.len());
        let mut failed = 0;

        while let Some((address, outcome)) = outcomes.next().await {
            if outcome.is_failed() {
                failed += 1;
            }
            results.push((address, outcome));

            if results.len() % PROGRESS_INTERVAL == 0 {
                info!(
                    done = results.len(),
                    total = addresses.len(),
                    failed = failed,
                    "Enrichment progress"
                );
            }
        }

        results
    }
}

/// Map a portfolio response to records for one protocol.
///
/// A wallet without the protocol yields no records. Items without a borrow
/// list (pure supply positions) are skipped.
pub fn extract_positions(
    address: Address,
    protocols: &[ProtocolPortfolio],
    protocol_id: &str,
) -> Vec<PositionRecord> {
    let Some(protocol) = protocols.iter().find(|p| p.id == protocol_id) else {
        return Vec::new();
    };

    protocol
        .portfolio_item_list
        .iter()
        .filter_map(|item| item.detail.as_ref()?.borrow_list.as_ref())
        .flatten()
        .map(|entry| PositionRecord::from_borrow(address, entry))
        .collect()
}
