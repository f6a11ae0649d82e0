//! Pipeline orchestration.
//!
//! Runs discovery, validation, enrichment, filtering and export strictly in
//! sequence as a single run-to-completion batch.

use liquidation_export_api::{AddressPageSource, PortfolioApi};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::address::validate_with_report;
use crate::config::ExportConfig;
use crate::discovery::AddressSource;
use crate::enricher::RiskEnricher;
use crate::error::PipelineError;
use crate::export::ResultExporter;
use crate::filter::LiquidationFilter;
use crate::position::PositionRecord;

/// Counts collected over one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Raw addresses returned by discovery
    pub discovered: usize,
    /// Unique addresses that passed validation
    pub valid: usize,
    /// Raw values dropped by validation
    pub rejected: usize,
    /// Addresses enriched without error
    pub enriched_addresses: usize,
    /// Addresses whose enrichment failed
    pub failed_addresses: usize,
    /// Position records produced by enrichment
    pub records: usize,
    /// Records that passed the risk rule
    pub candidates: usize,
    /// Written export file
    pub output: Option<PathBuf>,
}

impl RunSummary {
    /// Log the summary.
    pub fn log(&self) {
        info!(
            discovered = self.discovered,
            valid = self.valid,
            rejected = self.rejected,
            enriched = self.enriched_addresses,
            failed = self.failed_addresses,
            records = self.records,
            candidates = self.candidates,
            "Run summary"
        );
    }
}

/// The liquidation export pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: AddressSource,
    enricher: RiskEnricher,
    filter: LiquidationFilter,
    exporter: ResultExporter,
}

impl Pipeline {
    /// Create a pipeline from its stages.
    pub fn new(
        source: AddressSource,
        enricher: RiskEnricher,
        filter: LiquidationFilter,
        exporter: ResultExporter,
    ) -> Self {
        Self {
            source,
            enricher,
            filter,
            exporter,
        }
    }

    /// Wire the stages from configuration and API clients.
    pub fn from_config(
        pages: Arc<dyn AddressPageSource>,
        portfolio: Arc<dyn PortfolioApi>,
        config: &ExportConfig,
    ) -> Self {
        Self::new(
            AddressSource::from_config(pages, &config.sources),
            RiskEnricher::new(portfolio, config.sources.protocol_id.clone())
                .with_concurrency(config.enrichment.concurrency),
            LiquidationFilter::from(&config.filter),
            ResultExporter::new(config.output.path.clone()),
        )
    }

    /// Discover the address population, then process it.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        info!("Fetching protocol addresses from indexer...");
        let raw = self.source.fetch_all_addresses().await?;
        self.process(raw).await
    }

    /// Validate, enrich, filter and export an already discovered population.
    pub async fn process(&self, raw: Vec<String>) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary {
            discovered: raw.len(),
            ..Default::default()
        };

        // 1. Validate and canonicalize
        let report = validate_with_report(&raw);
        summary.valid = report.addresses.len();
        summary.rejected = report.rejected_total();
        info!(
            discovered = summary.discovered,
            valid = summary.valid,
            rejected = summary.rejected,
            duplicates = report.duplicates,
            "Validated addresses"
        );

        // 2. Enrich, isolating failures per address
        info!(
            protocol_id = self.enricher.protocol_id(),
            "Fetching borrow positions from portfolio API..."
        );
        let outcomes = self.enricher.enrich_all(&report.addresses).await;

        let mut records: Vec<PositionRecord> = Vec::new();
        for (_, outcome) in outcomes {
            if outcome.is_failed() {
                summary.failed_addresses += 1;
            } else {
                summary.enriched_addresses += 1;
            }
            records.extend(outcome.into_records());
        }
        summary.records = records.len();

        // 3. Filter
        let candidates = self.filter.apply(&records);
        summary.candidates = candidates.len();

        info!(
            total_addresses = summary.discovered,
            total_records = summary.records,
            failed_addresses = summary.failed_addresses,
            "Enrichment finished"
        );
        info!(candidates = summary.candidates, "Found liquidatable candidates");

        // 4. Export
        let path = self.exporter.export(&candidates)?;
        info!(path = %path.display(), "Export written");
        summary.output = Some(path);

        Ok(summary)
    }
}
