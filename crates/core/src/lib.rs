//! Liquidation export core logic.
//!
//! This crate provides the export pipeline:
//! - Paginated address discovery from an indexing API
//! - Address validation and checksum canonicalization
//! - Per-address borrow position enrichment with failure isolation
//! - Static health factor / debt size risk rule
//! - Atomic CSV export of liquidation candidates

pub mod address;
pub mod config;
mod discovery;
mod enricher;
mod error;
mod export;
mod filter;
mod pipeline;
mod position;

#[cfg(test)]
mod testing;

pub use address::{canonical, validate, validate_one, validate_with_report, Rejection, ValidationReport};
pub use config::{EnrichmentConfig, ExportConfig, FilterConfig, OutputConfig, SourceConfig};
pub use discovery::AddressSource;
pub use enricher::{extract_positions, EnrichmentOutcome, RiskEnricher};
pub use error::{DiscoveryError, ExportError, PipelineError};
pub use export::{ResultExporter, HEADERS};
pub use filter::LiquidationFilter;
pub use pipeline::{Pipeline, RunSummary};
pub use position::{LiquidationCandidate, PositionRecord};
