//! Configuration for the liquidation export run.
//!
//! This module provides:
//! - Risk thresholds, output path and API endpoints ([`ExportConfig`])
//! - Environment variable names and `${VAR}` expansion ([`env`])

pub mod env;
mod export;

pub use export::{EnrichmentConfig, ExportConfig, FilterConfig, OutputConfig, SourceConfig};
