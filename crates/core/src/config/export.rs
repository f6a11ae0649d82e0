//! Export run configuration.
//!
//! Thresholds, endpoints, output path and credential are carried in one
//! [`ExportConfig`] value that is handed to the pipeline constructors.

use anyhow::{bail, Context, Result};
use liquidation_export_api::{DEFAULT_DEBANK_URL, DEFAULT_SUBGRAPH_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use super::env;

/// Main configuration structure for an export run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Portfolio API bearer credential (never serialized)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Liquidation risk thresholds
    #[serde(default)]
    pub filter: FilterConfig,

    /// Output sink
    #[serde(default)]
    pub output: OutputConfig,

    /// Indexing and portfolio API endpoints
    #[serde(default)]
    pub sources: SourceConfig,

    /// Enrichment request settings
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// Liquidation risk thresholds. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum borrowed USD value
    #[serde(default = "default_min_debt_usd")]
    pub min_debt_usd: f64,

    /// Maximum health factor
    #[serde(default = "default_max_health_factor")]
    pub max_health_factor: f64,
}

fn default_min_debt_usd() -> f64 {
    2000.0
}
fn default_max_health_factor() -> f64 {
    1.02
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_debt_usd: default_min_debt_usd(),
            max_health_factor: default_max_health_factor(),
        }
    }
}

/// Output sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination CSV file
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("liquidatable_addresses_polygon.csv")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// External API endpoints and pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Indexing API (subgraph) endpoint
    #[serde(default = "default_subgraph_url")]
    pub subgraph_url: String,

    /// Portfolio API base URL
    #[serde(default = "default_portfolio_url")]
    pub portfolio_url: String,

    /// Protocol identifier tracked in portfolio responses
    #[serde(default = "default_protocol_id")]
    pub protocol_id: String,

    /// Addresses requested per indexing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound on indexing pages per run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_subgraph_url() -> String {
    DEFAULT_SUBGRAPH_URL.to_string()
}
fn default_portfolio_url() -> String {
    DEFAULT_DEBANK_URL.to_string()
}
fn default_protocol_id() -> String {
    "aave_v3_polygon".to_string()
}
fn default_page_size() -> usize {
    1000
}
fn default_max_pages() -> usize {
    10_000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            subgraph_url: default_subgraph_url(),
            portfolio_url: default_portfolio_url(),
            protocol_id: default_protocol_id(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

/// Enrichment request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Maximum in-flight portfolio requests (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout (seconds), applies to both APIs
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_concurrency() -> usize {
    8
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl EnrichmentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ExportConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from `EXPORT_CONFIG` (if set), then apply env overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(env::EXPORT_CONFIG) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.resolve(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Expand `${VAR}` references, apply overrides and validate.
    pub(crate) fn resolve(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        self.expand_env_vars(&lookup);
        self.apply_overrides(&lookup)?;
        self.validate()
    }

    fn expand_env_vars(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        self.sources.subgraph_url = env::expand_with(&self.sources.subgraph_url, lookup);
        self.sources.portfolio_url = env::expand_with(&self.sources.portfolio_url, lookup);
        let output = env::expand_with(&self.output.path.to_string_lossy(), lookup);
        self.output.path = PathBuf::from(output);

        if let Some(key) = self.api_key.take() {
            let expanded = env::expand_with(&key, lookup);
            if env::has_unresolved(&expanded) {
                warn!("api_key references an unset environment variable, ignoring it");
            } else {
                self.api_key = Some(expanded);
            }
        }
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(env::MIN_DEBT_USD) {
            self.filter.min_debt_usd = parse_override(env::MIN_DEBT_USD, &v)?;
        }
        if let Some(v) = get(env::MAX_HEALTH_FACTOR) {
            self.filter.max_health_factor = parse_override(env::MAX_HEALTH_FACTOR, &v)?;
        }
        if let Some(v) = get(env::ENRICH_CONCURRENCY) {
            self.enrichment.concurrency = parse_override(env::ENRICH_CONCURRENCY, &v)?;
        }
        if let Some(v) = get(env::OUTPUT_CSV) {
            self.output.path = PathBuf::from(v);
        }
        if let Some(v) = get(env::SUBGRAPH_URL) {
            self.sources.subgraph_url = v;
        }
        if let Some(v) = get(env::DEBANK_API_URL) {
            self.sources.portfolio_url = v;
        }
        if let Some(v) = get(env::PROTOCOL_ID) {
            self.sources.protocol_id = v;
        }
        if let Some(v) = get(env::DEBANK_API_KEY) {
            self.api_key = Some(v);
        }
        if self.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.api_key = None;
        }

        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let filter = &self.filter;
        if !filter.min_debt_usd.is_finite() || filter.min_debt_usd < 0.0 {
            bail!("min_debt_usd must be a non-negative number, got {}", filter.min_debt_usd);
        }
        if !filter.max_health_factor.is_finite() || filter.max_health_factor <= 0.0 {
            bail!("max_health_factor must be positive, got {}", filter.max_health_factor);
        }
        if self.sources.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.sources.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        if self.enrichment.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.sources.protocol_id.trim().is_empty() {
            bail!("protocol_id must not be empty");
        }
        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!(
            min_debt_usd = self.filter.min_debt_usd,
            max_health_factor = self.filter.max_health_factor,
            "Liquidation thresholds"
        );
        info!(
            subgraph = %self.sources.subgraph_url,
            portfolio = %self.sources.portfolio_url,
            protocol_id = %self.sources.protocol_id,
            page_size = self.sources.page_size,
            max_pages = self.sources.max_pages,
            "Data sources"
        );
        info!(
            concurrency = self.enrichment.concurrency,
            timeout_secs = self.enrichment.request_timeout_secs,
            authenticated = self.api_key.is_some(),
            output = %self.output.path.display(),
            "Enrichment and output"
        );
    }
}

fn parse_override<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {name}: {value:?}"))
}
