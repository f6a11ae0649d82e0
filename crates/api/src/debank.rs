//! DeBank portfolio API client for per-wallet protocol positions.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{read_body, ApiError};

/// DeBank open API.
pub const DEFAULT_DEBANK_URL: &str = "https://openapi.debank.com";

/// A source of per-wallet protocol portfolios.
#[async_trait]
pub trait PortfolioApi: Send + Sync + Debug {
    /// Fetch every protocol the wallet has a position in.
    async fn protocol_list(&self, address: Address) -> Result<Vec<ProtocolPortfolio>, ApiError>;
}

/// DeBank API client.
#[derive(Clone)]
pub struct DebankClient {
    client: reqwest::Client,
    base_url: String,
    /// Bearer credential, requests go out unauthenticated without it
    api_key: Option<String>,
}

impl std::fmt::Debug for DebankClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebankClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.api_key.is_some())
            .finish()
    }
}

impl DebankClient {
    /// Create a new DeBank client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: crate::http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Whether requests carry a credential.
    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build `GET {base}/v1/user/protocol_list?id=<address>`, with a bearer
    /// header only when a credential is configured.
    fn protocol_list_request(&self, address: Address) -> Result<reqwest::Request, ApiError> {
        let url = format!("{}/v1/user/protocol_list", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("id", address.to_checksum(None).to_lowercase())]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        Ok(request.build()?)
    }
}

#[async_trait]
impl PortfolioApi for DebankClient {
    #[instrument(skip(self), fields(address = %address))]
    async fn protocol_list(&self, address: Address) -> Result<Vec<ProtocolPortfolio>, ApiError> {
        let request = self.protocol_list_request(address)?;
        let response = self.client.execute(request).await?;
        let text = read_body(response).await?;
        let protocols: Vec<ProtocolPortfolio> = serde_json::from_str(&text)?;

        debug!(protocols = protocols.len(), "Fetched protocol list");

        Ok(protocols)
    }
}

/// One protocol entry of a wallet portfolio.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolPortfolio {
    /// Protocol identifier, e.g. `aave_v3_polygon`
    pub id: String,

    /// Chain identifier
    #[serde(default)]
    pub chain: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Positions held in this protocol
    #[serde(default)]
    pub portfolio_item_list: Vec<PortfolioItem>,
}

/// A held position inside a protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioItem {
    /// Position kind, e.g. "Lending"
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub detail: Option<PortfolioDetail>,
}

/// Position detail. Lending positions carry a borrow list.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioDetail {
    #[serde(default)]
    pub borrow_list: Option<Vec<BorrowEntry>>,
}

/// A borrowed token inside a lending position.
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowEntry {
    /// Token symbol
    #[serde(default)]
    pub symbol: Option<String>,

    /// Borrowed value in USD (may be string or number)
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub usd_value: Option<f64>,

    /// Health rate of the position
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub health_rate: Option<f64>,
}

fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(f64),
    }

    match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::String(s)) => {
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse().map(Some).map_err(serde::de::Error::custom)
            }
        }
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
        None => Ok(None),
    }
}
