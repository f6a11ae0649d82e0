//! In-memory API doubles shared by the unit tests.

use alloy::primitives::Address;
use async_trait::async_trait;
use liquidation_export_api::{
    AddressPageSource, ApiError, BorrowEntry, PortfolioApi, PortfolioDetail, PortfolioItem,
    ProtocolPortfolio,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Indexing API double returning pages of the given sizes, in call order.
#[derive(Debug, Default)]
pub struct MockPages {
    sizes: Vec<usize>,
    calls: Mutex<Vec<(usize, usize)>>,
    failure: Mutex<Option<(usize, ApiError)>>,
    fixed: Option<Vec<String>>,
}

impl MockPages {
    pub fn with_sizes(sizes: &[usize]) -> Self {
        Self {
            sizes: sizes.to_vec(),
            ..Default::default()
        }
    }

    /// Serve a fixed address list as a single short page.
    pub fn with_addresses(addresses: &[&str]) -> Self {
        Self {
            fixed: Some(addresses.iter().map(|a| a.to_string()).collect()),
            ..Default::default()
        }
    }

    /// Fail the request made at offset `skip`.
    pub fn failing_at(self, skip: usize, error: ApiError) -> Self {
        *self.failure.lock().unwrap() = Some((skip, error));
        self
    }

    /// Deterministic address for absolute position `index`.
    pub fn address_at(index: usize) -> String {
        format!("0x{:040x}", index + 0x1000)
    }

    pub fn offsets(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(skip, _)| *skip).collect()
    }

    pub fn firsts(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(_, first)| *first).collect()
    }
}

#[async_trait]
impl AddressPageSource for MockPages {
    async fn fetch_page(&self, skip: usize, first: usize) -> Result<Vec<String>, ApiError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((skip, first));
            calls.len() - 1
        };

        let mut failure = self.failure.lock().unwrap();
        if failure.as_ref().is_some_and(|(at, _)| *at == skip) {
            if let Some((_, error)) = failure.take() {
                return Err(error);
            }
        }

        if let Some(fixed) = &self.fixed {
            return Ok(fixed.iter().skip(skip).take(first).cloned().collect());
        }

        let size = self.sizes.get(call).copied().unwrap_or(0);
        Ok((skip..skip + size).map(Self::address_at).collect())
    }
}

/// Portfolio API double keyed by address. Unknown addresses have no protocols.
#[derive(Debug, Default)]
pub struct MockPortfolio {
    responses: HashMap<Address, Result<Vec<ProtocolPortfolio>, String>>,
    calls: Mutex<Vec<Address>>,
}

impl MockPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protocols(mut self, address: Address, protocols: Vec<ProtocolPortfolio>) -> Self {
        self.responses.insert(address, Ok(protocols));
        self
    }

    /// Simulate a network failure for `address`.
    pub fn failing(mut self, address: Address, message: &str) -> Self {
        self.responses.insert(address, Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Address> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortfolioApi for MockPortfolio {
    async fn protocol_list(&self, address: Address) -> Result<Vec<ProtocolPortfolio>, ApiError> {
        self.calls.lock().unwrap().push(address);
        match self.responses.get(&address) {
            Some(Ok(protocols)) => Ok(protocols.clone()),
            Some(Err(message)) => Err(ApiError::status(503, message)),
            None => Ok(Vec::new()),
        }
    }
}

/// A lending protocol entry with one position holding the given borrows.
pub fn lending_protocol(id: &str, borrows: &[(f64, Option<f64>)]) -> ProtocolPortfolio {
    let borrow_list = borrows
        .iter()
        .map(|(usd, hf)| BorrowEntry {
            symbol: Some("USDC".to_string()),
            usd_value: Some(*usd),
            health_rate: *hf,
        })
        .collect();

    ProtocolPortfolio {
        id: id.to_string(),
        chain: Some("matic".to_string()),
        name: None,
        portfolio_item_list: vec![PortfolioItem {
            name: Some("Lending".to_string()),
            detail: Some(PortfolioDetail {
                borrow_list: Some(borrow_list),
            }),
        }],
    }
}

/// Parse a test address literal.
pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}
