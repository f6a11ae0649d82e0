//! Borrow position records produced by enrichment.

use alloy::primitives::Address;
use liquidation_export_api::BorrowEntry;

use crate::address::canonical;

/// One borrowed asset of one wallet inside the tracked protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    /// Borrower
    pub address: Address,
    /// Borrowed token symbol, if reported
    pub asset: Option<String>,
    /// Borrowed value in USD, `None` when the API did not report a usable value
    pub borrowed_usd: Option<f64>,
    /// Health factor, `None` when the API did not report a usable value
    pub health_factor: Option<f64>,
}

impl PositionRecord {
    /// Build a record from a portfolio API borrow entry.
    ///
    /// A missing, non-finite or non-positive health rate becomes `None`:
    /// unknown risk, never zero risk. A missing, non-finite or negative USD
    /// value likewise becomes `None` rather than zero debt.
    pub fn from_borrow(address: Address, entry: &BorrowEntry) -> Self {
        let borrowed_usd = entry.usd_value.filter(|v| v.is_finite() && *v >= 0.0);
        let health_factor = entry.health_rate.filter(|hf| hf.is_finite() && *hf > 0.0);

        Self {
            address,
            asset: entry.symbol.clone(),
            borrowed_usd,
            health_factor,
        }
    }
}

/// A position that passed the liquidation risk rule.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidationCandidate {
    pub address: Address,
    pub borrowed_usd: f64,
    /// Known, positive health factor
    pub health_factor: f64,
}

impl LiquidationCandidate {
    /// Checksummed borrower address.
    pub fn canonical_address(&self) -> String {
        canonical(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(usd: Option<f64>, hf: Option<f64>) -> BorrowEntry {
        BorrowEntry {
            symbol: Some("USDC".to_string()),
            usd_value: usd,
            health_rate: hf,
        }
    }

    #[test]
    fn test_from_borrow() {
        let record = PositionRecord::from_borrow(Address::ZERO, &entry(Some(2500.0), Some(1.01)));
        assert_eq!(record.borrowed_usd, Some(2500.0));
        assert_eq!(record.health_factor, Some(1.01));
        assert_eq!(record.asset.as_deref(), Some("USDC"));
    }

    #[test]
    fn test_unknown_health_factor() {
        let missing = PositionRecord::from_borrow(Address::ZERO, &entry(Some(10.0), None));
        assert_eq!(missing.health_factor, None);

        let zero = PositionRecord::from_borrow(Address::ZERO, &entry(Some(10.0), Some(0.0)));
        assert_eq!(zero.health_factor, None);

        let nan = PositionRecord::from_borrow(Address::ZERO, &entry(Some(10.0), Some(f64::NAN)));
        assert_eq!(nan.health_factor, None);
    }

    #[test]
    fn test_unknown_borrowed_usd() {
        let missing = PositionRecord::from_borrow(Address::ZERO, &entry(None, Some(0.9)));
        assert_eq!(missing.borrowed_usd, None);
        assert_eq!(missing.health_factor, Some(0.9));

        let nan = PositionRecord::from_borrow(Address::ZERO, &entry(Some(f64::NAN), Some(0.9)));
        assert_eq!(nan.borrowed_usd, None);

        let negative = PositionRecord::from_borrow(Address::ZERO, &entry(Some(-5.0), Some(0.9)));
        assert_eq!(negative.borrowed_usd, None);

        let zero = PositionRecord::from_borrow(Address::ZERO, &entry(Some(0.0), Some(0.9)));
        assert_eq!(zero.borrowed_usd, Some(0.0));
    }
}
