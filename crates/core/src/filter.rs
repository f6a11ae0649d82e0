//! Static liquidation risk rule.

use tracing::debug;

use crate::config::FilterConfig;
use crate::position::{LiquidationCandidate, PositionRecord};

/// Selects positions that are large enough and close enough to liquidation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidationFilter {
    /// Minimum borrowed USD (inclusive)
    pub min_debt_usd: f64,
    /// Maximum health factor (inclusive)
    pub max_health_factor: f64,
}

impl Default for LiquidationFilter {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl From<&FilterConfig> for LiquidationFilter {
    fn from(config: &FilterConfig) -> Self {
        Self::new(config.min_debt_usd, config.max_health_factor)
    }
}

impl LiquidationFilter {
    pub fn new(min_debt_usd: f64, max_health_factor: f64) -> Self {
        Self {
            min_debt_usd,
            max_health_factor,
        }
    }

    /// Check one record. Records with an unknown health factor or debt
    /// value never qualify.
    pub fn check(&self, record: &PositionRecord) -> Option<LiquidationCandidate> {
        let health_factor = record.health_factor?;
        let borrowed_usd = record.borrowed_usd?;

        if borrowed_usd >= self.min_debt_usd
            && health_factor > 0.0
            && health_factor <= self.max_health_factor
        {
            Some(LiquidationCandidate {
                address: record.address,
                borrowed_usd,
                health_factor,
            })
        } else {
            None
        }
    }

    /// Apply the rule to every record, preserving order. No deduplication.
    pub fn apply(&self, records: &[PositionRecord]) -> Vec<LiquidationCandidate> {
        let candidates: Vec<LiquidationCandidate> =
            records.iter().filter_map(|r| self.check(r)).collect();

        debug!(
            records = records.len(),
            candidates = candidates.len(),
            min_debt_usd = self.min_debt_usd,
            max_health_factor = self.max_health_factor,
            "Applied liquidation filter"
        );

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn record(borrowed_usd: f64, health_factor: Option<f64>) -> PositionRecord {
        PositionRecord {
            address: Address::repeat_byte(0x42),
            asset: None,
            borrowed_usd: Some(borrowed_usd),
            health_factor,
        }
    }

    #[test]
    fn test_threshold_boundaries() {
        let filter = LiquidationFilter::default();

        assert!(filter.check(&record(2000.0, Some(1.02))).is_some());
        assert!(filter.check(&record(1999.99, Some(1.02))).is_none());
        assert!(filter.check(&record(5000.0, Some(1.03))).is_none());
    }

    #[test]
    fn test_unknown_or_zero_health_factor_excluded() {
        let filter = LiquidationFilter::default();

        assert!(filter.check(&record(5000.0, None)).is_none());
        assert!(filter.check(&record(5000.0, Some(0.0))).is_none());
        assert!(filter.check(&record(5000.0, Some(-1.0))).is_none());
    }

    #[test]
    fn test_unknown_debt_excluded_even_without_threshold() {
        let filter = LiquidationFilter::new(0.0, 1.02);
        let unknown = PositionRecord {
            borrowed_usd: None,
            ..record(0.0, Some(0.9))
        };

        assert!(filter.check(&unknown).is_none());
        assert!(filter.check(&record(0.0, Some(0.9))).is_some());
    }

    #[test]
    fn test_custom_thresholds() {
        let filter = LiquidationFilter::new(100.0, 1.5);

        assert!(filter.check(&record(150.0, Some(1.4))).is_some());
        assert!(filter.check(&record(50.0, Some(1.4))).is_none());
    }

    #[test]
    fn test_apply_keeps_duplicates_and_order() {
        let filter = LiquidationFilter::default();
        let records = vec![
            record(3000.0, Some(0.95)),
            record(10.0, Some(0.5)),
            record(3000.0, Some(0.95)),
            record(2500.0, Some(1.0)),
        ];

        let candidates = filter.apply(&records);

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], candidates[1]);
        assert_eq!(candidates[2].borrowed_usd, 2500.0);
        assert_eq!(candidates[2].health_factor, 1.0);
    }
}
