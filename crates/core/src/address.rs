//! Raw address validation and canonicalization.
//!
//! Indexers return lowercase hex ids, while other feeds may return mixed case.
//! Every accepted value is parsed into an [`Address`], so spellings that differ
//! only in letter case collapse to the same entity and render as the same
//! EIP-55 checksummed string.

use alloy::primitives::{address, Address};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Length of a `0x`-prefixed 20-byte hex address.
pub const ADDRESS_LEN: usize = 42;

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Known non-user system addresses.
pub const DENY_LIST: [Address; 2] = [
    address!("000000000000000000000000000000000000dEaD"),
    address!("0000000000000000000000000000000000000001"),
];

/// Why a raw value was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Rejection {
    #[error("empty value")]
    Empty,
    #[error("zero address")]
    ZeroAddress,
    #[error("length is not 42")]
    BadLength,
    #[error("all-zero digits")]
    AllZeroDigits,
    #[error("not a valid hex address")]
    Malformed,
    #[error("system address")]
    DenyListed,
}

/// Validate one raw value, returning its parsed address.
///
/// Rules are applied in order and the first failing rule wins.
pub fn validate_one(raw: &str) -> Result<Address, Rejection> {
    if raw.trim().is_empty() {
        return Err(Rejection::Empty);
    }

    if raw.eq_ignore_ascii_case(ZERO_ADDRESS) {
        return Err(Rejection::ZeroAddress);
    }

    // Surrounding whitespace counts toward the length
    if raw.len() != ADDRESS_LEN {
        return Err(Rejection::BadLength);
    }

    // Byte 2 may fall inside a multi-byte char, treat that as malformed below
    let digits = raw.get(2..).unwrap_or_default();
    if !digits.is_empty() && digits.chars().all(|c| c == '0') {
        return Err(Rejection::AllZeroDigits);
    }

    if !raw.starts_with("0x") {
        return Err(Rejection::Malformed);
    }
    let address = Address::from_str(raw).map_err(|_| Rejection::Malformed)?;

    if DENY_LIST.contains(&address) {
        return Err(Rejection::DenyListed);
    }

    Ok(address)
}

/// Checksummed textual form of an address.
pub fn canonical(address: &Address) -> String {
    address.to_checksum(None)
}

/// Outcome of validating a raw address population.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Accepted addresses, deduplicated, in first-seen order
    pub addresses: Vec<Address>,
    /// Rejection counts by reason
    pub rejected: HashMap<Rejection, usize>,
    /// Accepted values that repeated an earlier address
    pub duplicates: usize,
}

impl ValidationReport {
    /// Total rejected values.
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Validate a raw population, keeping a breakdown of what was dropped.
pub fn validate_with_report<S: AsRef<str>>(raw: &[S]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen = HashSet::with_capacity(raw.len());

    for value in raw {
        match validate_one(value.as_ref()) {
            Ok(address) => {
                if seen.insert(address) {
                    report.addresses.push(address);
                } else {
                    report.duplicates += 1;
                }
            }
            Err(reason) => {
                *report.rejected.entry(reason).or_default() += 1;
            }
        }
    }

    debug!(
        input = raw.len(),
        valid = report.addresses.len(),
        rejected = report.rejected_total(),
        duplicates = report.duplicates,
        "Validated raw addresses"
    );

    report
}

/// Filter raw strings down to unique, well-formed, non-system addresses.
pub fn validate<S: AsRef<str>>(raw: &[S]) -> Vec<Address> {
    validate_with_report(raw).addresses
}
