//! The oracle pricing record.
//!
//! One record is published per block by the pricing oracle and governs every
//! conversion in that block. Prices are expressed in XUSD atomic units per
//! whole coin of the priced asset (scale [`crate::consensus::COIN`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-block signed price mapping.
///
/// The XHV price appears twice: `xusd` is the spot price and `xusd_ma` the
/// moving average (historically the record's `unused1` slot). xAsset prices
/// live in the `rates` table keyed by asset tag; a missing tag reads as 0,
/// which verifiers must treat as "no price available".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRecord {
    /// Spot price of 1 XHV in XUSD atomic units.
    pub xusd: u64,
    /// Moving-average price of 1 XHV in XUSD atomic units.
    pub xusd_ma: u64,
    /// Price of 1 unit of each xAsset in XUSD atomic units.
    pub rates: BTreeMap<String, u64>,
}

impl PricingRecord {
    /// An empty record, meaning no valid pricing data for this block.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the record carries no pricing data at all.
    ///
    /// Conversions must be rejected for blocks whose record is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xusd == 0 && self.xusd_ma == 0 && self.rates.values().all(|&r| r == 0)
    }

    /// Price of the given asset tag; 0 when the tag is missing.
    #[must_use]
    pub fn rate(&self, tag: &str) -> u64 {
        self.rates.get(tag).copied().unwrap_or(0)
    }

    /// Builder-style insertion of an xAsset rate, used heavily by tests.
    #[must_use]
    pub fn with_rate(mut self, tag: &str, rate: u64) -> Self {
        self.rates.insert(tag.to_owned(), rate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_empty() {
        assert!(PricingRecord::empty().is_empty());
    }

    #[test]
    fn record_with_spot_price_is_not_empty() {
        let pr = PricingRecord {
            xusd: 1,
            ..Default::default()
        };
        assert!(!pr.is_empty());
    }

    #[test]
    fn missing_tag_reads_zero() {
        let pr = PricingRecord::empty().with_rate("XAU", 42);
        assert_eq!(pr.rate("XAU"), 42);
        assert_eq!(pr.rate("XAG"), 0);
    }

    #[test]
    fn serde_round_trip() {
        let pr = PricingRecord {
            xusd: 500,
            xusd_ma: 400,
            rates: BTreeMap::new(),
        }
        .with_rate("XBTC", 7);
        let json = serde_json::to_string(&pr).unwrap();
        let back: PricingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(pr, back);
    }
}
