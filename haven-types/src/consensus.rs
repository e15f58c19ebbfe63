//! Consensus constants.
//!
//! Two distinct version spaces appear here and must not be conflated:
//! transaction-format versions (compared against `POU_TRANSACTION_VERSION`
//! during assembly) and hard-fork versions (compared against the `HF_*`
//! gates during verification).

/// Number of atomic units in one coin (10^12).
pub const COIN: u64 = 1_000_000_000_000;

/// Maximum number of outputs a single aggregated range proof may cover.
pub const BULLETPROOF_MAX_OUTPUTS: usize = 16;

/// Transaction-format version from which per-output-unlock pricing applies:
/// conversions use `min`/`max` of the moving-average and spot prices instead
/// of the moving average alone.
pub const POU_TRANSACTION_VERSION: u8 = 6;

/// Hard fork that introduced CLSAG signatures.
pub const HF_VERSION_CLSAG: u8 = 13;

/// Hard fork that introduced the second-generation xAsset conversion fees.
pub const HF_VERSION_XASSET_FEES_V2: u8 = 17;

/// Hard fork that consolidated per-colour commitments and fees
/// (`RctType::Haven2`).
pub const HF_VERSION_HAVEN2: u8 = 18;

/// Hard fork from which verification applies the per-output-unlock
/// `min`/`max` pricing rule.
pub const HF_PER_OUTPUT_UNLOCK_VERSION: u8 = 19;

/// Hard fork that introduced conversion collateral (`RctType::Haven3`).
pub const HF_VERSION_USE_COLLATERAL: u8 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_are_ordered() {
        assert!(HF_VERSION_CLSAG < HF_VERSION_XASSET_FEES_V2);
        assert!(HF_VERSION_XASSET_FEES_V2 < HF_VERSION_HAVEN2);
        assert!(HF_VERSION_HAVEN2 < HF_PER_OUTPUT_UNLOCK_VERSION);
        assert!(HF_PER_OUTPUT_UNLOCK_VERSION < HF_VERSION_USE_COLLATERAL);
    }

    #[test]
    fn coin_scale() {
        assert_eq!(COIN, 10u64.pow(12));
    }
}
