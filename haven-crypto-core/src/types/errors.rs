//! Error types for the RingCT engine.
//!
//! Assembly and decoding surface these as `Err`; verification entry points
//! deliberately collapse every failure into a boolean plus a diagnostic log
//! line, so none of these variants leak through the verification API.

use core::fmt;

/// Result type alias for engine operations.
pub type RctResult<T> = Result<T, RctError>;

/// Error type for assembly, decoding and multisig operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RctError {
    // =========================================================================
    // Malformed input
    // =========================================================================
    /// A transaction with no inputs was requested.
    EmptyInputs,

    /// Two parallel sequences disagree in length.
    LengthMismatch {
        /// What was being compared.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },

    /// An index points outside its container.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The container size.
        size: usize,
    },

    /// A 32-byte string is not a canonical scalar.
    InvalidScalar(&'static str),

    /// A 32-byte string does not decompress to a curve point.
    InvalidPoint(&'static str),

    /// The asset tag is not in the consensus registry.
    UnknownAssetType(String),

    /// The signature type is not valid for the requested operation.
    UnsupportedRctType(&'static str),

    /// The range-proof configuration has no prover in this engine.
    UnsupportedRangeProof(&'static str),

    /// The bulletproof version in the RCT config maps to no known epoch.
    UnsupportedBpVersion(u8),

    // =========================================================================
    // Direction / pricing
    // =========================================================================
    /// The output pattern is impossible for the declared source asset.
    InvalidDestination {
        /// Source asset of the transaction.
        source: String,
        /// The offending output asset.
        dest: String,
    },

    /// A conversion was requested but the block has no pricing record.
    EmptyPricingRecord,

    /// A conversion was requested against a zero price.
    ZeroExchangeRate(String),

    // =========================================================================
    // Crypto failures
    // =========================================================================
    /// The decrypted amount blob does not reopen the output commitment.
    AmountDecodeFailed(String),

    /// A multisig share set is internally inconsistent.
    MultisigInconsistent(String),

    /// A freshly produced proof failed its own verification.
    ProofSelfCheckFailed(&'static str),

    // =========================================================================
    // Infrastructure
    // =========================================================================
    /// The verification pool was initialised twice or misconfigured.
    PoolAlreadyInitialised,
}

impl fmt::Display for RctError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RctError::EmptyInputs => write!(f, "Transaction has no inputs"),
            RctError::LengthMismatch {
                what,
                expected,
                actual,
            } => write!(f, "Length mismatch for {what}: expected {expected}, got {actual}"),
            RctError::IndexOutOfRange { index, size } => {
                write!(f, "Index {index} out of range for size {size}")
            }
            RctError::InvalidScalar(what) => write!(f, "Non-canonical scalar: {what}"),
            RctError::InvalidPoint(what) => write!(f, "Invalid curve point: {what}"),
            RctError::UnknownAssetType(tag) => write!(f, "Unknown asset type: {tag}"),
            RctError::UnsupportedRctType(op) => {
                write!(f, "Signature type not supported for {op}")
            }
            RctError::UnsupportedRangeProof(what) => {
                write!(f, "Range proof configuration not supported: {what}")
            }
            RctError::UnsupportedBpVersion(v) => write!(f, "Unsupported bulletproof version: {v}"),
            RctError::InvalidDestination { source, dest } => {
                write!(f, "Output asset {dest} is impossible when spending {source}")
            }
            RctError::EmptyPricingRecord => {
                write!(f, "Empty pricing record for a conversion transaction")
            }
            RctError::ZeroExchangeRate(tag) => write!(f, "Zero exchange rate for asset {tag}"),
            RctError::AmountDecodeFailed(msg) => write!(f, "Amount decode failed: {msg}"),
            RctError::MultisigInconsistent(msg) => write!(f, "Inconsistent multisig data: {msg}"),
            RctError::ProofSelfCheckFailed(what) => {
                write!(f, "Self-check failed on freshly produced {what}")
            }
            RctError::PoolAlreadyInitialised => {
                write!(f, "Verification pool already initialised")
            }
        }
    }
}

impl std::error::Error for RctError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = RctError::LengthMismatch {
            what: "pseudo_outs",
            expected: 2,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("pseudo_outs"));
        assert!(msg.contains('2'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn errors_are_comparable() {
        assert_eq!(RctError::EmptyInputs, RctError::EmptyInputs);
        assert_ne!(
            RctError::EmptyInputs,
            RctError::InvalidScalar("signature scalar")
        );
    }
}
