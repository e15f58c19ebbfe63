//! Haven Shared Types
//!
//! This crate provides the types shared between the RingCT engine
//! (`haven-crypto-core`) and its collaborators:
//!
//! - Asset colours and the fixed asset-tag registry
//! - The transaction-type classification used by conversion rules
//! - The oracle pricing record that governs all conversion math
//! - Consensus constants (atomic scale, hard-fork gates, proof limits)
//!
//! All types are plain data with serde serialization for transport; none of
//! them perform cryptography.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod asset;
pub mod consensus;
pub mod pricing;

pub use asset::{Network, TransactionType, ASSET_TYPES, XHV, XUSD};
pub use consensus::*;
pub use pricing::PricingRecord;
