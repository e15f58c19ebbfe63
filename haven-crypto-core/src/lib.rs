//! # haven-crypto-core
//!
//! The confidential multi-asset RingCT engine for a CryptoNote-lineage chain
//! with intra-chain asset colours (native XHV, pegged XUSD, and the xAsset
//! family) and on-chain conversions between them governed by a per-block
//! oracle pricing record.
//!
//! For every transaction the engine jointly produces and verifies:
//!
//! - **CLSAG** linkable ring signatures (with an MLSAG path retained for
//!   historical epochs), exposing one key image per input
//! - **Pedersen commitments** to output amounts with aggregated
//!   **Bulletproof** range proofs (Borromean verification retained for old
//!   epochs)
//! - The **proof-of-value** identity tying input commitments, output
//!   commitments, fees and, for conversions, the pricing record into a
//!   single group-element equation
//! - The **burnt/minted** and **collateral** equations of the conversion
//!   rule-set
//!
//! ## Modules
//!
//! - [`types`]: wire structures (`RctSig` and friends) and error types
//! - [`ops`]: scalar and group utilities over Curve25519
//! - [`pedersen`]: commitments, deterministic masks, the `H2` table
//! - [`ecdh`]: amount-blob sealing between sender and receiver
//! - [`bulletproof`]: aggregated range proofs (prover + batch verifier)
//! - [`borromean`]: legacy range-proof verification
//! - [`clsag`]: the primary ring signature (sign, verify, multisig)
//! - [`mlsag`]: the legacy ring signature (verify, multisig)
//! - [`device`]: the key-handling capability (software or hardware-backed)
//! - [`rct`]: transaction assembly, semantic and non-semantic verification
//! - [`pool`]: the process-wide verification thread pool
//!
//! ## Verification contract
//!
//! Verification entry points return a plain `bool` and log a one-line
//! diagnostic on failure; callers never learn which predicate failed through
//! the return value. Assembly entry points return structured errors and never
//! yield a partial signature. A failed internal invariant (for example the
//! scalar-inversion self-check) aborts the process.
//!
//! ## Secret hygiene
//!
//! Every scalar derived from a private key is wiped before its storage is
//! released; signing paths combine the spend secret and the commitment-mask
//! delta only transiently and erase both once the ring is closed.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod borromean;
pub mod bulletproof;
pub mod clsag;
pub mod device;
pub mod ecdh;
pub mod mlsag;
pub mod ops;
pub mod pedersen;
pub mod pool;
pub mod rct;
pub mod types;

/// Re-export of commonly used types at the crate root.
pub use types::errors::{RctError, RctResult};
pub use types::rct::{
    Bulletproof, BoroSig, Clsag, CtKey, EcdhTuple, Key, MgSig, MultisigKLRki, MultisigOut,
    RangeProofType, RangeSig, RctConfig, RctSig, RctSigPrunable, RctType, KEY_ZERO,
};

pub use device::{Device, DeviceMode, SoftwareDevice};
pub use rct::{
    check_burnt_and_minted, decode_rct_simple, gen_rct_simple, get_pre_mlsag_hash, ver_rct,
    ver_rct_non_semantics_simple, ver_rct_semantics_simple, ver_rct_semantics_simple_2,
};
