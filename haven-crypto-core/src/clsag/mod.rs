//! CLSAG: Concise Linkable Spontaneous Anonymous Group signatures.
//!
//! The primary ring signature from `RctType::Clsag` onward. One signature
//! per input proves ownership of one ring member and knowledge of the
//! commitment opening relative to the input's pseudo-output, exposing a key
//! image that makes double-spends linkable.

pub mod constants;
pub mod hash;
pub mod multisig;
pub mod sign;
pub mod verify;

pub use constants::{CLSAG_AGG_0, CLSAG_AGG_1, CLSAG_ROUND};
pub use hash::{aggregation_hashes, RoundHash};
pub use multisig::{acc_sign_multisig_clsag, sign_multisig_clsag};
pub use sign::{clsag_sign, prove_rct_clsag_simple, ClsagOutput};
pub use verify::ver_rct_clsag_simple;
