//! Transaction assembly and verification.
//!
//! [`gen_rct_simple`] builds a complete [`crate::types::rct::RctSig`]:
//! commitments, an aggregated bulletproof, ECDH blobs, pseudo-outputs,
//! mask sums, and one CLSAG per input. Verification is split the way the
//! chain consumes it: semantic checks (everything computable from the
//! signature plus the pricing record) and non-semantic checks (the ring
//! signatures against their resolved mix-rings).

pub mod decode;
pub mod gen;
pub mod helpers;
pub mod prehash;
pub mod verify;

pub use decode::decode_rct_simple;
pub use gen::gen_rct_simple;
pub use helpers::populate_from_blockchain_simple;
pub use prehash::{get_pre_mlsag_hash, serialize_rct_base};
pub use verify::{
    check_burnt_and_minted, ver_rct, ver_rct_non_semantics_simple, ver_rct_semantics_simple,
    ver_rct_semantics_simple_2,
};
