//! CLSAG challenge and aggregation hashing.
//!
//! Hash input layouts (concatenated 32-byte slots):
//!
//! ```text
//! μ_P = Hs(agg_0 ‖ P[0..n] ‖ C_nonzero[0..n] ‖ I ‖ D ‖ C_offset)
//! μ_C = Hs(agg_1 ‖ P[0..n] ‖ C_nonzero[0..n] ‖ I ‖ D ‖ C_offset)
//! c'  = Hs(round ‖ P[0..n] ‖ C_nonzero[0..n] ‖ C_offset ‖ message ‖ L ‖ R)
//! ```
//!
//! `D` enters the aggregation hashes in its published (divided-by-8) form.

use curve25519_dalek::scalar::Scalar;
use sha3::{Digest, Keccak256};

use super::constants::{domain_slot, CLSAG_AGG_0, CLSAG_AGG_1, CLSAG_ROUND};
use crate::ops::hash_to_scalar;
use crate::types::rct::Key;

/// Compute the aggregation coefficients `(μ_P, μ_C)`.
#[must_use]
pub fn aggregation_hashes(
    ring_keys: &[Key],
    ring_commitments: &[Key],
    key_image: &Key,
    d_inv8: &Key,
    pseudo_out: &Key,
) -> (Scalar, Scalar) {
    let mut mu = [Scalar::ZERO; 2];
    for (slot, domain) in [CLSAG_AGG_0, CLSAG_AGG_1].iter().enumerate() {
        let mut hasher = Keccak256::new();
        hasher.update(domain_slot(domain));
        for key in ring_keys {
            hasher.update(key);
        }
        for commitment in ring_commitments {
            hasher.update(commitment);
        }
        hasher.update(key_image);
        hasher.update(d_inv8);
        hasher.update(pseudo_out);
        let hash: [u8; 32] = hasher.finalize().into();
        mu[slot] = Scalar::from_bytes_mod_order(hash);
    }
    (mu[0], mu[1])
}

/// The fixed prefix of the round hash, reused across every ring position.
///
/// Only the trailing `(L, R)` slots change per round, so the prefix bytes
/// are assembled once.
pub struct RoundHash {
    prefix: Vec<u8>,
}

impl RoundHash {
    /// Assemble the prefix `round ‖ P ‖ C_nonzero ‖ C_offset ‖ message`.
    #[must_use]
    pub fn new(ring_keys: &[Key], ring_commitments: &[Key], pseudo_out: &Key, message: &Key) -> Self {
        let n = ring_keys.len();
        let mut prefix = Vec::with_capacity((2 * n + 3) * 32);
        prefix.extend_from_slice(&domain_slot(CLSAG_ROUND));
        for key in ring_keys {
            prefix.extend_from_slice(key);
        }
        for commitment in ring_commitments {
            prefix.extend_from_slice(commitment);
        }
        prefix.extend_from_slice(pseudo_out);
        prefix.extend_from_slice(message);
        Self { prefix }
    }

    /// The challenge for the next ring position given this round's `(L, R)`.
    #[must_use]
    pub fn challenge(&self, l_point: &Key, r_point: &Key) -> Scalar {
        let mut data = Vec::with_capacity(self.prefix.len() + 64);
        data.extend_from_slice(&self.prefix);
        data.extend_from_slice(l_point);
        data.extend_from_slice(r_point);
        hash_to_scalar(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_hashes_are_deterministic_and_distinct() {
        let k = [7u8; 32];
        let ring = vec![k, k];
        let (p1, c1) = aggregation_hashes(&ring, &ring, &k, &k, &k);
        let (p2, c2) = aggregation_hashes(&ring, &ring, &k, &k, &k);
        assert_eq!(p1, p2);
        assert_eq!(c1, c2);
        // Distinct domains must yield distinct coefficients.
        assert_ne!(p1, c1);
    }

    #[test]
    fn round_hash_binds_l_and_r() {
        let k = [3u8; 32];
        let ring = vec![k, k, k];
        let round = RoundHash::new(&ring, &ring, &k, &k);
        let c1 = round.challenge(&[1u8; 32], &[2u8; 32]);
        let c2 = round.challenge(&[1u8; 32], &[4u8; 32]);
        assert_ne!(c1, c2);
        assert_eq!(c1, round.challenge(&[1u8; 32], &[2u8; 32]));
    }

    #[test]
    fn round_hash_binds_the_message() {
        let k = [3u8; 32];
        let ring = vec![k, k];
        let a = RoundHash::new(&ring, &ring, &k, &[5u8; 32]);
        let b = RoundHash::new(&ring, &ring, &k, &[6u8; 32]);
        assert_ne!(a.challenge(&k, &k), b.challenge(&k, &k));
    }
}
