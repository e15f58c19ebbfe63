//! Aggregated Bulletproof range proofs.
//!
//! Proves that each committed output amount lies in `[0, 2^64)`, with all
//! outputs of a transaction aggregated into one proof padded to the next
//! power of two. Layout: `(V, A, S, T1, T2, taux, mu, L[], R[], a, b, t)`;
//! every point is published multiplied by `INV_EIGHT`.
//!
//! The transcript is the `hash_to_scalar` cascade seeded from `Hs(V)`; the
//! vector generators are derived from `H` under the `"bulletproof"` domain.
//!
//! See Bünz et al., <https://eprint.iacr.org/2017/1066>.

pub mod prove;
pub mod verify;

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use once_cell::sync::Lazy;

use crate::ops::{d2h, hash_to_point, hash_to_scalar, keccak256};
use crate::pedersen::{gen_commitment, H_BYTES, INV_EIGHT};
use crate::types::rct::{Bulletproof, Key, KEY_IDENTITY};

pub use prove::prove_range_bulletproof;
pub use verify::{ver_bulletproof, ver_bulletproof_single};

/// Bits per amount.
pub const BP_N: usize = 64;
/// log2 of [`BP_N`].
pub(crate) const BP_LOG_N: usize = 6;
/// Maximum aggregation width.
pub const BP_MAX_M: usize = 16;
/// Total generator count.
pub(crate) const BP_MAX_MN: usize = BP_N * BP_MAX_M;

/// CryptoNote varint encoding, used in generator derivation.
pub(crate) fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10);
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
        if value == 0 {
            break;
        }
    }
    bytes
}

/// `get_exponent`: the i-th vector generator, a double-Keccak hash-to-point
/// of `H ‖ "bulletproof" ‖ varint(i)`.
fn get_exponent(index: u64) -> EdwardsPoint {
    let varint = encode_varint(index);
    let mut data = Vec::with_capacity(32 + 11 + varint.len());
    data.extend_from_slice(&H_BYTES);
    data.extend_from_slice(b"bulletproof");
    data.extend_from_slice(&varint);
    hash_to_point(&keccak256(&data))
}

pub(crate) struct BpGenerators {
    pub gi: Vec<EdwardsPoint>,
    pub hi: Vec<EdwardsPoint>,
}

/// The fixed generator vectors: `Hi` at even indices, `Gi` at odd.
pub(crate) static GENERATORS: Lazy<BpGenerators> = Lazy::new(|| {
    let mut gi = Vec::with_capacity(BP_MAX_MN);
    let mut hi = Vec::with_capacity(BP_MAX_MN);
    for i in 0..BP_MAX_MN as u64 {
        hi.push(get_exponent(i * 2));
        gi.push(get_exponent(i * 2 + 1));
    }
    BpGenerators { gi, hi }
});

/// One step of the transcript cascade: `cache ← Hs(cache ‖ e_1 ‖ … ‖ e_k)`.
pub(crate) fn transcript_mash(cache: &mut Scalar, elements: &[&Key]) -> Scalar {
    let mut data = Vec::with_capacity(32 * (1 + elements.len()));
    data.extend_from_slice(cache.as_bytes());
    for e in elements {
        data.extend_from_slice(*e);
    }
    *cache = hash_to_scalar(&data);
    *cache
}

/// The padded aggregation width for a given output count: the smallest
/// power of two ≥ `outputs`, with its log.
pub(crate) fn padded_m(outputs: usize) -> (usize, usize) {
    let mut m = 1usize;
    let mut log_m = 0usize;
    while m < outputs && m <= BP_MAX_M {
        m <<= 1;
        log_m += 1;
    }
    (m, log_m)
}

/// Number of amounts a set of proofs covers, or `None` when any proof has
/// an impossible shape. The count is what output-side length agreement is
/// checked against.
#[must_use]
pub fn n_bulletproof_amounts(proofs: &[Bulletproof]) -> Option<usize> {
    let mut total = 0usize;
    for proof in proofs {
        if proof.V.is_empty() || proof.L.len() != proof.R.len() || proof.L.len() < BP_LOG_N {
            return None;
        }
        let log_m = proof.L.len() - BP_LOG_N;
        if log_m > 4 {
            return None;
        }
        let m = 1usize << log_m;
        if proof.V.len() > m || (m > 1 && proof.V.len() <= m / 2) {
            return None;
        }
        total = total.checked_add(proof.V.len())?;
    }
    Some(total)
}

/// A structurally valid but cryptographically void proof, used by
/// watch-only devices in `TransactionCreateFake` mode to simulate a
/// transaction without paying for proving. Never accepted by the verifier.
///
/// Returns the proof together with the per-output commitments (mask fixed
/// to 1) and masks the simulation carries forward.
#[must_use]
pub fn make_dummy_bulletproof(out_amounts: &[u64]) -> (Bulletproof, Vec<Key>, Vec<Scalar>) {
    let n_outs = out_amounts.len();
    let mut nrl = 0usize;
    while (1usize << nrl) < n_outs {
        nrl += 1;
    }
    nrl += BP_LOG_N;

    let mut commitments = Vec::with_capacity(n_outs);
    let mut masks = Vec::with_capacity(n_outs);
    for &amount in out_amounts {
        masks.push(Scalar::ONE);
        let c = gen_commitment(&Scalar::ONE, amount) * *INV_EIGHT;
        commitments.push(c.compress().to_bytes());
    }

    let proof = Bulletproof {
        V: vec![KEY_IDENTITY; n_outs],
        A: KEY_IDENTITY,
        S: KEY_IDENTITY,
        T1: KEY_IDENTITY,
        T2: KEY_IDENTITY,
        taux: KEY_IDENTITY,
        mu: KEY_IDENTITY,
        L: vec![KEY_IDENTITY; nrl],
        R: vec![KEY_IDENTITY; nrl],
        a: KEY_IDENTITY,
        b: KEY_IDENTITY,
        t: KEY_IDENTITY,
    };
    (proof, commitments, masks)
}

/// Powers of a scalar: `[1, x, x², …, x^(count−1)]`.
pub(crate) fn vector_powers(x: &Scalar, count: usize) -> Vec<Scalar> {
    let mut powers = Vec::with_capacity(count);
    let mut current = Scalar::ONE;
    for _ in 0..count {
        powers.push(current);
        current *= x;
    }
    powers
}

/// `⟨1, 2^N⟩ = 2^64 − 1` as a scalar.
pub(crate) fn inner_product_one_two() -> Scalar {
    d2h(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::is_identity;

    #[test]
    fn varint_encoding() {
        assert_eq!(encode_varint(0), vec![0]);
        assert_eq!(encode_varint(127), vec![0x7f]);
        assert_eq!(encode_varint(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint(300), vec![0xac, 0x02]);
    }

    #[test]
    fn generators_are_distinct_and_nontrivial() {
        let gens = &*GENERATORS;
        assert_eq!(gens.gi.len(), BP_MAX_MN);
        assert_eq!(gens.hi.len(), BP_MAX_MN);
        assert_ne!(gens.gi[0], gens.hi[0]);
        assert_ne!(gens.gi[0], gens.gi[1]);
        assert!(!is_identity(&gens.gi[0]));
    }

    #[test]
    fn padded_width() {
        assert_eq!(padded_m(1), (1, 0));
        assert_eq!(padded_m(2), (2, 1));
        assert_eq!(padded_m(3), (4, 2));
        assert_eq!(padded_m(16), (16, 4));
    }

    #[test]
    fn amount_counting_rejects_bad_shapes() {
        let (mut proof, _, _) = make_dummy_bulletproof(&[1, 2, 3]);
        assert_eq!(n_bulletproof_amounts(std::slice::from_ref(&proof)), Some(3));
        proof.L.pop();
        assert_eq!(n_bulletproof_amounts(std::slice::from_ref(&proof)), None);
    }

    #[test]
    fn dummy_proof_shape() {
        let (proof, commitments, masks) = make_dummy_bulletproof(&[5, 6]);
        assert_eq!(proof.V.len(), 2);
        assert_eq!(proof.L.len(), BP_LOG_N + 1);
        assert_eq!(commitments.len(), 2);
        assert_eq!(masks, vec![Scalar::ONE; 2]);
    }
}
