//! Legacy Borromean range proofs (verification only).
//!
//! Pre-Bulletproof epochs prove an amount lies in `[0, 2^64)` with 64
//! bit-commitments `Ci`, each committing to 0 or `2^i`, tied together by a
//! Borromean ring signature. New proofs of this form are never produced;
//! the verifier stays frozen so historical blocks keep validating.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use tracing::debug;

use crate::ops::{decode_point, hash_to_scalar, scalar_mod_order};
use crate::pedersen::H2;
use crate::types::rct::{BoroSig, Key, RangeSig};

/// Verify a Borromean ring over the bit-commitment pairs `(P1, P2)`.
#[must_use]
pub fn ver_borromean(bb: &BoroSig, p1: &[EdwardsPoint; 64], p2: &[EdwardsPoint; 64]) -> bool {
    let ee = scalar_mod_order(&bb.ee);
    let mut lv1 = Vec::with_capacity(64 * 32);
    for i in 0..64 {
        let s0 = scalar_mod_order(&bb.s0[i]);
        let ll = EdwardsPoint::vartime_multiscalar_mul([s0, ee], [ED25519_BASEPOINT_POINT, p1[i]]);
        let chash = hash_to_scalar(ll.compress().as_bytes());
        let s1 = scalar_mod_order(&bb.s1[i]);
        let l =
            EdwardsPoint::vartime_multiscalar_mul([s1, chash], [ED25519_BASEPOINT_POINT, p2[i]]);
        lv1.extend_from_slice(l.compress().as_bytes());
    }
    let ee_computed = hash_to_scalar(&lv1);
    ee_computed == ee
}

/// Verify a legacy range signature: the bit commitments must sum to the
/// output commitment `C`, and the Borromean ring must show each commits to
/// 0 or its power of two.
#[must_use]
pub fn ver_range(c: &Key, sig: &RangeSig) -> bool {
    let c_point = match decode_point(c) {
        Some(p) => p,
        None => {
            debug!("range signature rejected: bad output commitment");
            return false;
        }
    };

    let mut ci = [crate::ops::identity(); 64];
    let mut ci_minus_h2 = [crate::ops::identity(); 64];
    let mut sum = crate::ops::identity();
    for i in 0..64 {
        let point = match decode_point(&sig.Ci[i]) {
            Some(p) => p,
            None => {
                debug!("range signature rejected: bad bit commitment");
                return false;
            }
        };
        ci[i] = point;
        ci_minus_h2[i] = point - H2[i];
        sum += point;
    }

    if sum != c_point {
        debug!("range signature rejected: bit commitments do not sum to C");
        return false;
    }
    ver_borromean(&sig.asig, &ci, &ci_minus_h2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{d2h, random_scalar, scalarmult_base};
    use crate::types::rct::{Key64, KEY_ZERO};
    use curve25519_dalek::scalar::Scalar;

    /// Legacy prover, reproduced here only to exercise the verifier.
    fn prove_range(amount: u64) -> (Key, RangeSig) {
        let mut ci: Key64 = [KEY_ZERO; 64];
        let mut ci_points = [crate::ops::identity(); 64];
        let mut masks = [Scalar::ZERO; 64];
        let mut sum_mask = Scalar::ZERO;
        for i in 0..64 {
            masks[i] = random_scalar();
            sum_mask += masks[i];
            let bit = (amount >> i) & 1;
            let mut point = scalarmult_base(&masks[i]);
            if bit == 1 {
                point += H2[i];
            }
            ci_points[i] = point;
            ci[i] = point.compress().to_bytes();
        }
        let c = scalarmult_base(&sum_mask) + d2h(amount) * *crate::pedersen::H;

        // Borromean ring per bit: the real branch is (Ci − bit·H2[i]).
        let mut alpha = [Scalar::ZERO; 64];
        let mut s1: Key64 = [KEY_ZERO; 64];
        let mut lv1 = Vec::with_capacity(64 * 32);
        for i in 0..64 {
            alpha[i] = random_scalar();
            let l = scalarmult_base(&alpha[i]);
            let bit = (amount >> i) & 1;
            if bit == 1 {
                // Real key is in P2 = Ci − H2: commit directly.
                lv1.extend_from_slice(l.compress().as_bytes());
            } else {
                // Real key is in P1: fix LL now, simulate the second leg.
                let chash = hash_to_scalar(l.compress().as_bytes());
                let s = random_scalar();
                s1[i] = s.to_bytes();
                let p2 = ci_points[i] - H2[i];
                let sim = scalarmult_base(&s) + chash * p2;
                lv1.extend_from_slice(sim.compress().as_bytes());
            }
        }
        let ee = hash_to_scalar(&lv1);
        let mut s0: Key64 = [KEY_ZERO; 64];
        for i in 0..64 {
            let bit = (amount >> i) & 1;
            if bit == 1 {
                // Simulate the first leg, close on the second.
                let s = random_scalar();
                s0[i] = s.to_bytes();
                let ll = scalarmult_base(&s) + ee * ci_points[i];
                let chash = hash_to_scalar(ll.compress().as_bytes());
                s1[i] = (alpha[i] - chash * masks[i]).to_bytes();
            } else {
                // Close on the first leg: P1 = Ci = mask·G.
                s0[i] = (alpha[i] - ee * masks[i]).to_bytes();
            }
        }

        (
            c.compress().to_bytes(),
            RangeSig {
                asig: BoroSig {
                    s0,
                    s1,
                    ee: ee.to_bytes(),
                },
                Ci: ci,
            },
        )
    }

    #[test]
    fn verifies_valid_range() {
        for amount in [0u64, 1, 255, 1_000_000_000_000, u64::MAX] {
            let (c, sig) = prove_range(amount);
            assert!(ver_range(&c, &sig), "amount {amount} should verify");
        }
    }

    #[test]
    fn rejects_wrong_commitment() {
        let (_, sig) = prove_range(1234);
        let other = scalarmult_base(&random_scalar()).compress().to_bytes();
        assert!(!ver_range(&other, &sig));
    }

    #[test]
    fn rejects_tampered_signature() {
        let (c, mut sig) = prove_range(5000);
        sig.asig.ee[0] ^= 1;
        assert!(!ver_range(&c, &sig));
    }
}
