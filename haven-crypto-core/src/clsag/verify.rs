//! CLSAG signature verification.
//!
//! Walks the whole ring from `c1`, recomputing every `(L, R)` pair, and
//! accepts only when the challenge closes back onto `c1`. All failures
//! (malformed scalars, bad points, identity key images, a broken ring)
//! collapse into `false` with a diagnostic log line.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use tracing::debug;

use super::hash::{aggregation_hashes, RoundHash};
use crate::ops::{decode_point, decode_scalar, hash_to_point, is_identity, scalarmult8};
use crate::types::rct::{Clsag, CtKey, Key};

/// Verify one CLSAG against its mix-ring and pseudo-output commitment.
#[must_use]
#[allow(non_snake_case)]
pub fn ver_rct_clsag_simple(message: &Key, sig: &Clsag, pubs: &[CtKey], c_offset: &Key) -> bool {
    let n = pubs.len();
    if n == 0 {
        debug!("CLSAG rejected: empty ring");
        return false;
    }
    if sig.s.len() != n {
        debug!("CLSAG rejected: scalar vector size mismatch");
        return false;
    }

    let mut s_scalars = Vec::with_capacity(n);
    for s in &sig.s {
        match decode_scalar(s) {
            Some(scalar) => s_scalars.push(scalar),
            None => {
                debug!("CLSAG rejected: non-canonical response scalar");
                return false;
            }
        }
    }
    let c1 = match decode_scalar(&sig.c1) {
        Some(c) => c,
        None => {
            debug!("CLSAG rejected: non-canonical challenge");
            return false;
        }
    };

    let I_point = match decode_point(&sig.I) {
        Some(p) if !is_identity(&p) => p,
        _ => {
            debug!("CLSAG rejected: bad key image");
            return false;
        }
    };
    let D_point = match decode_point(&sig.D) {
        Some(p) => {
            let d8 = scalarmult8(&p);
            if is_identity(&d8) {
                debug!("CLSAG rejected: bad auxiliary key image");
                return false;
            }
            d8
        }
        None => {
            debug!("CLSAG rejected: bad auxiliary key image encoding");
            return false;
        }
    };
    let offset_point = match decode_point(c_offset) {
        Some(p) => p,
        None => {
            debug!("CLSAG rejected: bad pseudo-output commitment");
            return false;
        }
    };

    let mut ring_keys = Vec::with_capacity(n);
    let mut ring_commitments = Vec::with_capacity(n);
    let mut key_points = Vec::with_capacity(n);
    let mut commitment_points = Vec::with_capacity(n);
    for pk in pubs {
        ring_keys.push(pk.dest);
        ring_commitments.push(pk.mask);
        match (decode_point(&pk.dest), decode_point(&pk.mask)) {
            (Some(dest), Some(mask)) => {
                key_points.push(dest);
                commitment_points.push(mask - offset_point);
            }
            _ => {
                debug!("CLSAG rejected: undecodable ring member");
                return false;
            }
        }
    }

    let (mu_p, mu_c) =
        aggregation_hashes(&ring_keys, &ring_commitments, &sig.I, &sig.D, c_offset);
    let round = RoundHash::new(&ring_keys, &ring_commitments, c_offset, message);

    let mut c = c1;
    for i in 0..n {
        let c_p = mu_p * c;
        let c_c = mu_c * c;

        let L = EdwardsPoint::vartime_multiscalar_mul(
            [s_scalars[i], c_p, c_c],
            [ED25519_BASEPOINT_POINT, key_points[i], commitment_points[i]],
        );
        let hp_i = hash_to_point(&ring_keys[i]);
        let R = EdwardsPoint::vartime_multiscalar_mul(
            [s_scalars[i], c_p, c_c],
            [hp_i, I_point, D_point],
        );

        c = round.challenge(&L.compress().to_bytes(), &R.compress().to_bytes());
        if c == Scalar::ZERO {
            debug!("CLSAG rejected: zero challenge");
            return false;
        }
    }

    if c == c1 {
        true
    } else {
        debug!("CLSAG rejected: ring did not close");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clsag::sign::prove_rct_clsag_simple;
    use crate::ops::{random_scalar, scalarmult_base};
    use crate::pedersen::gen_commitment_key;
    use crate::types::rct::KEY_ZERO;

    fn signed_fixture(n: usize, l: usize) -> (Key, Vec<CtKey>, Key, Clsag) {
        let message = [0x42u8; 32];
        let spend = random_scalar();
        let mask = random_scalar();
        let amount = 250u64;
        let mut ring = Vec::with_capacity(n);
        for i in 0..n {
            if i == l {
                ring.push(CtKey {
                    dest: scalarmult_base(&spend).compress().to_bytes(),
                    mask: gen_commitment_key(&mask, amount),
                });
            } else {
                ring.push(CtKey {
                    dest: scalarmult_base(&random_scalar()).compress().to_bytes(),
                    mask: gen_commitment_key(&random_scalar(), amount),
                });
            }
        }
        let pseudo_mask = random_scalar();
        let pseudo_out = gen_commitment_key(&pseudo_mask, amount);
        let in_sk = CtKey {
            dest: spend.to_bytes(),
            mask: mask.to_bytes(),
        };
        let out = prove_rct_clsag_simple(&message, &ring, &in_sk, &pseudo_mask, &pseudo_out, None, l)
            .unwrap();
        (message, ring, pseudo_out, out.sig)
    }

    #[test]
    fn accepts_valid_signature() {
        let (message, ring, pseudo_out, sig) = signed_fixture(11, 7);
        assert!(ver_rct_clsag_simple(&message, &sig, &ring, &pseudo_out));
    }

    #[test]
    fn rejects_tampered_response() {
        let (message, ring, pseudo_out, mut sig) = signed_fixture(4, 1);
        sig.s[2][0] ^= 1;
        assert!(!ver_rct_clsag_simple(&message, &sig, &ring, &pseudo_out));
    }

    #[test]
    fn rejects_tampered_challenge() {
        let (message, ring, pseudo_out, mut sig) = signed_fixture(4, 0);
        sig.c1[0] ^= 1;
        assert!(!ver_rct_clsag_simple(&message, &sig, &ring, &pseudo_out));
    }

    #[test]
    fn rejects_identity_key_image() {
        let (message, ring, pseudo_out, mut sig) = signed_fixture(4, 3);
        let mut identity = KEY_ZERO;
        identity[0] = 1;
        sig.I = identity;
        assert!(!ver_rct_clsag_simple(&message, &sig, &ring, &pseudo_out));
    }

    #[test]
    fn rejects_swapped_pseudo_out() {
        let (message, ring, _pseudo_out, sig) = signed_fixture(4, 2);
        let other = gen_commitment_key(&random_scalar(), 250);
        assert!(!ver_rct_clsag_simple(&message, &sig, &ring, &other));
    }

    #[test]
    fn rejects_wrong_ring_size() {
        let (message, mut ring, pseudo_out, sig) = signed_fixture(4, 2);
        ring.pop();
        assert!(!ver_rct_clsag_simple(&message, &sig, &ring, &pseudo_out));
    }
}
