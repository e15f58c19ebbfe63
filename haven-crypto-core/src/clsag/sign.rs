//! CLSAG signature generation.
//!
//! See Goodell et al., <https://eprint.iacr.org/2019/654>. The signer holds
//! the spend key `p` at secret index `l` and the commitment-mask delta
//! `z = mask − a` relative to the input's pseudo-output commitment
//! `C_offset`. Ring keys are set up so that
//!
//! ```text
//! P[l] == p·G
//! C[i] == C_nonzero[i] − C_offset, with C[l] == z·G
//! ```

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroize;

use super::hash::{aggregation_hashes, RoundHash};
use crate::ops::{decode_point, decode_scalar, hash_to_point, random_scalar, scalarmult_base};
use crate::pedersen::INV_EIGHT;
use crate::types::errors::{RctError, RctResult};
use crate::types::rct::{Clsag, CtKey, Key, MultisigKLRki, KEY_ZERO};

/// A produced CLSAG plus the per-ring values cosigners need to complete a
/// multisig signature.
pub struct ClsagOutput {
    /// The signature.
    pub sig: Clsag,
    /// The challenge at the real index, exported for multisig completion.
    pub closing_challenge: Key,
    /// The `μ_P` aggregation coefficient, exported for multisig completion.
    pub mu_p: Key,
}

/// Generate a CLSAG over an explicit ring.
///
/// `p` is the spend secret for `ring_keys[l]`, `z` the commitment-mask
/// delta, `commitments_nonzero` the ring commitments and `pseudo_out` the
/// offset subtracted from each of them. When a multisig nonce share
/// `klrki` is supplied, its pre-committed `(L, R)` replace the locally
/// generated nonce commitment and its aggregated key image is used as `I`.
#[allow(non_snake_case)]
pub fn clsag_sign(
    message: &Key,
    p: &Scalar,
    ring_keys: &[Key],
    z: &Scalar,
    commitments_nonzero: &[Key],
    pseudo_out: &Key,
    l: usize,
    klrki: Option<&MultisigKLRki>,
) -> RctResult<ClsagOutput> {
    let n = ring_keys.len();
    if n == 0 {
        return Err(RctError::EmptyInputs);
    }
    if commitments_nonzero.len() != n {
        return Err(RctError::LengthMismatch {
            what: "ring commitments",
            expected: n,
            actual: commitments_nonzero.len(),
        });
    }
    if l >= n {
        return Err(RctError::IndexOutOfRange { index: l, size: n });
    }

    // Decompress the ring once; L/R computations need the points.
    let mut ring_points = Vec::with_capacity(n);
    for key in ring_keys {
        ring_points.push(decode_point(key).ok_or(RctError::InvalidPoint("ring key"))?);
    }
    let offset_point =
        decode_point(pseudo_out).ok_or(RctError::InvalidPoint("pseudo-output commitment"))?;
    let mut commitment_points = Vec::with_capacity(n);
    for c in commitments_nonzero {
        let point = decode_point(c).ok_or(RctError::InvalidPoint("ring commitment"))?;
        commitment_points.push(point - offset_point);
    }

    // Key images off the real member's hash-to-point generator.
    let hp_l = hash_to_point(&ring_keys[l]);
    let D_point = z * hp_l;
    let I: Key = match klrki {
        Some(shares) => shares.ki,
        None => (p * hp_l).compress().to_bytes(),
    };
    let D_inv8: Key = (D_point * *INV_EIGHT).compress().to_bytes();

    let (mu_p, mu_c) = aggregation_hashes(ring_keys, commitments_nonzero, &I, &D_inv8, pseudo_out);

    let I_point = decode_point(&I).ok_or(RctError::InvalidPoint("key image"))?;

    // Nonce commitment: fresh, or the pre-committed multisig aggregate.
    let mut a = random_scalar();
    let (aG, aH): (Key, Key) = match klrki {
        Some(shares) => {
            a.zeroize();
            a = decode_scalar(&shares.k).ok_or(RctError::InvalidScalar("multisig nonce"))?;
            (shares.L, shares.R)
        }
        None => (
            scalarmult_base(&a).compress().to_bytes(),
            (a * hp_l).compress().to_bytes(),
        ),
    };

    let round = RoundHash::new(ring_keys, commitments_nonzero, pseudo_out, message);
    let mut c = round.challenge(&aG, &aH);

    let mut sig = Clsag {
        s: vec![KEY_ZERO; n],
        c1: KEY_ZERO,
        I,
        D: D_inv8,
    };

    let mut i = (l + 1) % n;
    if i == 0 {
        sig.c1 = c.to_bytes();
    }

    // Decoy positions.
    while i != l {
        let s_i = random_scalar();
        sig.s[i] = s_i.to_bytes();
        let c_p = mu_p * c;
        let c_c = mu_c * c;

        let hp_i = hash_to_point(&ring_keys[i]);
        let L: EdwardsPoint =
            &s_i * ED25519_BASEPOINT_TABLE + c_p * ring_points[i] + c_c * commitment_points[i];
        let R: EdwardsPoint = s_i * hp_i + c_p * I_point + c_c * D_point;

        c = round.challenge(&L.compress().to_bytes(), &R.compress().to_bytes());
        i = (i + 1) % n;
        if i == 0 {
            sig.c1 = c.to_bytes();
        }
    }

    // Close the ring: s[l] = a − c·(μ_P·p + μ_C·z).
    let mut combined = mu_p * p + mu_c * z;
    sig.s[l] = (a - c * combined).to_bytes();
    combined.zeroize();
    a.zeroize();

    Ok(ClsagOutput {
        sig,
        closing_challenge: c.to_bytes(),
        mu_p: mu_p.to_bytes(),
    })
}

/// Produce the CLSAG for one input of a simple RCT signature.
///
/// `in_sk` holds the input's spend secret and commitment mask as scalars;
/// `a` is the pseudo-output mask, `pseudo_out` the pseudo-output
/// commitment. The transient `(p, z)` pair is wiped once the ring closes.
pub fn prove_rct_clsag_simple(
    message: &Key,
    ring: &[CtKey],
    in_sk: &CtKey,
    a: &Scalar,
    pseudo_out: &Key,
    klrki: Option<&MultisigKLRki>,
    index: usize,
) -> RctResult<ClsagOutput> {
    if ring.is_empty() {
        return Err(RctError::EmptyInputs);
    }

    let ring_keys: Vec<Key> = ring.iter().map(|k| k.dest).collect();
    let commitments: Vec<Key> = ring.iter().map(|k| k.mask).collect();

    let mut p = decode_scalar(&in_sk.dest).ok_or(RctError::InvalidScalar("input spend secret"))?;
    let mask = decode_scalar(&in_sk.mask).ok_or(RctError::InvalidScalar("input mask"))?;
    let mut z = mask - a;

    let result = clsag_sign(
        message,
        &p,
        &ring_keys,
        &z,
        &commitments,
        pseudo_out,
        index,
        klrki,
    );

    p.zeroize();
    z.zeroize();

    result
}
