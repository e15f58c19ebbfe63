//! Scalar and group utilities over Curve25519.
//!
//! Wire values are 32-byte strings ([`Key`]); this module converts between
//! them and `curve25519-dalek` scalars/points, and hosts the two
//! domain-separated hashes everything else is built on. Operations on secret
//! scalars use dalek's constant-time arithmetic; the explicitly `vartime`
//! multiscalar paths are reserved for verification of public data.

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{Identity, IsIdentity};
use rand_core::OsRng;
use sha3::{Digest, Keccak256};

use crate::types::rct::Key;

/// Keccak-256 of arbitrary bytes (`cn_fast_hash`).
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 reduced into a scalar mod ℓ (`hash_to_scalar`).
#[must_use]
pub fn hash_to_scalar(data: &[u8]) -> Scalar {
    Scalar::from_bytes_mod_order(keccak256(data))
}

/// `hash_to_scalar` over a concatenated key vector, the form every
/// signature challenge uses.
#[must_use]
pub fn hash_to_scalar_keys(keys: &[Key]) -> Scalar {
    let mut data = Vec::with_capacity(keys.len() * 32);
    for k in keys {
        data.extend_from_slice(k);
    }
    hash_to_scalar(&data)
}

/// Keccak-based map of a public key onto the prime-order subgroup
/// (`Hp`, the key-image generator bound to `P`).
#[must_use]
pub fn hash_to_point(key: &Key) -> EdwardsPoint {
    monero_generators::hash_to_point(*key)
}

/// Decompress a wire key into a point. `None` on any invalid encoding.
#[must_use]
pub fn decode_point(key: &Key) -> Option<EdwardsPoint> {
    CompressedEdwardsY(*key).decompress()
}

/// Decode a wire key as a canonical scalar (`sc_check`). `None` when the
/// value is ≥ ℓ.
#[must_use]
pub fn decode_scalar(key: &Key) -> Option<Scalar> {
    Option::<Scalar>::from(Scalar::from_canonical_bytes(*key))
}

/// Interpret a wire key as a scalar, reducing mod ℓ.
#[must_use]
pub fn scalar_mod_order(key: &Key) -> Scalar {
    Scalar::from_bytes_mod_order(*key)
}

/// Lift a 64-bit amount into a scalar (`d2h`).
#[must_use]
pub fn d2h(amount: u64) -> Scalar {
    Scalar::from(amount)
}

/// Read the low 64 bits of a scalar as an amount (`h2d`).
#[must_use]
pub fn h2d(key: &Key) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&key[..8]);
    u64::from_le_bytes(bytes)
}

/// A uniformly random scalar (`skGen`).
#[must_use]
pub fn random_scalar() -> Scalar {
    Scalar::random(&mut OsRng)
}

/// Fixed-base multiplication `s·G`.
#[must_use]
pub fn scalarmult_base(s: &Scalar) -> EdwardsPoint {
    s * ED25519_BASEPOINT_TABLE
}

/// Multiply a point by 8, clearing the published `INV_EIGHT` factor and any
/// small-subgroup component.
#[must_use]
pub fn scalarmult8(p: &EdwardsPoint) -> EdwardsPoint {
    p.mul_by_cofactor()
}

/// The group identity.
#[must_use]
pub fn identity() -> EdwardsPoint {
    EdwardsPoint::identity()
}

/// True when a decompressed point is the identity.
#[must_use]
pub fn is_identity(p: &EdwardsPoint) -> bool {
    p.is_identity()
}

/// `y^(2^n) · x`: square `y` n times, then multiply by `x`. Helper for the
/// fixed inversion ladder.
#[must_use]
pub fn sm(mut y: Scalar, n: u32, x: &Scalar) -> Scalar {
    for _ in 0..n {
        y = y * y;
    }
    y * x
}

/// Scalar inversion by the fixed addition chain for `x^(ℓ−2)`.
///
/// The chain is verified on every call: `x · invert(x)` must equal 1.
///
/// # Panics
///
/// Panics when the self-check fails (including `x == 0`); such a failure is
/// an internal invariant violation, never a recoverable input error. Callers
/// inverting externally supplied values must range-check them first.
#[must_use]
pub fn invert(x: &Scalar) -> Scalar {
    let _1 = *x;
    let _10 = _1 * _1;
    let _100 = _10 * _10;
    let _11 = _10 * _1;
    let _101 = _10 * _11;
    let _111 = _10 * _101;
    let _1001 = _10 * _111;
    let _1011 = _10 * _1001;
    let _1111 = _100 * _1011;

    let mut inv = _1111 * _1;

    inv = sm(inv, 123 + 3, &_101);
    inv = sm(inv, 2 + 2, &_11);
    inv = sm(inv, 1 + 4, &_1111);
    inv = sm(inv, 1 + 4, &_1111);
    inv = sm(inv, 4, &_1001);
    inv = sm(inv, 2, &_11);
    inv = sm(inv, 1 + 4, &_1111);
    inv = sm(inv, 1 + 3, &_101);
    inv = sm(inv, 3 + 3, &_101);
    inv = sm(inv, 3, &_111);
    inv = sm(inv, 1 + 4, &_1111);
    inv = sm(inv, 2 + 3, &_111);
    inv = sm(inv, 2 + 2, &_11);
    inv = sm(inv, 1 + 4, &_1011);
    inv = sm(inv, 2 + 4, &_1011);
    inv = sm(inv, 6 + 4, &_1001);
    inv = sm(inv, 2 + 2, &_11);
    inv = sm(inv, 3 + 2, &_11);
    inv = sm(inv, 3 + 2, &_11);
    inv = sm(inv, 1 + 4, &_1001);
    inv = sm(inv, 1 + 3, &_111);
    inv = sm(inv, 2 + 4, &_1111);
    inv = sm(inv, 1 + 4, &_1011);
    inv = sm(inv, 3, &_101);
    inv = sm(inv, 2 + 4, &_1111);
    inv = sm(inv, 3, &_101);
    inv = sm(inv, 1 + 2, &_11);

    assert_eq!(inv * x, Scalar::ONE, "scalar inversion self-check failed");
    inv
}
