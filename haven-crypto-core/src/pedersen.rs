//! Pedersen commitments and deterministic commitment masks.
//!
//! Commitments are `C = mask·G + amount·H` over the two independent
//! generators `G` (the Ed25519 basepoint) and `H` (the hash-to-point of
//! `G`, torsion-cleared). Published commitments carry an `INV_EIGHT` factor
//! on the wire.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use once_cell::sync::Lazy;
use sha3::{Digest, Keccak256};

use crate::ops::{d2h, invert, scalarmult_base};
use crate::types::rct::Key;

/// Compressed encoding of the amount generator `H = 8·hash_to_point(G)`.
pub const H_BYTES: Key = [
    0x8b, 0x65, 0x59, 0x70, 0x15, 0x37, 0x99, 0xaf, 0x2a, 0xea, 0xdc, 0x9f, 0xf1, 0xad, 0xd0, 0xea,
    0x6c, 0x72, 0x51, 0xd5, 0x41, 0x54, 0xcf, 0xa9, 0x2c, 0x17, 0x3a, 0x0d, 0xd3, 0x9c, 0x1f, 0x94,
];

/// The amount generator `H`.
pub static H: Lazy<EdwardsPoint> = Lazy::new(|| {
    CompressedEdwardsY(H_BYTES)
        .decompress()
        .expect("H generator encoding is valid")
});

/// The scalar inverse of 8, applied to published points to make torsion
/// clearing on read cheap.
pub static INV_EIGHT: Lazy<Scalar> = Lazy::new(|| invert(&d2h(8)));

/// The doubling table `H2[i] = 2^i · H`, used by the legacy Borromean
/// range-proof verifier.
pub static H2: Lazy<[EdwardsPoint; 64]> = Lazy::new(|| {
    let mut table = [*H; 64];
    for i in 1..64 {
        table[i] = table[i - 1] + table[i - 1];
    }
    table
});

/// `genC`: the Pedersen commitment `mask·G + amount·H`.
#[must_use]
pub fn gen_commitment(mask: &Scalar, amount: u64) -> EdwardsPoint {
    scalarmult_base(mask) + d2h(amount) * *H
}

/// [`gen_commitment`] in wire form.
#[must_use]
pub fn gen_commitment_key(mask: &Scalar, amount: u64) -> Key {
    gen_commitment(mask, amount).compress().to_bytes()
}

/// `amount·H`, the commitment a verifier reconstructs for a cleartext fee.
#[must_use]
pub fn scalarmult_h(amount: u64) -> EdwardsPoint {
    d2h(amount) * *H
}

/// Deterministic commitment mask `Hs("commitment_mask" ‖ amount_key)`.
///
/// Deterministic so that a hardware device can recompute the range-proof
/// masks from the per-output amount keys during signing.
#[must_use]
pub fn gen_commitment_mask(amount_key: &Key) -> Scalar {
    let mut hasher = Keccak256::new();
    hasher.update(b"commitment_mask");
    hasher.update(amount_key);
    let hash: [u8; 32] = hasher.finalize().into();
    Scalar::from_bytes_mod_order(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{hash_to_point, is_identity, scalarmult8};
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;

    #[test]
    fn h_is_eight_times_hash_of_basepoint() {
        let hp = hash_to_point(&ED25519_BASEPOINT_POINT.compress().to_bytes());
        // hash_to_point already clears torsion with a ·8.
        assert_eq!(hp, *H);
    }

    #[test]
    fn h_encoding_matches_reference_vector() {
        assert_eq!(
            hex::encode(H_BYTES),
            "8b655970153799af2aeadc9ff1add0ea6c7251d54154cfa92c173a0dd39c1f94"
        );
    }

    #[test]
    fn inv_eight_cancels() {
        assert_eq!(*INV_EIGHT * d2h(8), Scalar::ONE);
        let c = gen_commitment(&d2h(3), 77);
        assert_eq!(scalarmult8(&(c * *INV_EIGHT)), c);
    }

    #[test]
    fn h2_table_doubles() {
        assert_eq!(H2[0], *H);
        assert_eq!(H2[1], *H + *H);
        assert_eq!(H2[63], d2h(1u64 << 63) * *H);
    }

    #[test]
    fn commitment_is_homomorphic() {
        let a = gen_commitment(&d2h(5), 100);
        let b = gen_commitment(&d2h(7), 200);
        let sum = gen_commitment(&d2h(12), 300);
        assert_eq!(a + b, sum);
    }

    #[test]
    fn zero_mask_zero_amount_commits_to_identity() {
        assert!(is_identity(&gen_commitment(&Scalar::ZERO, 0)));
    }

    #[test]
    fn commitment_mask_is_deterministic_and_keyed() {
        let k1 = [1u8; 32];
        let k2 = [2u8; 32];
        assert_eq!(gen_commitment_mask(&k1), gen_commitment_mask(&k1));
        assert_ne!(gen_commitment_mask(&k1), gen_commitment_mask(&k2));
    }
}
