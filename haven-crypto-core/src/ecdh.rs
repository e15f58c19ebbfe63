//! ECDH amount-blob sealing.
//!
//! Each output carries an encrypted `(mask, amount)` pair the recipient
//! opens with the shared per-output amount key. Two widths exist:
//!
//! - **Full-width** (up to `RctType::Bulletproof`): both fields are XORed
//!   with the keystream `Hs(k)`, `Hs(Hs(k))`.
//! - **Short** (`RctType::Bulletproof2` onward): the mask is omitted (the
//!   recipient recomputes it as `Hs("commitment_mask" ‖ k)`) and the amount
//!   is truncated to 8 bytes XORed with `Keccak("amount" ‖ k)`.
//!
//! Decoding recomputes the output commitment from the opened pair and must
//! reject on mismatch; that check lives in [`crate::rct::decode_rct_simple`].

use sha3::{Digest, Keccak256};

use crate::ops::hash_to_scalar;
use crate::pedersen::gen_commitment_mask;
use crate::types::rct::{EcdhTuple, Key, KEY_ZERO};

/// The 8-byte XOR pad for short amounts: `Keccak("amount" ‖ k)`.
fn short_amount_pad(amount_key: &Key) -> [u8; 8] {
    let mut hasher = Keccak256::new();
    hasher.update(b"amount");
    hasher.update(amount_key);
    let hash: [u8; 32] = hasher.finalize().into();
    let mut pad = [0u8; 8];
    pad.copy_from_slice(&hash[..8]);
    pad
}

fn xor32(value: &mut Key, pad: &Key) {
    for (v, p) in value.iter_mut().zip(pad.iter()) {
        *v ^= p;
    }
}

fn xor8(value: &mut Key, pad: &[u8; 8]) {
    for (v, p) in value.iter_mut().take(8).zip(pad.iter()) {
        *v ^= p;
    }
}

/// Seal a `(mask, amount)` blob in place with the per-output amount key.
pub fn ecdh_encode(ecdh: &mut EcdhTuple, amount_key: &Key, short_amount: bool) {
    if short_amount {
        ecdh.mask = KEY_ZERO;
        let mut amount = KEY_ZERO;
        amount[..8].copy_from_slice(&ecdh.amount[..8]);
        xor8(&mut amount, &short_amount_pad(amount_key));
        ecdh.amount = amount;
    } else {
        let first = hash_to_scalar(amount_key);
        let second = hash_to_scalar(first.as_bytes());
        xor32(&mut ecdh.mask, &first.to_bytes());
        xor32(&mut ecdh.amount, &second.to_bytes());
    }
}

/// Open a sealed blob in place. Short-amount epochs restore the mask
/// deterministically from the amount key.
pub fn ecdh_decode(ecdh: &mut EcdhTuple, amount_key: &Key, short_amount: bool) {
    if short_amount {
        ecdh.mask = gen_commitment_mask(amount_key).to_bytes();
        let mut amount = KEY_ZERO;
        amount[..8].copy_from_slice(&ecdh.amount[..8]);
        xor8(&mut amount, &short_amount_pad(amount_key));
        ecdh.amount = amount;
    } else {
        let first = hash_to_scalar(amount_key);
        let second = hash_to_scalar(first.as_bytes());
        xor32(&mut ecdh.mask, &first.to_bytes());
        xor32(&mut ecdh.amount, &second.to_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{d2h, h2d, random_scalar};

    #[test]
    fn full_width_round_trip() {
        let amount_key = random_scalar().to_bytes();
        let mask = random_scalar();
        let mut ecdh = EcdhTuple {
            mask: mask.to_bytes(),
            amount: d2h(123_456_789).to_bytes(),
        };

        ecdh_encode(&mut ecdh, &amount_key, false);
        assert_ne!(ecdh.mask, mask.to_bytes());

        ecdh_decode(&mut ecdh, &amount_key, false);
        assert_eq!(ecdh.mask, mask.to_bytes());
        assert_eq!(h2d(&ecdh.amount), 123_456_789);
    }

    #[test]
    fn short_amount_round_trip() {
        let amount_key = random_scalar().to_bytes();
        let mut ecdh = EcdhTuple {
            mask: gen_commitment_mask(&amount_key).to_bytes(),
            amount: d2h(u64::MAX).to_bytes(),
        };

        ecdh_encode(&mut ecdh, &amount_key, true);
        assert_eq!(ecdh.mask, KEY_ZERO);
        assert!(ecdh.amount[8..].iter().all(|&b| b == 0));

        ecdh_decode(&mut ecdh, &amount_key, true);
        assert_eq!(ecdh.mask, gen_commitment_mask(&amount_key).to_bytes());
        assert_eq!(h2d(&ecdh.amount), u64::MAX);
    }

    #[test]
    fn short_amount_zero_round_trip() {
        let amount_key = [9u8; 32];
        let mut ecdh = EcdhTuple {
            mask: KEY_ZERO,
            amount: d2h(0).to_bytes(),
        };
        ecdh_encode(&mut ecdh, &amount_key, true);
        ecdh_decode(&mut ecdh, &amount_key, true);
        assert_eq!(h2d(&ecdh.amount), 0);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let amount_key = [1u8; 32];
        let wrong_key = [2u8; 32];
        let mut ecdh = EcdhTuple {
            mask: KEY_ZERO,
            amount: d2h(42).to_bytes(),
        };
        ecdh_encode(&mut ecdh, &amount_key, true);
        ecdh_decode(&mut ecdh, &wrong_key, true);
        assert_ne!(h2d(&ecdh.amount), 42);
    }
}
