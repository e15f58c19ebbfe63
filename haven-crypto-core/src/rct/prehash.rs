//! The pre-MLSAG hash: the message every ring signature binds.
//!
//! `prehash = H(message ‖ H(rct_base) ‖ H(range_proof_components))`, with
//! the final step routed through the device so hardware wallets can
//! display output details while hashing.
//!
//! The signature-base byte layout is the engine's canonical one
//! (CryptoNote varints, field set fixed by the epoch tag):
//!
//! ```text
//! varint(type)
//! varint(txn_fee) ‖ varint(txn_offshore_fee)
//! legacy epochs: varint per-colour fee duplicates (usd, xasset)
//! Simple epoch:  pseudo_outs (32 bytes each)
//! per output:    ecdh blob: amount[0..8] (short epochs)
//!                            or mask ‖ amount (full width)
//! per output:    out_pk mask (plus usd/xasset columns on legacy epochs)
//! Haven2/3:      mask_sums (32 bytes each)
//! ```
//!
//! Bulletproof `V` entries are not hashed on their own; they are a fixed
//! transform of the `out_pk` masks already covered by the base.

use crate::device::Device;
use crate::ops::keccak256;
use crate::types::errors::{RctError, RctResult};
use crate::types::rct::{Key, RctSig, RctType};

fn push_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Serialize the signature base for hashing.
#[must_use]
pub fn serialize_rct_base(rv: &RctSig) -> Vec<u8> {
    let rct_type = rv.rct_type();
    let mut buf = Vec::with_capacity(64 + rv.ecdh_info.len() * 64 + rv.out_pk.len() * 96);
    push_varint(&mut buf, u64::from(rct_type.to_u8()));
    if rct_type == RctType::Null {
        return buf;
    }

    push_varint(&mut buf, rv.txn_fee);
    push_varint(&mut buf, rv.txn_offshore_fee);

    let consolidated = matches!(rct_type, RctType::Haven2 | RctType::Haven3);
    if !consolidated {
        push_varint(&mut buf, rv.txn_fee_usd);
        push_varint(&mut buf, rv.txn_offshore_fee_usd);
        push_varint(&mut buf, rv.txn_fee_xasset);
        push_varint(&mut buf, rv.txn_offshore_fee_xasset);
    }

    if rct_type == RctType::Simple {
        for pseudo in &rv.pseudo_outs {
            buf.extend_from_slice(pseudo);
        }
    }

    let short = rct_type.short_amount();
    for ecdh in &rv.ecdh_info {
        if short {
            buf.extend_from_slice(&ecdh.amount[..8]);
        } else {
            buf.extend_from_slice(&ecdh.mask);
            buf.extend_from_slice(&ecdh.amount);
        }
    }

    for out in &rv.out_pk {
        buf.extend_from_slice(&out.mask);
    }
    if !consolidated {
        for out in &rv.out_pk_usd {
            buf.extend_from_slice(&out.mask);
        }
        for out in &rv.out_pk_xasset {
            buf.extend_from_slice(&out.mask);
        }
    }

    if consolidated {
        for sum in &rv.mask_sums {
            buf.extend_from_slice(sum);
        }
    }

    buf
}

/// Compute the message bound into every ring signature of `rv`.
pub fn get_pre_mlsag_hash<D: Device>(rv: &RctSig, device: &D) -> RctResult<Key> {
    if rv.mix_ring.is_empty() {
        return Err(RctError::EmptyInputs);
    }
    let rct_type = rv.rct_type();
    let inputs = if rct_type.is_simple() {
        rv.mix_ring.len()
    } else {
        rv.mix_ring[0].len()
    };
    let outputs = rv.ecdh_info.len();

    let base_blob = serialize_rct_base(rv);

    let mut hashes: Vec<Key> = Vec::with_capacity(3);
    hashes.push(rv.message);
    hashes.push(keccak256(&base_blob));

    // Range-proof components, flat 32-byte keys in field order.
    let mut kv: Vec<u8> = Vec::new();
    if rct_type.is_bulletproof() {
        kv.reserve((6 * 2 + 9) * 32 * rv.p.bulletproofs.len());
        for proof in &rv.p.bulletproofs {
            kv.extend_from_slice(&proof.A);
            kv.extend_from_slice(&proof.S);
            kv.extend_from_slice(&proof.T1);
            kv.extend_from_slice(&proof.T2);
            kv.extend_from_slice(&proof.taux);
            kv.extend_from_slice(&proof.mu);
            for l in &proof.L {
                kv.extend_from_slice(l);
            }
            for r in &proof.R {
                kv.extend_from_slice(r);
            }
            kv.extend_from_slice(&proof.a);
            kv.extend_from_slice(&proof.b);
            kv.extend_from_slice(&proof.t);
        }
    } else {
        kv.reserve((64 * 3 + 1) * 32 * rv.p.range_sigs.len());
        for sig in &rv.p.range_sigs {
            for s0 in &sig.asig.s0 {
                kv.extend_from_slice(s0);
            }
            for s1 in &sig.asig.s1 {
                kv.extend_from_slice(s1);
            }
            kv.extend_from_slice(&sig.asig.ee);
            for ci in &sig.Ci {
                kv.extend_from_slice(ci);
            }
        }
    }
    hashes.push(keccak256(&kv));

    Ok(device.mlsag_prehash(&base_blob, inputs, outputs, &hashes, &rv.out_pk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SoftwareDevice;
    use crate::types::rct::{CtKey, EcdhTuple};

    fn minimal_sig(rct_type: RctType) -> RctSig {
        RctSig {
            rct_type: Some(rct_type),
            message: [7u8; 32],
            mix_ring: vec![vec![CtKey::zero(); 3]],
            ecdh_info: vec![EcdhTuple::zero()],
            out_pk: vec![CtKey::zero()],
            txn_fee: 100,
            ..Default::default()
        }
    }

    #[test]
    fn base_serialization_starts_with_type_tag() {
        let rv = minimal_sig(RctType::Haven3);
        let blob = serialize_rct_base(&rv);
        assert_eq!(blob[0], RctType::Haven3.to_u8());
    }

    #[test]
    fn haven_epochs_skip_per_colour_fees() {
        let legacy = serialize_rct_base(&minimal_sig(RctType::Clsag));
        let haven = serialize_rct_base(&minimal_sig(RctType::Haven3));
        assert!(legacy.len() > haven.len());
    }

    #[test]
    fn prehash_depends_on_fee() {
        let device = SoftwareDevice::new();
        let mut rv = minimal_sig(RctType::Haven3);
        let a = get_pre_mlsag_hash(&rv, &device).unwrap();
        rv.txn_fee += 1;
        let b = get_pre_mlsag_hash(&rv, &device).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn prehash_requires_a_ring() {
        let device = SoftwareDevice::new();
        let mut rv = minimal_sig(RctType::Haven3);
        rv.mix_ring.clear();
        assert!(get_pre_mlsag_hash(&rv, &device).is_err());
    }
}
