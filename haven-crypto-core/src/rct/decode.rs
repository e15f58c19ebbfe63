//! Recipient-side amount decoding.
//!
//! Opens an output's ECDH blob with the per-output amount key and insists
//! the opened `(mask, amount)` pair recommits to the published output
//! commitment; a mismatch means the output is unspendable and is an error,
//! never a silent wrong amount.

use crate::device::Device;
use crate::ops::{decode_scalar, h2d};
use crate::pedersen::gen_commitment_key;
use crate::types::errors::{RctError, RctResult};
use crate::types::rct::{Key, RctSig, RctType, KEY_IDENTITY};

/// Decode output `i` of a simple signature, returning `(amount, mask)`.
pub fn decode_rct_simple<D: Device>(
    rv: &RctSig,
    amount_key: &Key,
    i: usize,
    device: &D,
) -> RctResult<(u64, Key)> {
    let rct_type = rv.rct_type();
    if !rct_type.is_simple() {
        return Err(RctError::UnsupportedRctType("simple decoding"));
    }
    if i >= rv.ecdh_info.len() {
        return Err(RctError::IndexOutOfRange {
            index: i,
            size: rv.ecdh_info.len(),
        });
    }
    if rv.out_pk.len() != rv.ecdh_info.len() {
        return Err(RctError::LengthMismatch {
            what: "outPk/ecdhInfo",
            expected: rv.ecdh_info.len(),
            actual: rv.out_pk.len(),
        });
    }

    let mut ecdh = rv.ecdh_info[i];
    device.ecdh_decode(&mut ecdh, amount_key, rct_type.short_amount());

    // Which commitment column carries this output's value.
    let commitment = if matches!(rct_type, RctType::Haven2 | RctType::Haven3) {
        if rv.out_pk[i].mask == KEY_IDENTITY {
            return Err(RctError::InvalidPoint("output commitment is identity"));
        }
        rv.out_pk[i].mask
    } else if rv.out_pk[i].mask != KEY_IDENTITY {
        rv.out_pk[i].mask
    } else if i < rv.out_pk_usd.len() && rv.out_pk_usd[i].mask != KEY_IDENTITY {
        rv.out_pk_usd[i].mask
    } else if i < rv.out_pk_xasset.len() && rv.out_pk_xasset[i].mask != KEY_IDENTITY {
        rv.out_pk_xasset[i].mask
    } else {
        return Err(RctError::InvalidPoint("no colour column carries a commitment"));
    };

    let mask =
        decode_scalar(&ecdh.mask).ok_or(RctError::InvalidScalar("decoded ECDH mask"))?;
    if decode_scalar(&ecdh.amount).is_none() {
        return Err(RctError::InvalidScalar("decoded ECDH amount"));
    }
    let amount = h2d(&ecdh.amount);

    let recommitted = gen_commitment_key(&mask, amount);
    if recommitted != commitment {
        return Err(RctError::AmountDecodeFailed(format!(
            "output {i} did not reopen its commitment"
        )));
    }

    Ok((amount, ecdh.mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SoftwareDevice;
    use crate::ecdh::ecdh_encode;
    use crate::ops::{d2h, random_scalar};
    use crate::types::rct::{CtKey, EcdhTuple};

    fn sealed_sig(amount: u64, amount_key: &Key) -> RctSig {
        let mask = crate::pedersen::gen_commitment_mask(amount_key);
        let mut ecdh = EcdhTuple {
            mask: mask.to_bytes(),
            amount: d2h(amount).to_bytes(),
        };
        ecdh_encode(&mut ecdh, amount_key, true);
        RctSig {
            rct_type: Some(RctType::Haven3),
            ecdh_info: vec![ecdh],
            out_pk: vec![CtKey {
                dest: [0u8; 32],
                mask: gen_commitment_key(&mask, amount),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn decodes_own_output() {
        let device = SoftwareDevice::new();
        let amount_key = random_scalar().to_bytes();
        let rv = sealed_sig(123_000_000, &amount_key);
        let (amount, _mask) = decode_rct_simple(&rv, &amount_key, 0, &device).unwrap();
        assert_eq!(amount, 123_000_000);
    }

    #[test]
    fn wrong_key_is_detected_by_commitment_recheck() {
        let device = SoftwareDevice::new();
        let amount_key = random_scalar().to_bytes();
        let wrong_key = random_scalar().to_bytes();
        let rv = sealed_sig(42, &amount_key);
        let err = decode_rct_simple(&rv, &wrong_key, 0, &device).unwrap_err();
        assert!(matches!(err, RctError::AmountDecodeFailed(_)));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let device = SoftwareDevice::new();
        let amount_key = random_scalar().to_bytes();
        let rv = sealed_sig(42, &amount_key);
        assert!(decode_rct_simple(&rv, &amount_key, 1, &device).is_err());
    }

    #[test]
    fn full_type_is_rejected() {
        let device = SoftwareDevice::new();
        let rv = RctSig {
            rct_type: Some(RctType::Full),
            ..Default::default()
        };
        assert!(matches!(
            decode_rct_simple(&rv, &[0u8; 32], 0, &device),
            Err(RctError::UnsupportedRctType(_))
        ));
    }
}
