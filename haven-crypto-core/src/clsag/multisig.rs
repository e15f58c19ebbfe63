//! Multisig share contribution and accumulation for CLSAG rings.
//!
//! A multisig prover first produces the ring with the pre-committed
//! aggregate nonce (`MultisigKLRki`), exporting `(c_l, μ_P)` per input.
//! Each cosigner then folds their share into `s[l]` with
//! `k − c_l·μ_P·share`, and the partial signatures are accumulated against
//! a designated base to avoid double-counting the common decoy scalars.

use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroize;

use crate::ops::decode_scalar;
use crate::types::errors::{RctError, RctResult};
use crate::types::rct::{Key, MultisigOut, RctSig, RctType};

fn clsag_multisig_type(rv: &RctSig) -> RctResult<()> {
    match rv.rct_type() {
        RctType::Clsag | RctType::ClsagN | RctType::Haven2 => Ok(()),
        _ => Err(RctError::UnsupportedRctType("CLSAG multisig signing")),
    }
}

/// Fold one cosigner's secret share into every ring of a partially signed
/// transaction.
///
/// `indices[n]` is the real index of input `n`, `k[n]` the cosigner's nonce
/// share, and `msout` the `(c, μ_P)` pairs exported at ring generation.
pub fn sign_multisig_clsag(
    rv: &mut RctSig,
    indices: &[usize],
    k: &[Key],
    msout: &MultisigOut,
    secret_key: &Key,
) -> RctResult<()> {
    clsag_multisig_type(rv)?;
    if indices.len() != k.len() {
        return Err(RctError::LengthMismatch {
            what: "multisig nonce shares",
            expected: indices.len(),
            actual: k.len(),
        });
    }
    if k.len() != rv.p.clsags.len() {
        return Err(RctError::LengthMismatch {
            what: "multisig rings",
            expected: rv.p.clsags.len(),
            actual: k.len(),
        });
    }
    if k.len() != msout.c.len() || msout.c.len() != msout.mu_p.len() {
        return Err(RctError::MultisigInconsistent(
            "exported challenge/coefficient counts disagree".into(),
        ));
    }
    if !rv.p.mgs.is_empty() {
        return Err(RctError::MultisigInconsistent(
            "MLSAG data present on a CLSAG transaction".into(),
        ));
    }

    // Decode everything fallible before the secret share is expanded, so
    // no error path leaves it unwiped.
    let mut rounds = Vec::with_capacity(indices.len());
    for n in 0..indices.len() {
        let index = indices[n];
        let sig = &rv.p.clsags[n];
        if index >= sig.s.len() {
            return Err(RctError::IndexOutOfRange {
                index,
                size: sig.s.len(),
            });
        }
        let c = decode_scalar(&msout.c[n]).ok_or(RctError::InvalidScalar("exported challenge"))?;
        let mu_p = decode_scalar(&msout.mu_p[n])
            .ok_or(RctError::InvalidScalar("exported aggregation coefficient"))?;
        let nonce = decode_scalar(&k[n]).ok_or(RctError::InvalidScalar("nonce share"))?;
        let s_l = decode_scalar(&sig.s[index])
            .ok_or(RctError::InvalidScalar("partial response scalar"))?;
        rounds.push((index, c, mu_p, nonce, s_l));
    }

    let mut share =
        decode_scalar(secret_key).ok_or(RctError::InvalidScalar("multisig secret share"))?;

    for (n, (index, c, mu_p, nonce, s_l)) in rounds.into_iter().enumerate() {
        // s[l] += k − c·μ_P·share
        let mut weighted = mu_p * share;
        rv.p.clsags[n].s[index] = (s_l + (nonce - c * weighted)).to_bytes();
        weighted.zeroize();
    }

    share.zeroize();
    Ok(())
}

/// Accumulate cosigner partials into the received transaction.
///
/// Every partial beyond the base contributes its `s[l]`; the base's copy is
/// subtracted each time so the shared decoy component is counted exactly
/// once.
pub fn acc_sign_multisig_clsag(
    partials: &[RctSig],
    recv: &mut RctSig,
    indices: &[usize],
) -> RctResult<()> {
    clsag_multisig_type(recv)?;
    if !recv.p.mgs.is_empty() {
        return Err(RctError::MultisigInconsistent(
            "MLSAG data present on a CLSAG transaction".into(),
        ));
    }
    let base = partials.first().ok_or(RctError::MultisigInconsistent(
        "no partial signatures to accumulate".into(),
    ))?;

    for (n, &index) in indices.iter().enumerate() {
        if n >= recv.p.clsags.len() || index >= recv.p.clsags[n].s.len() {
            return Err(RctError::IndexOutOfRange {
                index,
                size: recv.p.clsags.len(),
            });
        }
        let base_s = decode_scalar(&base.p.clsags[n].s[index])
            .ok_or(RctError::InvalidScalar("base partial response"))?;
        let mut acc = decode_scalar(&recv.p.clsags[n].s[index])
            .ok_or(RctError::InvalidScalar("received response scalar"))?;
        for partial in &partials[1..] {
            let s = decode_scalar(&partial.p.clsags[n].s[index])
                .ok_or(RctError::InvalidScalar("partial response scalar"))?;
            acc += s - base_s;
        }
        recv.p.clsags[n].s[index] = acc.to_bytes();
    }
    Ok(())
}

/// Complete a cosigner share outside a full `RctSig`, returning the
/// adjustment `k − c·μ_P·share` for one ring.
#[must_use]
pub fn multisig_share_adjustment(k: &Scalar, c: &Scalar, mu_p: &Scalar, share: &Scalar) -> Scalar {
    k - c * (mu_p * share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clsag::sign::clsag_sign;
    use crate::clsag::verify::ver_rct_clsag_simple;
    use crate::ops::{hash_to_point, random_scalar, scalarmult_base};
    use crate::pedersen::gen_commitment_key;
    use crate::types::rct::{CtKey, MultisigKLRki};

    /// Two cosigners with an additive spend key complete a CLSAG through the
    /// kLRki path and the signature verifies.
    #[test]
    fn two_party_completion_verifies() {
        let n = 5;
        let l = 2;
        let amount = 1_000u64;
        let message = [0x11u8; 32];

        // Additive key split: p = p1 + p2.
        let p1 = random_scalar();
        let p2 = random_scalar();
        let p = p1 + p2;
        let spend_pub = scalarmult_base(&p).compress().to_bytes();

        let mask = random_scalar();
        let mut ring = Vec::with_capacity(n);
        for i in 0..n {
            if i == l {
                ring.push(CtKey {
                    dest: spend_pub,
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
        let z = mask - pseudo_mask;

        // Aggregate nonce and key image across both signers.
        let hp = hash_to_point(&spend_pub);
        let k1 = random_scalar();
        let k2 = random_scalar();
        let k_agg = k1 + k2;
        let klrki = MultisigKLRki {
            k: k_agg.to_bytes(),
            L: scalarmult_base(&k_agg).compress().to_bytes(),
            R: (k_agg * hp).compress().to_bytes(),
            ki: (p * hp).compress().to_bytes(),
        };

        // Ring generation with a zero spend contribution: each signer adds
        // their own p_i share afterwards, so sign with p = 0 here.
        let ring_keys: Vec<_> = ring.iter().map(|k| k.dest).collect();
        let commitments: Vec<_> = ring.iter().map(|k| k.mask).collect();
        let out = clsag_sign(
            &message,
            &Scalar::ZERO,
            &ring_keys,
            &z,
            &commitments,
            &pseudo_out,
            l,
            Some(&klrki),
        )
        .unwrap();

        let c = decode_scalar(&out.closing_challenge).unwrap();
        let mu_p = decode_scalar(&out.mu_p).unwrap();

        // Each signer contributes k_i − c·μ_P·p_i on top of the base s[l]
        // (which already carries k_agg − c·(μ_P·0 + μ_C·z)); subtracting
        // k_agg once rebalances the nonce.
        let mut sig = out.sig;
        let s_l = decode_scalar(&sig.s[l]).unwrap();
        let adj1 = multisig_share_adjustment(&k1, &c, &mu_p, &p1);
        let adj2 = multisig_share_adjustment(&k2, &c, &mu_p, &p2);
        sig.s[l] = (s_l + adj1 + adj2 - k_agg).to_bytes();

        assert!(ver_rct_clsag_simple(&message, &sig, &ring, &pseudo_out));
    }

    #[test]
    fn rejects_inconsistent_export_sizes() {
        let mut rv = RctSig {
            rct_type: Some(RctType::Haven2),
            ..Default::default()
        };
        let msout = MultisigOut {
            c: vec![[0u8; 32]],
            mu_p: vec![],
        };
        let err = sign_multisig_clsag(&mut rv, &[], &[], &msout, &[1u8; 32]).unwrap_err();
        assert!(matches!(err, RctError::MultisigInconsistent(_)));
    }

    #[test]
    fn rejects_wrong_epoch() {
        let mut rv = RctSig {
            rct_type: Some(RctType::Simple),
            ..Default::default()
        };
        let msout = MultisigOut::default();
        let err = sign_multisig_clsag(&mut rv, &[], &[], &msout, &[1u8; 32]).unwrap_err();
        assert!(matches!(err, RctError::UnsupportedRctType(_)));
    }
}
