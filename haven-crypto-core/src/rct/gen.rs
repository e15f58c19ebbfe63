//! RCT signature assembly.
//!
//! Builds the complete signature for a simple (per-input) transaction:
//! classifies the conversion direction from the source asset and output
//! colours, proves all output ranges in one padded bulletproof, seals the
//! ECDH blobs, closes the pseudo-output masks against the scaled output
//! masks (separately for collateral), publishes the conversion mask sums,
//! and signs every input with a CLSAG bound to the pre-MLSAG hash.
//!
//! Assembly is all-or-nothing: any failure returns an error and no partial
//! signature.

use curve25519_dalek::scalar::Scalar;
use haven_types::{PricingRecord, COIN, POU_TRANSACTION_VERSION, XHV, XUSD};
use zeroize::Zeroize;

use crate::bulletproof::{make_dummy_bulletproof, prove_range_bulletproof, BP_MAX_M};
use crate::clsag::prove_rct_clsag_simple;
use crate::device::{Device, DeviceMode};
use crate::ops::{d2h, decode_point, invert, random_scalar, scalarmult8};
use crate::pedersen::gen_commitment_key;
use crate::rct::prehash::get_pre_mlsag_hash;
use crate::types::errors::{RctError, RctResult};
use crate::types::rct::{
    Bulletproof, CtKey, EcdhTuple, Key, MultisigKLRki, MultisigOut, RangeProofType, RctConfig,
    RctSig, RctType, KEY_IDENTITY, KEY_ZERO,
};

/// One output to create: `(asset tag, amount, is_collateral)`.
pub type OutputSpec = (String, u64, bool);

fn rct_type_for(config: RctConfig) -> RctResult<RctType> {
    match config.bp_version {
        0 | 6 => Ok(RctType::Haven3),
        5 => Ok(RctType::Haven2),
        4 => Ok(RctType::ClsagN),
        3 => Ok(RctType::Clsag),
        2 => Ok(RctType::Bulletproof2),
        1 => Ok(RctType::Bulletproof),
        v => Err(RctError::UnsupportedBpVersion(v)),
    }
}

fn prove_batch<D: Device>(
    amounts: &[u64],
    amount_keys: &[Key],
    device: &D,
) -> RctResult<(Bulletproof, Vec<Key>, Vec<Scalar>)> {
    if device.mode() == DeviceMode::TransactionCreateFake {
        return Ok(make_dummy_bulletproof(amounts));
    }
    let masks: Vec<Scalar> = amount_keys
        .iter()
        .map(|k| device.gen_commitment_mask(k))
        .collect();
    let proof = prove_range_bulletproof(amounts, &masks)?;
    if proof.V.len() != amounts.len() {
        return Err(RctError::ProofSelfCheckFailed("bulletproof commitment count"));
    }
    let commitments = proof.V.clone();
    Ok((proof, commitments, masks))
}

/// Build a complete simple RCT signature.
///
/// Per-input secrets arrive as [`CtKey`] scalar pairs; `index[i]` is the
/// real position inside `mix_ring[i]`. Outputs carry their colour and
/// collateral flag; `in_col_indices` names the collateral inputs of a
/// Haven3 onshore. Returns the signature together with the per-output
/// secret masks (`out_sk`) for the sender's records.
#[allow(clippy::too_many_arguments)]
pub fn gen_rct_simple<D: Device>(
    message: &Key,
    in_sk: &[CtKey],
    destinations: &[Key],
    in_amounts: &[u64],
    in_col_indices: &[usize],
    onshore_col_amount: u64,
    in_asset_type: &str,
    out_amounts: &[OutputSpec],
    txn_fee: u64,
    txn_offshore_fee: u64,
    mix_ring: &[Vec<CtKey>],
    amount_keys: &[Key],
    klrki: Option<&[MultisigKLRki]>,
    mut msout: Option<&mut MultisigOut>,
    index: &[usize],
    rct_config: RctConfig,
    device: &D,
    pr: &PricingRecord,
    tx_version: u8,
) -> RctResult<(RctSig, Vec<CtKey>)> {
    // Sanity checks. Any failure aborts before secrets are touched.
    if in_amounts.is_empty() {
        return Err(RctError::EmptyInputs);
    }
    let check_len = |what, expected: usize, actual: usize| {
        if expected == actual {
            Ok(())
        } else {
            Err(RctError::LengthMismatch {
                what,
                expected,
                actual,
            })
        }
    };
    check_len("inamounts/inSk", in_amounts.len(), in_sk.len())?;
    check_len("outamounts/destinations", out_amounts.len(), destinations.len())?;
    check_len("amount_keys/destinations", destinations.len(), amount_keys.len())?;
    check_len("index/inSk", in_sk.len(), index.len())?;
    check_len("mixRing/inSk", in_sk.len(), mix_ring.len())?;
    for (n, ring) in mix_ring.iter().enumerate() {
        if index[n] >= ring.len() {
            return Err(RctError::IndexOutOfRange {
                index: index[n],
                size: ring.len(),
            });
        }
    }
    if msout.is_some() != klrki.is_some() {
        return Err(RctError::MultisigInconsistent(
            "nonce shares and multisig output must be supplied together".into(),
        ));
    }
    if let Some(shares) = klrki {
        check_len("kLRki/inamounts", in_amounts.len(), shares.len())?;
    }

    let rct_type = rct_type_for(rct_config)?;
    if !rct_type.is_clsag() {
        return Err(RctError::UnsupportedRctType("MLSAG-era assembly"));
    }
    let consolidated = matches!(rct_type, RctType::Haven2 | RctType::Haven3);

    // Work out the transaction direction from the in/out asset mix.
    let xhv_sent = in_asset_type == XHV;
    let usd_sent = in_asset_type == XUSD;
    let xasset_sent = !xhv_sent && !usd_sent;

    let mut xhv_received = false;
    let mut usd_received = false;
    let mut xasset_received = false;
    let mut flat_amounts = Vec::with_capacity(out_amounts.len());
    for (asset, amount, _) in out_amounts {
        match asset.as_str() {
            XHV => xhv_received = true,
            XUSD => usd_received = true,
            _ => xasset_received = true,
        }
        flat_amounts.push(*amount);
    }

    let offshore = xhv_sent && !usd_sent && usd_received && xhv_received;
    let onshore = usd_sent && !xhv_sent && usd_received && xhv_received;
    let xasset_to_xusd = xasset_sent && xasset_received && usd_received;
    let xusd_to_xasset = usd_sent && xasset_received && usd_received;
    let conversion_tx = offshore || onshore || xusd_to_xasset || xasset_to_xusd;
    let use_onshore_col = onshore && rct_type == RctType::Haven3;

    let n_outs = destinations.len();
    let mut rv = RctSig {
        rct_type: Some(rct_type),
        message: *message,
        ..Default::default()
    };
    rv.out_pk = destinations
        .iter()
        .map(|d| CtKey {
            dest: *d,
            mask: KEY_ZERO,
        })
        .collect();
    if !consolidated {
        rv.out_pk_usd = rv.out_pk.clone();
        rv.out_pk_xasset = rv.out_pk.clone();
    }
    rv.ecdh_info = vec![EcdhTuple::zero(); n_outs];

    if rct_type == RctType::Haven3 && conversion_tx {
        rv.mask_sums = vec![KEY_ZERO; 3];
    } else if rct_type == RctType::Haven2 {
        rv.mask_sums = vec![KEY_ZERO; 2];
    }
    let mut mask_sum_change = Scalar::ZERO;
    let mut mask_sum_collateral = Scalar::ZERO;

    // Range proofs over all outputs.
    let mut masks = vec![Scalar::ZERO; n_outs];
    let mut commitments = vec![KEY_ZERO; n_outs];
    match rct_config.range_proof_type {
        RangeProofType::PaddedBulletproof => {
            let (proof, c, batch_masks) = prove_batch(&flat_amounts, amount_keys, device)?;
            rv.p.bulletproofs.push(proof);
            commitments.copy_from_slice(&c);
            masks.copy_from_slice(&batch_masks);
        }
        RangeProofType::Bulletproof | RangeProofType::MultiOutputBulletproof => {
            let mut proved = 0usize;
            while proved < n_outs {
                let mut batch = 1usize;
                if rct_config.range_proof_type == RangeProofType::MultiOutputBulletproof {
                    while batch * 2 + proved <= n_outs && batch * 2 <= BP_MAX_M {
                        batch *= 2;
                    }
                }
                let (proof, c, batch_masks) = prove_batch(
                    &flat_amounts[proved..proved + batch],
                    &amount_keys[proved..proved + batch],
                    device,
                )?;
                rv.p.bulletproofs.push(proof);
                commitments[proved..proved + batch].copy_from_slice(&c);
                masks[proved..proved + batch].copy_from_slice(&batch_masks);
                proved += batch;
            }
        }
        RangeProofType::Borromean => {
            return Err(RctError::UnsupportedRangeProof(
                "Borromean range proofs are verification-only",
            ));
        }
    }

    // Place the commitments and accumulate the published mask sums.
    let mut out_sk = vec![CtKey::zero(); n_outs];
    for i in 0..n_outs {
        let (asset, amount, is_collateral) = &out_amounts[i];
        let commitment = decode_point(&commitments[i])
            .ok_or(RctError::InvalidPoint("range proof commitment"))?;
        let mask_key = scalarmult8(&commitment).compress().to_bytes();

        if consolidated {
            rv.out_pk[i].mask = mask_key;
            if asset == XHV && offshore {
                // Change outputs stay in the source colour.
                mask_sum_change += masks[i];
            } else if asset == XUSD && (onshore || xusd_to_xasset) {
                mask_sum_change += masks[i];
            } else if asset != XUSD && xasset_to_xusd {
                mask_sum_change += masks[i];
            }

            if rct_type == RctType::Haven3 {
                if offshore && *is_collateral {
                    mask_sum_collateral += masks[i];
                }
                if use_onshore_col && *is_collateral && *amount == onshore_col_amount {
                    mask_sum_collateral = masks[i];
                }
            }
        } else if asset == XHV {
            rv.out_pk[i].mask = mask_key;
            rv.out_pk_usd[i].mask = KEY_IDENTITY;
            rv.out_pk_xasset[i].mask = KEY_IDENTITY;
        } else if asset == XUSD {
            rv.out_pk[i].mask = KEY_IDENTITY;
            rv.out_pk_usd[i].mask = mask_key;
            rv.out_pk_xasset[i].mask = KEY_IDENTITY;
        } else {
            rv.out_pk[i].mask = KEY_IDENTITY;
            rv.out_pk_usd[i].mask = KEY_IDENTITY;
            rv.out_pk_xasset[i].mask = mask_key;
        }
        out_sk[i].mask = masks[i].to_bytes();
    }

    // Seal the ECDH blobs and scale every output mask into the
    // source-colour accounting basis.
    let atomic = d2h(COIN);
    let inverse_atomic = invert(&atomic);
    let pou = tx_version >= POU_TRANSACTION_VERSION;
    let mut sumout = Scalar::ZERO;
    let mut sumout_onshore_col = Scalar::ZERO;

    for i in 0..n_outs {
        let (asset, _, is_collateral) = &out_amounts[i];
        let scaled: Scalar = if xhv_sent {
            if asset == XUSD {
                // Offshore: express the XUSD output mask in XHV terms.
                let rate = if pou {
                    pr.xusd_ma.min(pr.xusd)
                } else {
                    pr.xusd_ma
                };
                if rate == 0 {
                    return Err(RctError::ZeroExchangeRate(XUSD.into()));
                }
                masks[i] * atomic * invert(&d2h(rate))
            } else {
                masks[i]
            }
        } else if usd_sent {
            if asset == XUSD {
                masks[i]
            } else if asset == XHV && !is_collateral {
                // Onshore: express the XHV output mask in XUSD terms.
                let rate = if pou {
                    pr.xusd_ma.max(pr.xusd)
                } else {
                    pr.xusd_ma
                };
                masks[i] * d2h(rate) * inverse_atomic
            } else if asset != XHV && asset != XUSD {
                let rate = pr.rate(asset);
                if rate == 0 {
                    return Err(RctError::ZeroExchangeRate(asset.clone()));
                }
                masks[i] * atomic * invert(&d2h(rate))
            } else {
                // Onshore collateral output: already in the source basis.
                masks[i]
            }
        } else if asset == XUSD {
            masks[i] * d2h(pr.rate(in_asset_type)) * inverse_atomic
        } else if asset == XHV {
            return Err(RctError::InvalidDestination {
                source: in_asset_type.into(),
                dest: XHV.into(),
            });
        } else {
            masks[i]
        };

        if use_onshore_col && *is_collateral {
            sumout_onshore_col += scaled;
        } else {
            sumout += scaled;
        }

        rv.ecdh_info[i].mask = out_sk[i].mask;
        rv.ecdh_info[i].amount = d2h(flat_amounts[i]).to_bytes();
        device.ecdh_encode(&mut rv.ecdh_info[i], &amount_keys[i], rct_type.short_amount());
    }

    // Fees: source colour only from Haven2 on, per-colour before.
    if consolidated {
        rv.txn_fee = txn_fee;
        rv.txn_offshore_fee = txn_offshore_fee;
    } else if xhv_sent {
        rv.txn_fee = txn_fee;
        rv.txn_offshore_fee = txn_offshore_fee;
    } else if usd_sent {
        rv.txn_fee_usd = txn_fee;
        rv.txn_offshore_fee_usd = txn_offshore_fee;
    } else {
        rv.txn_fee_xasset = txn_fee;
        rv.txn_offshore_fee_xasset = txn_offshore_fee;
    }

    rv.mix_ring = mix_ring.to_vec();
    rv.p.pseudo_outs = vec![KEY_ZERO; in_amounts.len()];
    rv.p.clsags.reserve(in_amounts.len());

    // Split collateral inputs from converted ones.
    let mut actual_ins: Vec<(usize, u64)> = Vec::new();
    let mut col_ins: Vec<(usize, u64)> = Vec::new();
    for (i, &amount) in in_amounts.iter().enumerate() {
        if in_col_indices.contains(&i) {
            col_ins.push((i, amount));
        } else {
            actual_ins.push((i, amount));
        }
    }
    if actual_ins.is_empty() {
        return Err(RctError::EmptyInputs);
    }

    // Pseudo-output masks: all but the last random, the last closing the
    // sum against the scaled output masks.
    let mut a = vec![Scalar::ZERO; in_amounts.len()];
    let mut sum_pouts = Scalar::ZERO;
    for &(input, amount) in &actual_ins[..actual_ins.len() - 1] {
        a[input] = random_scalar();
        sum_pouts += a[input];
        rv.p.pseudo_outs[input] = gen_commitment_key(&a[input], amount);
    }
    let (last_input, last_amount) = actual_ins[actual_ins.len() - 1];
    a[last_input] = sumout - sum_pouts;
    rv.p.pseudo_outs[last_input] = gen_commitment_key(&a[last_input], last_amount);

    if conversion_tx && consolidated {
        rv.mask_sums[0] = (a[last_input] + sum_pouts).to_bytes();
    }
    if !rv.mask_sums.is_empty() {
        rv.mask_sums[1] = mask_sum_change.to_bytes();
    }
    if rv.mask_sums.len() > 2 {
        rv.mask_sums[2] = mask_sum_collateral.to_bytes();
    }

    // Collateral inputs close independently against the collateral outputs.
    if use_onshore_col {
        if col_ins.is_empty() {
            return Err(RctError::LengthMismatch {
                what: "onshore collateral inputs",
                expected: 1,
                actual: 0,
            });
        }
        let mut sum_col_pouts = Scalar::ZERO;
        for &(input, amount) in &col_ins[..col_ins.len() - 1] {
            a[input] = random_scalar();
            sum_col_pouts += a[input];
            rv.p.pseudo_outs[input] = gen_commitment_key(&a[input], amount);
        }
        let (last_col, last_col_amount) = col_ins[col_ins.len() - 1];
        a[last_col] = sumout_onshore_col - sum_col_pouts;
        rv.p.pseudo_outs[last_col] = gen_commitment_key(&a[last_col], last_col_amount);
    }

    let full_message = get_pre_mlsag_hash(&rv, device)?;

    if let Some(out) = msout.as_deref_mut() {
        out.c = vec![KEY_ZERO; in_amounts.len()];
        out.mu_p = vec![KEY_ZERO; in_amounts.len()];
    }

    // One CLSAG per input against its ring, pseudo-output as the offset.
    for i in 0..in_amounts.len() {
        let shares = klrki.map(|k| &k[i]);
        let pseudo_out = rv.p.pseudo_outs[i];
        let output = prove_rct_clsag_simple(
            &full_message,
            &rv.mix_ring[i],
            &in_sk[i],
            &a[i],
            &pseudo_out,
            shares,
            index[i],
        )?;
        if let Some(out) = msout.as_deref_mut() {
            out.c[i] = output.closing_challenge;
            out.mu_p[i] = output.mu_p;
        }
        rv.p.clsags.push(output.sig);
    }

    for mask in &mut a {
        mask.zeroize();
    }

    Ok((rv, out_sk))
}
