//! Semantic and non-semantic RCT verification.
//!
//! Semantic verification covers everything computable from the signature
//! and the pricing record: shape preconditions, colour-wise balance, the
//! per-type proof-of-value residual `Zi`, the burnt/minted equation,
//! collateral, and the aggregated range proofs. Non-semantic verification
//! checks each ring signature against its resolved mix-ring.
//!
//! Every entry point returns a boolean; failures log one diagnostic line
//! and nothing else, so verification never acts as an oracle for which
//! predicate failed.

use curve25519_dalek::edwards::EdwardsPoint;
use haven_types::{
    asset::is_valid_asset_type, PricingRecord, TransactionType, COIN,
    HF_PER_OUTPUT_UNLOCK_VERSION, HF_VERSION_HAVEN2, HF_VERSION_USE_COLLATERAL,
    HF_VERSION_XASSET_FEES_V2, XHV, XUSD,
};
use tracing::debug;

use crate::borromean::ver_range;
use crate::bulletproof::{n_bulletproof_amounts, ver_bulletproof};
use crate::clsag::ver_rct_clsag_simple;
use crate::device::SoftwareDevice;
use crate::mlsag::{ver_rct_mg, ver_rct_mg_simple};
use crate::ops::{d2h, decode_point, decode_scalar, identity, invert, is_identity, scalarmult8};
use crate::pedersen::{gen_commitment, scalarmult_h};
use crate::pool;
use crate::rct::prehash::get_pre_mlsag_hash;
use crate::types::rct::{RctSig, RctType};

macro_rules! check {
    ($cond:expr, $msg:literal) => {
        if !($cond) {
            debug!(concat!("verification failed: ", $msg));
            return false;
        }
    };
}

/// Decode and sum a set of commitment keys; `None` on any bad encoding.
fn sum_points<'a, I: IntoIterator<Item = &'a [u8; 32]>>(keys: I) -> Option<EdwardsPoint> {
    let mut sum = identity();
    for key in keys {
        sum += decode_point(key)?;
    }
    Some(sum)
}

/// Verify an original `Full`-type signature.
///
/// `semantics` selects the early (range proofs, shape) or late (aggregate
/// MLSAG against the resolved ring) half of verification.
#[must_use]
pub fn ver_rct(rv: &RctSig, semantics: bool) -> bool {
    check!(rv.rct_type() == RctType::Full, "ver_rct on non-full signature");

    if semantics {
        check!(
            rv.out_pk.len() == rv.p.range_sigs.len(),
            "outPk/rangeSigs size mismatch"
        );
        check!(
            rv.out_pk.len() == rv.ecdh_info.len(),
            "outPk/ecdhInfo size mismatch"
        );
        check!(rv.p.mgs.len() == 1, "full signature must carry one MLSAG");

        let tasks: Vec<_> = (0..rv.out_pk.len())
            .map(|i| {
                let mask = rv.out_pk[i].mask;
                let sig = rv.p.range_sigs[i].clone();
                move || ver_range(&mask, &sig)
            })
            .collect();
        let results = pool::run_all(tasks);
        for (i, ok) in results.iter().enumerate() {
            if !ok {
                debug!("range proof {i} failed");
                return false;
            }
        }
        true
    } else {
        let message = match get_pre_mlsag_hash(rv, &SoftwareDevice::new()) {
            Ok(m) => m,
            Err(_) => {
                debug!("verification failed: could not compute message hash");
                return false;
            }
        };
        check!(!rv.p.mgs.is_empty(), "full signature carries no MLSAG");
        let ok = ver_rct_mg(&rv.p.mgs[0], &rv.mix_ring, &rv.out_pk, rv.txn_fee, &message);
        if !ok {
            debug!("aggregate MLSAG verification failed");
        }
        ok
    }
}

/// The colour-scaled proof-of-value residual for the Haven2/Haven3 path.
#[allow(clippy::too_many_arguments)]
fn compute_zi(
    tx_type: TransactionType,
    sum_c: &EdwardsPoint,
    sum_d: &EdwardsPoint,
    pr: &PricingRecord,
    source: &str,
    dest: &str,
    version: u8,
) -> Option<EdwardsPoint> {
    let atomic = d2h(COIN);
    let pou = version >= HF_PER_OUTPUT_UNLOCK_VERSION;
    match tx_type {
        TransactionType::Offshore => {
            let rate = if pou {
                pr.xusd_ma.min(pr.xusd)
            } else {
                pr.xusd_ma
            };
            if rate == 0 {
                return None;
            }
            let d_final = sum_d * (atomic * invert(&d2h(rate)));
            Some(sum_c + d_final)
        }
        TransactionType::Onshore => {
            let rate = if pou {
                pr.xusd_ma.max(pr.xusd)
            } else {
                pr.xusd_ma
            };
            let d_final = sum_d * (d2h(rate) * invert(&atomic));
            Some(sum_c + d_final)
        }
        TransactionType::XusdToXasset => {
            let rate = pr.rate(dest);
            if rate == 0 {
                return None;
            }
            let d_final = sum_d * (atomic * invert(&d2h(rate)));
            Some(sum_c + d_final)
        }
        TransactionType::XassetToXusd => {
            let rate = pr.rate(source);
            let d_final = sum_d * (d2h(rate) * invert(&atomic));
            Some(sum_c + d_final)
        }
        TransactionType::OffshoreTransfer
        | TransactionType::XassetTransfer
        | TransactionType::Transfer => Some(sum_c + sum_d),
        TransactionType::Unset => None,
    }
}

/// Semantic verification for `Haven2`/`Haven3` signatures.
///
/// `output_asset_types[i]` is the colour declared by the companion
/// transaction output `i`; `input_asset_types[i]` the colour of companion
/// input `i` (used to identify onshore collateral inputs). The remaining
/// parameters mirror the transaction fields fixed at classification time.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn ver_rct_semantics_simple_2(
    rv: &RctSig,
    pr: &PricingRecord,
    tx_type: TransactionType,
    source: &str,
    dest: &str,
    mut amount_burnt: u64,
    output_asset_types: &[String],
    input_asset_types: &[String],
    version: u8,
    collateral_indices: &[usize],
    amount_collateral: u64,
) -> bool {
    let rct_type = rv.rct_type();
    check!(
        matches!(rct_type, RctType::Haven2 | RctType::Haven3),
        "semantics v2 called on wrong epoch"
    );
    let amounts_proved = match n_bulletproof_amounts(&rv.p.bulletproofs) {
        Some(n) => n,
        None => {
            debug!("verification failed: malformed bulletproof shape");
            return false;
        }
    };
    check!(
        rv.out_pk.len() == amounts_proved,
        "outPk/bulletproof amount count mismatch"
    );
    check!(rv.p.mgs.is_empty(), "MLSAG data on a CLSAG epoch");
    check!(
        rv.p.pseudo_outs.len() == rv.p.clsags.len(),
        "pseudoOuts/CLSAGs size mismatch"
    );
    check!(rv.pseudo_outs.is_empty(), "base pseudoOuts must be empty");
    check!(
        rv.out_pk.len() == rv.ecdh_info.len(),
        "outPk/ecdhInfo size mismatch"
    );
    if rct_type == RctType::Haven2 {
        check!(rv.mask_sums.len() == 2, "maskSums size is not 2");
    }
    check!(is_valid_asset_type(source), "invalid source asset");
    check!(is_valid_asset_type(dest), "invalid dest asset");
    check!(tx_type != TransactionType::Unset, "unset transaction type");
    check!(
        output_asset_types.len() == rv.out_pk.len(),
        "output colour list size mismatch"
    );

    let conversion = source != dest;
    if conversion {
        check!(!pr.is_empty(), "empty pricing record for a conversion");
        check!(amount_burnt > 0, "zero amount burnt for a conversion");
        if rct_type == RctType::Haven3 {
            check!(rv.mask_sums.len() == 3, "maskSums size is not 3");
            check!(collateral_indices.len() == 2, "collateral indices size is not 2");
            if matches!(tx_type, TransactionType::Offshore | TransactionType::Onshore) {
                check!(amount_collateral > 0, "zero collateral requirement");
            }
        }
    }

    // The published commitments must be the range-proof commitments
    // restored from their INV_EIGHT form.
    let mut flat_index = 0usize;
    for proof in &rv.p.bulletproofs {
        for v in &proof.V {
            let point = match decode_point(v) {
                Some(p) => p,
                None => {
                    debug!("verification failed: undecodable range proof commitment");
                    return false;
                }
            };
            check!(
                scalarmult8(&point).compress().to_bytes() == rv.out_pk[flat_index].mask,
                "outPk mask does not match range proof commitment"
            );
            flat_index += 1;
        }
    }

    // Colour-wise output sums; onshore collateral outputs are excluded and
    // validated by the dedicated collateral equations instead.
    let mut masks_c: Vec<[u8; 32]> = Vec::new();
    let mut masks_d: Vec<[u8; 32]> = Vec::new();
    for (i, asset) in output_asset_types.iter().enumerate() {
        let collateral_output = version >= HF_VERSION_USE_COLLATERAL
            && tx_type == TransactionType::Onshore
            && collateral_indices.contains(&i);
        if collateral_output {
            continue;
        }
        if asset == source {
            masks_c.push(rv.out_pk[i].mask);
        } else if asset == dest {
            masks_d.push(rv.out_pk[i].mask);
        } else {
            debug!("verification failed: output in a third colour");
            return false;
        }
    }
    let sum_outpks_c = match sum_points(masks_c.iter()) {
        Some(p) => p,
        None => {
            debug!("verification failed: undecodable output commitment");
            return false;
        }
    };
    let sum_outpks_d = match sum_points(masks_d.iter()) {
        Some(p) => p,
        None => {
            debug!("verification failed: undecodable output commitment");
            return false;
        }
    };

    // Input sums, with onshore collateral inputs split out.
    let mut sum_pseudo_outs = identity();
    let mut sum_col_ins = identity();
    if tx_type == TransactionType::Onshore && version >= HF_VERSION_USE_COLLATERAL {
        check!(
            input_asset_types.len() == rv.p.pseudo_outs.len(),
            "input colour list size mismatch"
        );
        for (i, pseudo) in rv.p.pseudo_outs.iter().enumerate() {
            let point = match decode_point(pseudo) {
                Some(p) => p,
                None => {
                    debug!("verification failed: undecodable pseudo-output");
                    return false;
                }
            };
            if input_asset_types[i] == XHV {
                sum_col_ins += point;
            } else {
                sum_pseudo_outs += point;
            }
        }
    } else {
        sum_pseudo_outs = match sum_points(rv.p.pseudo_outs.iter()) {
            Some(p) => p,
            None => {
                debug!("verification failed: undecodable pseudo-output");
                return false;
            }
        };
    }

    let txn_fee_key = scalarmult_h(rv.txn_fee);
    let txn_offshore_fee_key = scalarmult_h(rv.txn_offshore_fee);

    let sum_c = sum_pseudo_outs - txn_fee_key - txn_offshore_fee_key - sum_outpks_c;
    let sum_d = identity() - sum_outpks_d;

    let zi = match compute_zi(tx_type, &sum_c, &sum_d, pr, source, dest, version) {
        Some(z) => z,
        None => {
            debug!("verification failed: unusable exchange rate for type");
            return false;
        }
    };
    check!(is_identity(&zi), "sum check failed (Zi)");

    // Burnt/minted: the residual, with the change masks added back, must
    // reopen to the declared burnt amount under the published input masks.
    if conversion {
        if version < HF_VERSION_USE_COLLATERAL
            && matches!(
                tx_type,
                TransactionType::XassetToXusd | TransactionType::XusdToXasset
            )
        {
            // Wallets fold the burnt 80% of the conversion fee into
            // amount_burnt for xAsset conversions; strip it before
            // validating the converted mass.
            let burnt_fee = (u128::from(rv.txn_offshore_fee) * 4) / 5;
            amount_burnt = match amount_burnt.checked_sub(burnt_fee as u64) {
                Some(v) => v,
                None => {
                    debug!("verification failed: burnt amount below burnt fee");
                    return false;
                }
            };
        }

        let mask_sum_in = match rv.mask_sums.first().and_then(decode_scalar) {
            Some(s) => s,
            None => {
                debug!("verification failed: non-canonical input mask sum");
                return false;
            }
        };
        let mask_sum_change = match rv.mask_sums.get(1).and_then(decode_scalar) {
            Some(s) => s,
            None => {
                debug!("verification failed: non-canonical change mask sum");
                return false;
            }
        };

        let c_burnt = sum_c + gen_commitment(&mask_sum_change, 0);
        let pseudo_c_burnt = gen_commitment(&mask_sum_in, amount_burnt);
        check!(c_burnt == pseudo_c_burnt, "burnt/minted validation failed");
    }

    // Collateral equations.
    if version >= HF_VERSION_USE_COLLATERAL
        && matches!(tx_type, TransactionType::Offshore | TransactionType::Onshore)
    {
        let mask_sum_col = match rv.mask_sums.get(2).and_then(decode_scalar) {
            Some(s) => s,
            None => {
                debug!("verification failed: non-canonical collateral mask sum");
                return false;
            }
        };
        check!(
            collateral_indices.iter().all(|&i| i < rv.out_pk.len()),
            "collateral index out of range"
        );
        let expected = gen_commitment(&mask_sum_col, amount_collateral)
            .compress()
            .to_bytes();
        check!(
            expected == rv.out_pk[collateral_indices[0]].mask,
            "collateral commitment mismatch"
        );

        if tx_type == TransactionType::Onshore {
            let sum_col_out = match sum_points(
                [
                    &rv.out_pk[collateral_indices[0]].mask,
                    &rv.out_pk[collateral_indices[1]].mask,
                ]
                .into_iter(),
            ) {
                Some(p) => p,
                None => {
                    debug!("verification failed: undecodable collateral output");
                    return false;
                }
            };
            check!(
                sum_col_out == sum_col_ins,
                "onshore collateral inputs != outputs"
            );
        }
    }

    let proofs: Vec<&crate::types::rct::Bulletproof> = rv.p.bulletproofs.iter().collect();
    check!(
        proofs.is_empty() || ver_bulletproof(&proofs),
        "aggregate range proof failed"
    );

    true
}

/// Semantic verification for the legacy simple epochs (`Simple` through
/// `ClsagN`), with tri-colour commitments and per-colour fees.
#[must_use]
pub fn ver_rct_semantics_simple(
    rv: &RctSig,
    pr: &PricingRecord,
    tx_type: TransactionType,
    source: &str,
    dest: &str,
) -> bool {
    let rct_type = rv.rct_type();
    check!(
        matches!(
            rct_type,
            RctType::Simple
                | RctType::Bulletproof
                | RctType::Bulletproof2
                | RctType::Clsag
                | RctType::ClsagN
        ),
        "legacy semantics called on wrong epoch"
    );

    let bulletproof = rct_type.is_bulletproof();
    if bulletproof {
        let amounts = match n_bulletproof_amounts(&rv.p.bulletproofs) {
            Some(n) => n,
            None => {
                debug!("verification failed: malformed bulletproof shape");
                return false;
            }
        };
        check!(
            rv.out_pk.len() == amounts,
            "outPk/bulletproof amount count mismatch"
        );
        if rct_type.is_clsag() {
            check!(rv.p.mgs.is_empty(), "MLSAG data on a CLSAG epoch");
            check!(
                rv.p.pseudo_outs.len() == rv.p.clsags.len(),
                "pseudoOuts/CLSAGs size mismatch"
            );
        } else {
            check!(rv.p.clsags.is_empty(), "CLSAG data on an MLSAG epoch");
            check!(
                rv.p.pseudo_outs.len() == rv.p.mgs.len(),
                "pseudoOuts/MGs size mismatch"
            );
        }
        check!(rv.pseudo_outs.is_empty(), "base pseudoOuts must be empty");
    } else {
        check!(
            rv.out_pk.len() == rv.p.range_sigs.len(),
            "outPk/rangeSigs size mismatch"
        );
        check!(
            rv.pseudo_outs.len() == rv.p.mgs.len(),
            "pseudoOuts/MGs size mismatch"
        );
        check!(
            rv.p.pseudo_outs.is_empty(),
            "prunable pseudoOuts must be empty"
        );
    }
    check!(
        rv.out_pk.len() == rv.ecdh_info.len(),
        "outPk/ecdhInfo size mismatch"
    );
    check!(is_valid_asset_type(source), "invalid source asset");
    check!(is_valid_asset_type(dest), "invalid dest asset");
    check!(tx_type != TransactionType::Unset, "unset transaction type");
    if source != dest {
        check!(!pr.is_empty(), "empty pricing record for a conversion");
    }
    check!(
        rv.out_pk_usd.len() == rv.out_pk.len() && rv.out_pk_xasset.len() == rv.out_pk.len(),
        "colour columns have different sizes"
    );

    let pseudo_outs = if bulletproof {
        &rv.p.pseudo_outs
    } else {
        &rv.pseudo_outs
    };

    let sum_outpks = match sum_points(rv.out_pk.iter().map(|k| &k.mask)) {
        Some(p) => p,
        None => {
            debug!("verification failed: undecodable output commitment");
            return false;
        }
    };
    let sum_outpks_usd = match sum_points(rv.out_pk_usd.iter().map(|k| &k.mask)) {
        Some(p) => p,
        None => {
            debug!("verification failed: undecodable output commitment");
            return false;
        }
    };
    let sum_outpks_xasset = match sum_points(rv.out_pk_xasset.iter().map(|k| &k.mask)) {
        Some(p) => p,
        None => {
            debug!("verification failed: undecodable output commitment");
            return false;
        }
    };

    let sum_pseudo = match sum_points(pseudo_outs.iter()) {
        Some(p) => p,
        None => {
            debug!("verification failed: undecodable pseudo-output");
            return false;
        }
    };
    let zero = identity();
    let (sum_pseudo_xhv, sum_pseudo_usd, sum_pseudo_xasset) = if source == XHV {
        (sum_pseudo, zero, zero)
    } else if source == XUSD {
        (zero, sum_pseudo, zero)
    } else {
        (zero, zero, sum_pseudo)
    };

    let sum_xhv = sum_pseudo_xhv
        - scalarmult_h(rv.txn_fee)
        - scalarmult_h(rv.txn_offshore_fee)
        - sum_outpks;
    let sum_usd = sum_pseudo_usd
        - scalarmult_h(rv.txn_fee_usd)
        - scalarmult_h(rv.txn_offshore_fee_usd)
        - sum_outpks_usd;
    let sum_xasset = sum_pseudo_xasset
        - scalarmult_h(rv.txn_fee_xasset)
        - scalarmult_h(rv.txn_offshore_fee_xasset)
        - sum_outpks_xasset;

    let atomic = d2h(COIN);
    let zi = match tx_type {
        TransactionType::Offshore => {
            if pr.xusd_ma == 0 {
                debug!("verification failed: zero moving-average rate");
                return false;
            }
            sum_xhv + sum_usd * (atomic * invert(&d2h(pr.xusd_ma)))
        }
        TransactionType::Onshore => sum_xhv * (d2h(pr.xusd_ma) * invert(&atomic)) + sum_usd,
        TransactionType::OffshoreTransfer => sum_xhv + sum_usd,
        TransactionType::XusdToXasset => {
            let rate = pr.rate(dest);
            if rate == 0 {
                debug!("verification failed: zero destination rate");
                return false;
            }
            sum_usd + sum_xasset * (atomic * invert(&d2h(rate)))
        }
        TransactionType::XassetToXusd => {
            sum_usd * (d2h(pr.rate(source)) * invert(&atomic)) + sum_xasset
        }
        TransactionType::XassetTransfer => sum_usd + sum_xasset,
        TransactionType::Transfer => sum_xhv + sum_usd,
        TransactionType::Unset => {
            debug!("verification failed: unset transaction type");
            return false;
        }
    };
    check!(is_identity(&zi), "sum check failed (Zi)");

    if bulletproof {
        let proofs: Vec<&crate::types::rct::Bulletproof> = rv.p.bulletproofs.iter().collect();
        check!(
            proofs.is_empty() || ver_bulletproof(&proofs),
            "aggregate range proof failed"
        );
        true
    } else {
        let tasks: Vec<_> = (0..rv.out_pk.len())
            .map(|i| {
                let mask = rv.out_pk[i].mask;
                let sig = rv.p.range_sigs[i].clone();
                move || ver_range(&mask, &sig)
            })
            .collect();
        let results = pool::run_all(tasks);
        for (i, ok) in results.iter().enumerate() {
            if !ok {
                debug!("range proof {i} failed");
                return false;
            }
        }
        true
    }
}

/// Non-semantic verification: every ring signature against its mix-ring,
/// in parallel, with the pre-MLSAG hash as the bound message.
#[must_use]
pub fn ver_rct_non_semantics_simple(rv: &RctSig) -> bool {
    let rct_type = rv.rct_type();
    check!(
        rct_type.is_simple(),
        "non-semantics called on non-simple signature"
    );
    let bulletproof = rct_type.is_bulletproof();
    let pseudo_outs = if bulletproof {
        &rv.p.pseudo_outs
    } else {
        &rv.pseudo_outs
    };
    check!(
        pseudo_outs.len() == rv.mix_ring.len(),
        "pseudoOuts/mixRing size mismatch"
    );
    if rct_type.is_clsag() {
        check!(
            rv.p.clsags.len() == rv.mix_ring.len(),
            "CLSAGs/mixRing size mismatch"
        );
    } else {
        check!(
            rv.p.mgs.len() == rv.mix_ring.len(),
            "MGs/mixRing size mismatch"
        );
    }

    let message = match get_pre_mlsag_hash(rv, &SoftwareDevice::new()) {
        Ok(m) => m,
        Err(_) => {
            debug!("verification failed: could not compute message hash");
            return false;
        }
    };

    let tasks: Vec<_> = (0..rv.mix_ring.len())
        .map(|i| {
            let ring = rv.mix_ring[i].clone();
            let pseudo = pseudo_outs[i];
            let clsag = rct_type.is_clsag().then(|| rv.p.clsags[i].clone());
            let mg = (!rct_type.is_clsag()).then(|| rv.p.mgs[i].clone());
            move || match (&clsag, &mg) {
                (Some(sig), _) => ver_rct_clsag_simple(&message, sig, &ring, &pseudo),
                (_, Some(sig)) => ver_rct_mg_simple(&message, sig, &ring, &pseudo),
                _ => false,
            }
        })
        .collect();
    let results = pool::run_all(tasks);
    for (i, ok) in results.iter().enumerate() {
        if !ok {
            debug!("ring signature verification failed for input {i}");
            return false;
        }
    }
    true
}

/// Check the declared burnt and minted amounts of a conversion against the
/// pricing record, in 128-bit arithmetic.
#[must_use]
pub fn check_burnt_and_minted(
    rv: &RctSig,
    amount_burnt: u64,
    amount_minted: u64,
    pr: &PricingRecord,
    source: &str,
    dest: &str,
    version: u8,
) -> bool {
    let pou = version >= HF_PER_OUTPUT_UNLOCK_VERSION;
    if source == XHV && dest == XUSD {
        let rate = if pou {
            pr.xusd_ma.min(pr.xusd)
        } else {
            pr.xusd_ma
        };
        let xusd = (u128::from(amount_burnt) * u128::from(rate)) / u128::from(COIN);
        check!(xusd == u128::from(amount_minted), "minted/burnt mismatch (offshore)");
        true
    } else if source == XUSD && dest == XHV {
        let rate = if pou {
            pr.xusd_ma.max(pr.xusd)
        } else {
            pr.xusd_ma
        };
        check!(rate != 0, "zero rate for onshore minted check");
        let xhv = (u128::from(amount_burnt) * u128::from(COIN)) / u128::from(rate);
        check!(xhv == u128::from(amount_minted), "minted/burnt mismatch (onshore)");
        true
    } else if source == XUSD && dest != XHV && dest != XUSD {
        let mut xusd = u128::from(amount_burnt);
        if version < HF_VERSION_USE_COLLATERAL {
            if version >= HF_VERSION_HAVEN2 {
                xusd = match xusd.checked_sub(u128::from(rv.txn_offshore_fee) * 4 / 5) {
                    Some(v) => v,
                    None => return false,
                };
            } else if version >= HF_VERSION_XASSET_FEES_V2 {
                xusd = match xusd.checked_sub(u128::from(rv.txn_offshore_fee_usd) * 4 / 5) {
                    Some(v) => v,
                    None => return false,
                };
            }
        }
        let xasset = (xusd * u128::from(pr.rate(dest))) / u128::from(COIN);
        check!(
            xasset == u128::from(amount_minted),
            "minted/burnt mismatch (xusd_to_xasset)"
        );
        true
    } else if source != XHV && source != XUSD && dest == XUSD {
        let mut xasset = u128::from(amount_burnt);
        if version < HF_VERSION_USE_COLLATERAL {
            if version >= HF_VERSION_HAVEN2 {
                xasset = match xasset.checked_sub(u128::from(rv.txn_offshore_fee) * 4 / 5) {
                    Some(v) => v,
                    None => return false,
                };
            } else if version >= HF_VERSION_XASSET_FEES_V2 {
                xasset = match xasset.checked_sub(u128::from(rv.txn_offshore_fee_xasset) * 4 / 5) {
                    Some(v) => v,
                    None => return false,
                };
            }
        }
        let rate = pr.rate(source);
        check!(rate != 0, "zero rate for xasset minted check");
        let xusd = (xasset * u128::from(COIN)) / u128::from(rate);
        check!(
            xusd == u128::from(amount_minted),
            "minted/burnt mismatch (xasset_to_xusd)"
        );
        true
    } else {
        debug!("minted/burnt values only valid for conversions");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn pr(ma: u64, spot: u64) -> PricingRecord {
        PricingRecord {
            xusd: spot,
            xusd_ma: ma,
            rates: BTreeMap::new(),
        }
    }

    #[test]
    fn burnt_minted_offshore_uses_min_after_pou() {
        let rv = RctSig::default();
        let record = pr(400 * COIN, 500 * COIN);
        // 1 XHV at min(400, 500) = 400 XUSD.
        assert!(check_burnt_and_minted(
            &rv,
            COIN,
            400 * COIN,
            &record,
            XHV,
            XUSD,
            HF_PER_OUTPUT_UNLOCK_VERSION
        ));
        assert!(!check_burnt_and_minted(
            &rv,
            COIN,
            500 * COIN,
            &record,
            XHV,
            XUSD,
            HF_PER_OUTPUT_UNLOCK_VERSION
        ));
        // Before the gate, the moving average alone applies.
        assert!(check_burnt_and_minted(
            &rv,
            COIN,
            400 * COIN,
            &record,
            XHV,
            XUSD,
            HF_VERSION_HAVEN2
        ));
    }

    #[test]
    fn burnt_minted_onshore_uses_max_after_pou() {
        let rv = RctSig::default();
        let record = pr(400 * COIN, 500 * COIN);
        // 500 XUSD at max(400, 500) = 1 XHV.
        assert!(check_burnt_and_minted(
            &rv,
            500 * COIN,
            COIN,
            &record,
            XUSD,
            XHV,
            HF_PER_OUTPUT_UNLOCK_VERSION
        ));
        assert!(!check_burnt_and_minted(
            &rv,
            400 * COIN,
            COIN,
            &record,
            XUSD,
            XHV,
            HF_PER_OUTPUT_UNLOCK_VERSION
        ));
    }

    #[test]
    fn burnt_minted_xasset_fee_is_stripped_before_collateral_era() {
        let mut rv = RctSig::default();
        rv.txn_offshore_fee = 100;
        let mut record = pr(0, 0);
        record.rates.insert("XAU".into(), COIN);
        // burnt carries the 80-unit burnt fee on top of 1000 converted.
        assert!(check_burnt_and_minted(
            &rv,
            1080,
            1000,
            &record,
            XUSD,
            "XAU",
            HF_VERSION_HAVEN2
        ));
        // From the collateral era the fee is no longer folded in.
        assert!(check_burnt_and_minted(
            &rv,
            1000,
            1000,
            &record,
            XUSD,
            "XAU",
            HF_VERSION_USE_COLLATERAL
        ));
    }

    #[test]
    fn burnt_minted_rejects_plain_transfers() {
        let rv = RctSig::default();
        assert!(!check_burnt_and_minted(
            &rv,
            1,
            1,
            &pr(1, 1),
            XHV,
            XHV,
            HF_VERSION_USE_COLLATERAL
        ));
    }

    #[test]
    fn semantics_v2_rejects_wrong_epoch() {
        let rv = RctSig {
            rct_type: Some(RctType::Clsag),
            ..Default::default()
        };
        assert!(!ver_rct_semantics_simple_2(
            &rv,
            &pr(1, 1),
            TransactionType::Transfer,
            XHV,
            XHV,
            0,
            &[],
            &[],
            HF_VERSION_USE_COLLATERAL,
            &[],
            0
        ));
    }
}
