//! MLSAG: the legacy multi-layer linkable ring signature.
//!
//! Retained only to verify historical transactions (epochs before
//! `RctType::Clsag`). The key matrix has `ds_rows` linkable rows (spend
//! keys, each bound to a key image) and `rows − ds_rows` non-linkable rows
//! carrying commitment data.
//!
//! See Noether, <https://eprint.iacr.org/2015/1098>.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use tracing::debug;

use crate::ops::{decode_point, decode_scalar, hash_to_point, is_identity, scalarmult_h};
use crate::types::errors::{RctError, RctResult};
use crate::types::rct::{CtKey, Key, MgSig, MultisigOut, RctSig, RctType};

/// Verify an MLSAG over an explicit key matrix.
///
/// `pk[col][row]`: `cols` ring members, each with `rows` keys of which the
/// first `ds_rows` are linkable.
#[must_use]
pub fn mlsag_ver(message: &Key, pk: &[Vec<Key>], rv: &MgSig, ds_rows: usize) -> bool {
    let cols = pk.len();
    if cols < 2 {
        debug!("MLSAG rejected: ring must contain more than one member");
        return false;
    }
    let rows = pk[0].len();
    if rows == 0 {
        debug!("MLSAG rejected: empty key rows");
        return false;
    }
    if pk.iter().any(|col| col.len() != rows) {
        debug!("MLSAG rejected: key matrix is not rectangular");
        return false;
    }
    if rv.II.len() != ds_rows {
        debug!("MLSAG rejected: wrong number of key images");
        return false;
    }
    if rv.ss.len() != cols || rv.ss.iter().any(|col| col.len() != rows) {
        debug!("MLSAG rejected: bad scalar matrix dimensions");
        return false;
    }
    if ds_rows > rows {
        debug!("MLSAG rejected: linkable rows exceed total rows");
        return false;
    }

    let mut ss = Vec::with_capacity(cols);
    for col in &rv.ss {
        let mut decoded = Vec::with_capacity(rows);
        for s in col {
            match decode_scalar(s) {
                Some(scalar) => decoded.push(scalar),
                None => {
                    debug!("MLSAG rejected: non-canonical response scalar");
                    return false;
                }
            }
        }
        ss.push(decoded);
    }
    let cc = match decode_scalar(&rv.cc) {
        Some(c) => c,
        None => {
            debug!("MLSAG rejected: non-canonical closing challenge");
            return false;
        }
    };

    let mut images = Vec::with_capacity(ds_rows);
    for image in &rv.II {
        match decode_point(image) {
            Some(p) if !is_identity(&p) => images.push(p),
            _ => {
                debug!("MLSAG rejected: bad key image");
                return false;
            }
        }
    }

    let mut c_old = cc;
    let nds = 3 * ds_rows;
    let mut to_hash = vec![[0u8; 32]; 1 + 3 * ds_rows + 2 * (rows - ds_rows)];
    to_hash[0] = *message;

    for col in 0..cols {
        for j in 0..ds_rows {
            let pk_point = match decode_point(&pk[col][j]) {
                Some(p) => p,
                None => {
                    debug!("MLSAG rejected: undecodable matrix key");
                    return false;
                }
            };
            let l_point = EdwardsPoint::vartime_multiscalar_mul(
                [ss[col][j], c_old],
                [ED25519_BASEPOINT_POINT, pk_point],
            );
            let hp = hash_to_point(&pk[col][j]);
            let r_point =
                EdwardsPoint::vartime_multiscalar_mul([ss[col][j], c_old], [hp, images[j]]);
            to_hash[3 * j + 1] = pk[col][j];
            to_hash[3 * j + 2] = l_point.compress().to_bytes();
            to_hash[3 * j + 3] = r_point.compress().to_bytes();
        }
        for (ii, j) in (ds_rows..rows).enumerate() {
            let pk_point = match decode_point(&pk[col][j]) {
                Some(p) => p,
                None => {
                    debug!("MLSAG rejected: undecodable matrix key");
                    return false;
                }
            };
            let l_point = EdwardsPoint::vartime_multiscalar_mul(
                [ss[col][j], c_old],
                [ED25519_BASEPOINT_POINT, pk_point],
            );
            to_hash[nds + 2 * ii + 1] = pk[col][j];
            to_hash[nds + 2 * ii + 2] = l_point.compress().to_bytes();
        }
        let c = crate::ops::hash_to_scalar_keys(&to_hash);
        if c == Scalar::ZERO {
            debug!("MLSAG rejected: zero challenge");
            return false;
        }
        c_old = c;
    }

    if c_old == cc {
        true
    } else {
        debug!("MLSAG rejected: ring did not close");
        false
    }
}

/// Verify the single aggregate MLSAG of a `Full`-type signature.
///
/// The last matrix row sums each member's input commitments and subtracts
/// all output commitments and the cleartext fee, so a closing ring proves
/// the balance equation alongside ownership.
#[must_use]
pub fn ver_rct_mg(
    mg: &MgSig,
    pubs: &[Vec<CtKey>],
    out_pk: &[CtKey],
    txn_fee: u64,
    message: &Key,
) -> bool {
    let cols = pubs.len();
    if cols == 0 {
        debug!("MLSAG rejected: empty pubs");
        return false;
    }
    let rows = pubs[0].len();
    if rows == 0 || pubs.iter().any(|col| col.len() != rows) {
        debug!("MLSAG rejected: pubs is not rectangular");
        return false;
    }

    let fee_key = scalarmult_h(txn_fee);
    let mut matrix = Vec::with_capacity(cols);
    for col in pubs {
        let mut balance = -fee_key;
        let mut keys = Vec::with_capacity(rows + 1);
        for entry in col {
            keys.push(entry.dest);
            match decode_point(&entry.mask) {
                Some(p) => balance += p,
                None => {
                    debug!("MLSAG rejected: undecodable input commitment");
                    return false;
                }
            }
        }
        for out in out_pk {
            match decode_point(&out.mask) {
                Some(p) => balance -= p,
                None => {
                    debug!("MLSAG rejected: undecodable output commitment");
                    return false;
                }
            }
        }
        keys.push(balance.compress().to_bytes());
        matrix.push(keys);
    }
    mlsag_ver(message, &matrix, mg, rows)
}

/// Verify a per-input MLSAG against its ring and pseudo-output commitment.
#[must_use]
pub fn ver_rct_mg_simple(message: &Key, mg: &MgSig, pubs: &[CtKey], c_offset: &Key) -> bool {
    let cols = pubs.len();
    if cols == 0 {
        debug!("MLSAG rejected: empty pubs");
        return false;
    }
    let offset_point = match decode_point(c_offset) {
        Some(p) => p,
        None => {
            debug!("MLSAG rejected: bad pseudo-output commitment");
            return false;
        }
    };
    let mut matrix = Vec::with_capacity(cols);
    for entry in pubs {
        let mask_point = match decode_point(&entry.mask) {
            Some(p) => p,
            None => {
                debug!("MLSAG rejected: undecodable ring commitment");
                return false;
            }
        };
        matrix.push(vec![
            entry.dest,
            (mask_point - offset_point).compress().to_bytes(),
        ]);
    }
    mlsag_ver(message, &matrix, mg, 1)
}

/// Fold one cosigner's share into every MLSAG of a partially signed legacy
/// transaction: `ss[l][0] += k − c·share`.
pub fn sign_multisig_mlsag(
    rv: &mut RctSig,
    indices: &[usize],
    k: &[Key],
    msout: &MultisigOut,
    secret_key: &Key,
) -> RctResult<()> {
    match rv.rct_type() {
        RctType::Full | RctType::Simple | RctType::Bulletproof | RctType::Bulletproof2 => {}
        _ => return Err(RctError::UnsupportedRctType("MLSAG multisig signing")),
    }
    if indices.len() != k.len() || k.len() != rv.p.mgs.len() || k.len() != msout.c.len() {
        return Err(RctError::MultisigInconsistent(
            "share/ring counts disagree".into(),
        ));
    }
    if !rv.p.clsags.is_empty() {
        return Err(RctError::MultisigInconsistent(
            "CLSAG data present on an MLSAG transaction".into(),
        ));
    }
    if rv.rct_type() == RctType::Full && rv.p.mgs.len() != 1 {
        return Err(RctError::MultisigInconsistent(
            "full signature must carry a single MLSAG".into(),
        ));
    }

    let share = decode_scalar(secret_key).ok_or(RctError::InvalidScalar("multisig share"))?;
    for n in 0..indices.len() {
        let index = indices[n];
        let mg = &mut rv.p.mgs[n];
        if index >= mg.ss.len() || mg.ss[index].is_empty() {
            return Err(RctError::IndexOutOfRange {
                index,
                size: mg.ss.len(),
            });
        }
        let c = decode_scalar(&msout.c[n]).ok_or(RctError::InvalidScalar("exported challenge"))?;
        let nonce = decode_scalar(&k[n]).ok_or(RctError::InvalidScalar("nonce share"))?;
        let s = decode_scalar(&mg.ss[index][0])
            .ok_or(RctError::InvalidScalar("partial response scalar"))?;
        mg.ss[index][0] = (s + (nonce - c * share)).to_bytes();
    }
    Ok(())
}

/// Accumulate MLSAG cosigner partials into the received transaction, base
/// share subtracted once per contribution.
pub fn acc_sign_multisig_mlsag(
    partials: &[RctSig],
    recv: &mut RctSig,
    indices: &[usize],
) -> RctResult<()> {
    match recv.rct_type() {
        RctType::Full | RctType::Simple | RctType::Bulletproof | RctType::Bulletproof2 => {}
        _ => return Err(RctError::UnsupportedRctType("MLSAG multisig accumulation")),
    }
    let base = partials.first().ok_or(RctError::MultisigInconsistent(
        "no partial signatures to accumulate".into(),
    ))?;

    for (n, &index) in indices.iter().enumerate() {
        if n >= recv.p.mgs.len() || index >= recv.p.mgs[n].ss.len() {
            return Err(RctError::IndexOutOfRange {
                index,
                size: recv.p.mgs.len(),
            });
        }
        let base_s = decode_scalar(&base.p.mgs[n].ss[index][0])
            .ok_or(RctError::InvalidScalar("base partial response"))?;
        let mut acc = decode_scalar(&recv.p.mgs[n].ss[index][0])
            .ok_or(RctError::InvalidScalar("received response scalar"))?;
        for partial in &partials[1..] {
            let s = decode_scalar(&partial.p.mgs[n].ss[index][0])
                .ok_or(RctError::InvalidScalar("partial response scalar"))?;
            acc += s - base_s;
        }
        recv.p.mgs[n].ss[index][0] = acc.to_bytes();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{hash_to_scalar_keys, random_scalar, scalarmult_base};

    /// Sign a 1-row MLSAG directly (the historical prover is out of scope;
    /// the verifier must still accept a correctly formed ring).
    fn sign_simple_mlsag(message: &Key, pk: &[Vec<Key>], x: &Scalar, index: usize) -> MgSig {
        let cols = pk.len();
        let rows = pk[0].len();
        assert_eq!(rows, 1);

        let hp = hash_to_point(&pk[index][0]);
        let image = x * hp;
        let alpha = random_scalar();

        let mut ss = vec![vec![[0u8; 32]; rows]; cols];
        let mut to_hash = vec![[0u8; 32]; 4];
        to_hash[0] = *message;
        to_hash[1] = pk[index][0];
        to_hash[2] = scalarmult_base(&alpha).compress().to_bytes();
        to_hash[3] = (alpha * hp).compress().to_bytes();
        let mut c_old = hash_to_scalar_keys(&to_hash);

        let mut i = (index + 1) % cols;
        let mut cc = [0u8; 32];
        if i == 0 {
            cc = c_old.to_bytes();
        }
        while i != index {
            let s = random_scalar();
            ss[i][0] = s.to_bytes();
            let pk_point = decode_point(&pk[i][0]).unwrap();
            let l = scalarmult_base(&s) + c_old * pk_point;
            let r = s * hash_to_point(&pk[i][0]) + c_old * image;
            to_hash[1] = pk[i][0];
            to_hash[2] = l.compress().to_bytes();
            to_hash[3] = r.compress().to_bytes();
            c_old = hash_to_scalar_keys(&to_hash);
            i = (i + 1) % cols;
            if i == 0 {
                cc = c_old.to_bytes();
            }
        }
        ss[index][0] = (alpha - c_old * x).to_bytes();

        MgSig {
            ss,
            cc,
            II: vec![image.compress().to_bytes()],
        }
    }

    #[test]
    fn verifies_one_row_ring() {
        let message = [0x55u8; 32];
        let x = random_scalar();
        let index = 3;
        let cols = 6;
        let mut pk = Vec::with_capacity(cols);
        for i in 0..cols {
            let key = if i == index {
                scalarmult_base(&x)
            } else {
                scalarmult_base(&random_scalar())
            };
            pk.push(vec![key.compress().to_bytes()]);
        }
        let mg = sign_simple_mlsag(&message, &pk, &x, index);
        assert!(mlsag_ver(&message, &pk, &mg, 1));
    }

    #[test]
    fn rejects_tampered_scalar() {
        let message = [0x55u8; 32];
        let x = random_scalar();
        let cols = 4;
        let mut pk = Vec::with_capacity(cols);
        for i in 0..cols {
            let key = if i == 0 {
                scalarmult_base(&x)
            } else {
                scalarmult_base(&random_scalar())
            };
            pk.push(vec![key.compress().to_bytes()]);
        }
        let mut mg = sign_simple_mlsag(&message, &pk, &x, 0);
        mg.ss[1][0][0] ^= 1;
        assert!(!mlsag_ver(&message, &pk, &mg, 1));
    }

    #[test]
    fn rejects_identity_key_image() {
        let message = [0u8; 32];
        let pk = vec![vec![[9u8; 32]], vec![[9u8; 32]]];
        let mut identity = [0u8; 32];
        identity[0] = 1;
        let mg = MgSig {
            ss: vec![vec![[0u8; 32]]; 2],
            cc: [0u8; 32],
            II: vec![identity],
        };
        assert!(!mlsag_ver(&message, &pk, &mg, 1));
    }

    #[test]
    fn rejects_single_column() {
        let message = [0u8; 32];
        let pk = vec![vec![[9u8; 32]]];
        let mg = MgSig {
            ss: vec![vec![[0u8; 32]]],
            cc: [0u8; 32],
            II: vec![[0u8; 32]],
        };
        assert!(!mlsag_ver(&message, &pk, &mg, 1));
    }
}
