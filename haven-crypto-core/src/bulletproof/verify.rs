//! Bulletproof batch verification.
//!
//! Many proofs are checked in a single multi-exponentiation: each proof's
//! two verification equations are folded in under independent random
//! weights, the per-generator folding coefficients are accumulated across
//! the batch, and the whole sum must land on the group identity.
//!
//! Every failure path (undecodable points, non-canonical scalars, shape
//! violations, a non-identity result) returns `false`; nothing panics on
//! adversarial input.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use tracing::debug;

use super::{
    inner_product_one_two, transcript_mash, vector_powers, BP_LOG_N, BP_MAX_M, BP_N, GENERATORS,
};
use crate::ops::{decode_point, decode_scalar, hash_to_scalar_keys, invert, random_scalar};
use crate::pedersen::H;
use crate::types::rct::Bulletproof;

struct DecodedProof {
    v: Vec<EdwardsPoint>,
    a_point: EdwardsPoint,
    s_point: EdwardsPoint,
    t1: EdwardsPoint,
    t2: EdwardsPoint,
    l: Vec<EdwardsPoint>,
    r: Vec<EdwardsPoint>,
    taux: Scalar,
    mu: Scalar,
    a: Scalar,
    b: Scalar,
    t: Scalar,
    y: Scalar,
    z: Scalar,
    x: Scalar,
    x_ip: Scalar,
    w: Vec<Scalar>,
    mn: usize,
    m: usize,
    rounds: usize,
}

/// Decode one proof and replay its transcript. `None` on any malformed
/// content.
#[allow(non_snake_case)]
fn decode_and_replay(proof: &Bulletproof) -> Option<DecodedProof> {
    if proof.V.is_empty() || proof.L.len() != proof.R.len() || proof.L.len() < BP_LOG_N {
        return None;
    }
    let log_m = proof.L.len() - BP_LOG_N;
    if log_m > 4 {
        return None;
    }
    let m = 1usize << log_m;
    if proof.V.len() > m || m > BP_MAX_M {
        return None;
    }
    let mn = m * BP_N;
    let rounds = proof.L.len();

    // Published points carry an INV_EIGHT factor: decompress then ·8.
    let mut v = Vec::with_capacity(proof.V.len());
    for key in &proof.V {
        v.push(decode_point(key)?.mul_by_cofactor());
    }
    let a_point = decode_point(&proof.A)?.mul_by_cofactor();
    let s_point = decode_point(&proof.S)?.mul_by_cofactor();
    let t1 = decode_point(&proof.T1)?.mul_by_cofactor();
    let t2 = decode_point(&proof.T2)?.mul_by_cofactor();
    let mut l = Vec::with_capacity(rounds);
    let mut r = Vec::with_capacity(rounds);
    for (lk, rk) in proof.L.iter().zip(proof.R.iter()) {
        l.push(decode_point(lk)?.mul_by_cofactor());
        r.push(decode_point(rk)?.mul_by_cofactor());
    }

    let taux = decode_scalar(&proof.taux)?;
    let mu = decode_scalar(&proof.mu)?;
    let a = decode_scalar(&proof.a)?;
    let b = decode_scalar(&proof.b)?;
    let t = decode_scalar(&proof.t)?;

    // Transcript replay.
    let mut cache = hash_to_scalar_keys(&proof.V);
    let y = transcript_mash(&mut cache, &[&proof.A, &proof.S]);
    if y == Scalar::ZERO {
        return None;
    }
    let z = transcript_mash(&mut cache, &[]);
    if z == Scalar::ZERO {
        return None;
    }
    let z_bytes = z.to_bytes();
    let x = transcript_mash(&mut cache, &[&z_bytes, &proof.T1, &proof.T2]);
    if x == Scalar::ZERO {
        return None;
    }
    let x_bytes = x.to_bytes();
    let x_ip = transcript_mash(
        &mut cache,
        &[&x_bytes, &proof.taux, &proof.mu, &proof.t],
    );
    if x_ip == Scalar::ZERO {
        return None;
    }
    let mut w = Vec::with_capacity(rounds);
    for (lk, rk) in proof.L.iter().zip(proof.R.iter()) {
        let challenge = transcript_mash(&mut cache, &[lk, rk]);
        if challenge == Scalar::ZERO {
            return None;
        }
        w.push(challenge);
    }

    Some(DecodedProof {
        v,
        a_point,
        s_point,
        t1,
        t2,
        l,
        r,
        taux,
        mu,
        a,
        b,
        t,
        y,
        z,
        x,
        x_ip,
        w,
        mn,
        m,
        rounds,
    })
}

/// The folding coefficient of every original generator after all rounds:
/// `w_cache[i] = Π_j w_j^{±1}` following the split pattern of index `i`.
fn fold_coefficients(w: &[Scalar], w_inv: &[Scalar], mn: usize) -> Vec<Scalar> {
    let rounds = w.len();
    let mut cache = vec![Scalar::ZERO; mn];
    cache[0] = w_inv[0];
    cache[1] = w[0];
    for j in 1..rounds {
        let slots = 1usize << (j + 1);
        let mut s = slots;
        while s > 0 {
            s -= 1;
            cache[s] = cache[s / 2] * w[j];
            cache[s - 1] = cache[s / 2] * w_inv[j];
            s -= 1;
        }
    }
    cache
}

/// Verify a batch of aggregated range proofs in one multi-exponentiation.
/// The batch accepts only if every member proof is valid.
#[must_use]
#[allow(non_snake_case)]
pub fn ver_bulletproof(proofs: &[&Bulletproof]) -> bool {
    if proofs.is_empty() {
        return true;
    }

    let mut decoded = Vec::with_capacity(proofs.len());
    let mut max_mn = 0usize;
    for proof in proofs {
        match decode_and_replay(proof) {
            Some(d) => {
                max_mn = max_mn.max(d.mn);
                decoded.push(d);
            }
            None => {
                debug!("bulletproof rejected: malformed proof data");
                return false;
            }
        }
    }

    let ip12 = inner_product_one_two();

    // Accumulated multiexp: shared generator scalars plus per-proof points.
    let mut g_scalar_acc = Scalar::ZERO;
    let mut h_scalar_acc = Scalar::ZERO;
    let mut gi_scalars = vec![Scalar::ZERO; max_mn];
    let mut hi_scalars = vec![Scalar::ZERO; max_mn];
    let mut extra_scalars: Vec<Scalar> = Vec::new();
    let mut extra_points: Vec<EdwardsPoint> = Vec::new();

    for d in &decoded {
        let weight_y = random_scalar();
        let weight_z = random_scalar();

        let y_powers = vector_powers(&d.y, d.mn + 1);
        let z_powers = vector_powers(&d.z, d.m + 3);
        let ip1y: Scalar = y_powers[..d.mn].iter().sum();

        // First equation: polynomial identity at the challenge point.
        //   Σ z^(2+j)·8V_j + x·8T1 + x²·8T2 − taux·G − (t − δ(y,z))·H == 0
        let mut k = -(z_powers[2] * ip1y);
        for j in 1..=d.m {
            k -= z_powers[j + 2] * ip12;
        }
        let delta = k + d.z * ip1y;

        g_scalar_acc -= weight_y * d.taux;
        h_scalar_acc -= weight_y * (d.t - delta);
        for (j, v) in d.v.iter().enumerate() {
            extra_scalars.push(weight_y * z_powers[j + 2]);
            extra_points.push(*v);
        }
        extra_scalars.push(weight_y * d.x);
        extra_points.push(d.t1);
        extra_scalars.push(weight_y * (d.x * d.x));
        extra_points.push(d.t2);

        // Second equation: the folded inner-product relation.
        //   8A + x·8S − mu·G − Σ g_i·Gi − Σ h_i·Hi
        //     + (t − a·b)·x_ip·H + Σ (w_j²·8L_j + w_j^(−2)·8R_j) == 0
        let w_inv: Vec<Scalar> = d.w.iter().map(invert).collect();
        let y_inv = invert(&d.y);
        let y_inv_powers = vector_powers(&y_inv, d.mn);
        let coefficients = fold_coefficients(&d.w, &w_inv, d.mn);

        extra_scalars.push(weight_z);
        extra_points.push(d.a_point);
        extra_scalars.push(weight_z * d.x);
        extra_points.push(d.s_point);
        g_scalar_acc -= weight_z * d.mu;
        h_scalar_acc += weight_z * (d.t - d.a * d.b) * d.x_ip;

        for j in 0..d.rounds {
            extra_scalars.push(weight_z * (d.w[j] * d.w[j]));
            extra_points.push(d.l[j]);
            extra_scalars.push(weight_z * (w_inv[j] * w_inv[j]));
            extra_points.push(d.r[j]);
        }

        let two_n = vector_powers(&crate::ops::d2h(2), BP_N);
        for i in 0..d.mn {
            let g_scalar = d.a * coefficients[i] + d.z;
            let mut h_scalar = d.b * y_inv_powers[i] * coefficients[(!i) & (d.mn - 1)];
            h_scalar -= (d.z * y_powers[i] + z_powers[2 + i / BP_N] * two_n[i % BP_N])
                * y_inv_powers[i];
            gi_scalars[i] -= weight_z * g_scalar;
            hi_scalars[i] -= weight_z * h_scalar;
        }
    }

    let mut scalars = Vec::with_capacity(2 + 2 * max_mn + extra_scalars.len());
    let mut points = Vec::with_capacity(scalars.capacity());
    scalars.push(g_scalar_acc);
    points.push(ED25519_BASEPOINT_POINT);
    scalars.push(h_scalar_acc);
    points.push(*H);
    for i in 0..max_mn {
        scalars.push(gi_scalars[i]);
        points.push(GENERATORS.gi[i]);
        scalars.push(hi_scalars[i]);
        points.push(GENERATORS.hi[i]);
    }
    scalars.extend(extra_scalars);
    points.extend(extra_points);

    let result = EdwardsPoint::vartime_multiscalar_mul(&scalars, &points);
    if crate::ops::is_identity(&result) {
        true
    } else {
        debug!("bulletproof rejected: batch equation did not close");
        false
    }
}

/// Verify a single proof.
#[must_use]
pub fn ver_bulletproof_single(proof: &Bulletproof) -> bool {
    ver_bulletproof(&[proof])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulletproof::make_dummy_bulletproof;
    use crate::bulletproof::prove::prove_range_bulletproof;

    #[test]
    fn batch_of_independent_proofs() {
        let p1 = prove_range_bulletproof(&[1], &[random_scalar()]).unwrap();
        let p2 = prove_range_bulletproof(
            &[2, 3],
            &[random_scalar(), random_scalar()],
        )
        .unwrap();
        let p3 = prove_range_bulletproof(
            &[u64::MAX, 0, 7],
            &[random_scalar(), random_scalar(), random_scalar()],
        )
        .unwrap();
        assert!(ver_bulletproof(&[&p1, &p2, &p3]));
    }

    #[test]
    fn batch_fails_when_any_member_is_bad() {
        let p1 = prove_range_bulletproof(&[10], &[random_scalar()]).unwrap();
        let mut p2 = prove_range_bulletproof(&[20], &[random_scalar()]).unwrap();
        p2.taux[0] ^= 1;
        assert!(ver_bulletproof_single(&p1));
        assert!(!ver_bulletproof(&[&p1, &p2]));
    }

    #[test]
    fn tampering_any_field_rejects() {
        let reference = prove_range_bulletproof(&[55, 66], &[random_scalar(), random_scalar()])
            .unwrap();
        let mut cases: Vec<Bulletproof> = Vec::new();
        for field in 0..8 {
            let mut p = reference.clone();
            match field {
                0 => p.A[1] ^= 1,
                1 => p.S[1] ^= 1,
                2 => p.T1[1] ^= 1,
                3 => p.T2[1] ^= 1,
                4 => p.mu[0] ^= 1,
                5 => p.t[0] ^= 1,
                6 => p.a[0] ^= 1,
                7 => p.b[0] ^= 1,
                _ => unreachable!(),
            }
            cases.push(p);
        }
        for p in &cases {
            assert!(!ver_bulletproof_single(p));
        }
    }

    #[test]
    fn dummy_proof_is_rejected() {
        let (dummy, _, _) = make_dummy_bulletproof(&[1, 2]);
        assert!(!ver_bulletproof_single(&dummy));
    }

    #[test]
    fn empty_batch_is_vacuously_true() {
        assert!(ver_bulletproof(&[]));
    }

    #[test]
    fn truncated_rounds_are_rejected() {
        let mut p = prove_range_bulletproof(&[9], &[random_scalar()]).unwrap();
        p.L.pop();
        p.R.pop();
        assert!(!ver_bulletproof_single(&p));
    }
}
