//! Bulletproof prover.
//!
//! Produces one aggregated proof over all output amounts, padded with zero
//! amounts to the next power of two. Masks are supplied by the caller (the
//! device derives them deterministically from the amount keys) so the proof
//! can be recomputed during hardware signing.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use zeroize::Zeroize;

use super::{padded_m, transcript_mash, vector_powers, BP_LOG_N, BP_MAX_M, BP_N, GENERATORS};
use crate::ops::{d2h, hash_to_scalar_keys, invert, random_scalar};
use crate::pedersen::{H, INV_EIGHT};
use crate::types::errors::{RctError, RctResult};
use crate::types::rct::Bulletproof;

fn inner_product(a: &[Scalar], b: &[Scalar]) -> Scalar {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Prove that every `amounts[i]` lies in `[0, 2^64)` under the commitment
/// `masks[i]·G + amounts[i]·H`.
///
/// The returned proof's `V` entries are the commitments divided by 8;
/// callers publish `out_pk.mask = 8·V[i]`.
#[allow(non_snake_case)]
pub fn prove_range_bulletproof(amounts: &[u64], masks: &[Scalar]) -> RctResult<Bulletproof> {
    if amounts.is_empty() {
        return Err(RctError::EmptyInputs);
    }
    if amounts.len() != masks.len() {
        return Err(RctError::LengthMismatch {
            what: "bulletproof amounts/masks",
            expected: amounts.len(),
            actual: masks.len(),
        });
    }
    if amounts.len() > BP_MAX_M {
        return Err(RctError::LengthMismatch {
            what: "bulletproof aggregation",
            expected: BP_MAX_M,
            actual: amounts.len(),
        });
    }

    let (m, log_m) = padded_m(amounts.len());
    let mn = m * BP_N;
    let log_mn = log_m + BP_LOG_N;
    let inv8 = *INV_EIGHT;
    let gi = &GENERATORS.gi[..mn];
    let hi = &GENERATORS.hi[..mn];

    // V[j] = (gamma[j]·G + v[j]·H)·(1/8)
    let mut V = Vec::with_capacity(amounts.len());
    for (amount, mask) in amounts.iter().zip(masks.iter()) {
        let commitment = EdwardsPoint::vartime_multiscalar_mul(
            [mask * inv8, d2h(*amount) * inv8],
            [ED25519_BASEPOINT_POINT, *H],
        );
        V.push(commitment.compress().to_bytes());
    }

    // Bit decomposition, padded columns all zero.
    let minus_one = -Scalar::ONE;
    let mut aL = vec![Scalar::ZERO; mn];
    let mut aR = vec![Scalar::ZERO; mn];
    for (j, amount) in amounts.iter().enumerate() {
        for i in 0..BP_N {
            if (amount >> i) & 1 == 1 {
                aL[j * BP_N + i] = Scalar::ONE;
            } else {
                aR[j * BP_N + i] = minus_one;
            }
        }
    }
    for i in amounts.len() * BP_N..mn {
        aR[i] = minus_one;
    }

    let two_n = vector_powers(&d2h(2), BP_N);

    // The challenge cascade can in principle produce a zero scalar; restart
    // with fresh blinding when it does, exactly like the reference prover.
    loop {
        let mut cache = hash_to_scalar_keys(&V);

        let alpha = random_scalar();
        let mut a_scalars = Vec::with_capacity(2 * mn + 1);
        let mut a_points = Vec::with_capacity(2 * mn + 1);
        for i in 0..mn {
            a_scalars.push(aL[i] * inv8);
            a_points.push(gi[i]);
            a_scalars.push(aR[i] * inv8);
            a_points.push(hi[i]);
        }
        a_scalars.push(alpha * inv8);
        a_points.push(ED25519_BASEPOINT_POINT);
        let A = EdwardsPoint::vartime_multiscalar_mul(&a_scalars, &a_points)
            .compress()
            .to_bytes();

        let rho = random_scalar();
        let sL: Vec<Scalar> = (0..mn).map(|_| random_scalar()).collect();
        let sR: Vec<Scalar> = (0..mn).map(|_| random_scalar()).collect();
        let mut s_scalars = Vec::with_capacity(2 * mn + 1);
        let mut s_points = Vec::with_capacity(2 * mn + 1);
        for i in 0..mn {
            s_scalars.push(sL[i] * inv8);
            s_points.push(gi[i]);
            s_scalars.push(sR[i] * inv8);
            s_points.push(hi[i]);
        }
        s_scalars.push(rho * inv8);
        s_points.push(ED25519_BASEPOINT_POINT);
        let S = EdwardsPoint::vartime_multiscalar_mul(&s_scalars, &s_points)
            .compress()
            .to_bytes();

        let y = transcript_mash(&mut cache, &[&A, &S]);
        if y == Scalar::ZERO {
            continue;
        }
        let z = transcript_mash(&mut cache, &[]);
        if z == Scalar::ZERO {
            continue;
        }

        let y_powers = vector_powers(&y, mn);
        let z_powers = vector_powers(&z, m + 3);

        // l0 = aL − z·1 ; r0 = y^i ∘ (aR + z·1) + windowed 2^i·z^(2+j)
        let mut l0 = Vec::with_capacity(mn);
        let mut r0 = Vec::with_capacity(mn);
        for i in 0..mn {
            l0.push(aL[i] - z);
            let mut r = (aR[i] + z) * y_powers[i];
            r += z_powers[2 + i / BP_N] * two_n[i % BP_N];
            r0.push(r);
        }
        let l1 = &sL;
        let r1: Vec<Scalar> = (0..mn).map(|i| sR[i] * y_powers[i]).collect();

        let t1 = inner_product(&l0, &r1) + inner_product(l1, &r0);
        let t2 = inner_product(l1, &r1);

        let tau1 = random_scalar();
        let tau2 = random_scalar();
        let T1 = EdwardsPoint::vartime_multiscalar_mul(
            [tau1 * inv8, t1 * inv8],
            [ED25519_BASEPOINT_POINT, *H],
        )
        .compress()
        .to_bytes();
        let T2 = EdwardsPoint::vartime_multiscalar_mul(
            [tau2 * inv8, t2 * inv8],
            [ED25519_BASEPOINT_POINT, *H],
        )
        .compress()
        .to_bytes();

        let z_bytes = z.to_bytes();
        let x = transcript_mash(&mut cache, &[&z_bytes, &T1, &T2]);
        if x == Scalar::ZERO {
            continue;
        }

        let mut taux = tau1 * x + tau2 * (x * x);
        for (j, mask) in masks.iter().enumerate() {
            taux += z_powers[2 + j] * mask;
        }
        let mu = x * rho + alpha;

        let mut l: Vec<Scalar> = (0..mn).map(|i| l0[i] + l1[i] * x).collect();
        let mut r: Vec<Scalar> = (0..mn).map(|i| r0[i] + r1[i] * x).collect();
        let t = inner_product(&l, &r);

        let x_bytes = x.to_bytes();
        let taux_bytes = taux.to_bytes();
        let mu_bytes = mu.to_bytes();
        let t_bytes = t.to_bytes();
        let x_ip = transcript_mash(&mut cache, &[&x_bytes, &taux_bytes, &mu_bytes, &t_bytes]);
        if x_ip == Scalar::ZERO {
            continue;
        }

        // Inner-product argument over Gi and Hi' = Hi·y^(−i).
        let y_inv = invert(&y);
        let y_inv_powers = vector_powers(&y_inv, mn);
        let mut g_prime: Vec<EdwardsPoint> = gi.to_vec();
        let mut h_prime: Vec<EdwardsPoint> = (0..mn).map(|i| hi[i] * y_inv_powers[i]).collect();

        let mut L = Vec::with_capacity(log_mn);
        let mut R = Vec::with_capacity(log_mn);
        let mut n_prime = mn;
        let mut round_failed = false;

        while n_prime > 1 {
            n_prime /= 2;

            let c_l = inner_product(&l[..n_prime], &r[n_prime..2 * n_prime]);
            let c_r = inner_product(&l[n_prime..2 * n_prime], &r[..n_prime]);

            let mut l_scalars = Vec::with_capacity(2 * n_prime + 1);
            let mut l_points = Vec::with_capacity(2 * n_prime + 1);
            for i in 0..n_prime {
                l_scalars.push(l[i] * inv8);
                l_points.push(g_prime[n_prime + i]);
                l_scalars.push(r[n_prime + i] * inv8);
                l_points.push(h_prime[i]);
            }
            l_scalars.push(c_l * x_ip * inv8);
            l_points.push(*H);
            let l_round = EdwardsPoint::vartime_multiscalar_mul(&l_scalars, &l_points)
                .compress()
                .to_bytes();

            let mut r_scalars = Vec::with_capacity(2 * n_prime + 1);
            let mut r_points = Vec::with_capacity(2 * n_prime + 1);
            for i in 0..n_prime {
                r_scalars.push(l[n_prime + i] * inv8);
                r_points.push(g_prime[i]);
                r_scalars.push(r[i] * inv8);
                r_points.push(h_prime[n_prime + i]);
            }
            r_scalars.push(c_r * x_ip * inv8);
            r_points.push(*H);
            let r_round = EdwardsPoint::vartime_multiscalar_mul(&r_scalars, &r_points)
                .compress()
                .to_bytes();

            let w = transcript_mash(&mut cache, &[&l_round, &r_round]);
            if w == Scalar::ZERO {
                round_failed = true;
                break;
            }
            let w_inv = invert(&w);

            L.push(l_round);
            R.push(r_round);

            for i in 0..n_prime {
                g_prime[i] = EdwardsPoint::vartime_multiscalar_mul(
                    [w_inv, w],
                    [g_prime[i], g_prime[n_prime + i]],
                );
                h_prime[i] = EdwardsPoint::vartime_multiscalar_mul(
                    [w, w_inv],
                    [h_prime[i], h_prime[n_prime + i]],
                );
                l[i] = l[i] * w + l[n_prime + i] * w_inv;
                r[i] = r[i] * w_inv + r[n_prime + i] * w;
            }
            l.truncate(n_prime);
            r.truncate(n_prime);
        }
        if round_failed {
            continue;
        }

        let proof = Bulletproof {
            V,
            A,
            S,
            T1,
            T2,
            taux: taux.to_bytes(),
            mu: mu.to_bytes(),
            L,
            R,
            a: l[0].to_bytes(),
            b: r[0].to_bytes(),
            t: t.to_bytes(),
        };
        taux.zeroize();
        return Ok(proof);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulletproof::verify::ver_bulletproof_single;

    #[test]
    fn single_amount_proves_and_verifies() {
        let proof = prove_range_bulletproof(&[12_345], &[random_scalar()]).unwrap();
        assert_eq!(proof.L.len(), BP_LOG_N);
        assert!(ver_bulletproof_single(&proof));
    }

    #[test]
    fn boundary_amounts_prove() {
        let masks: Vec<Scalar> = (0..2).map(|_| random_scalar()).collect();
        let proof = prove_range_bulletproof(&[0, u64::MAX], &masks).unwrap();
        assert!(ver_bulletproof_single(&proof));
    }

    #[test]
    fn padding_to_power_of_two() {
        let masks: Vec<Scalar> = (0..3).map(|_| random_scalar()).collect();
        let proof = prove_range_bulletproof(&[1, 2, 3], &masks).unwrap();
        // 3 outputs pad to 4: 6 + 2 rounds.
        assert_eq!(proof.L.len(), BP_LOG_N + 2);
        assert_eq!(proof.V.len(), 3);
        assert!(ver_bulletproof_single(&proof));
    }

    #[test]
    fn max_aggregation_proves() {
        let amounts: Vec<u64> = (0..16).map(|i| i * 1_000).collect();
        let masks: Vec<Scalar> = (0..16).map(|_| random_scalar()).collect();
        let proof = prove_range_bulletproof(&amounts, &masks).unwrap();
        assert_eq!(proof.L.len(), BP_LOG_N + 4);
        assert!(ver_bulletproof_single(&proof));
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let err = prove_range_bulletproof(&[1, 2], &[random_scalar()]).unwrap_err();
        assert!(matches!(err, RctError::LengthMismatch { .. }));
    }

    #[test]
    fn rejects_over_aggregation() {
        let amounts = vec![1u64; 17];
        let masks: Vec<Scalar> = (0..17).map(|_| random_scalar()).collect();
        assert!(prove_range_bulletproof(&amounts, &masks).is_err());
    }
}
