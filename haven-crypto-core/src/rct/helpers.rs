//! Ring-population helpers for tests and simulation.
//!
//! Real deployments resolve decoys from the chain; these helpers fabricate
//! them, and are never on the consensus path.

use rand::Rng;

use crate::ops::{random_scalar, scalarmult_base};
use crate::types::rct::CtKey;

/// A random commitment+key pair standing in for a chain output.
#[must_use]
pub fn random_ctkey() -> CtKey {
    CtKey {
        dest: scalarmult_base(&random_scalar()).compress().to_bytes(),
        mask: scalarmult_base(&random_scalar()).compress().to_bytes(),
    }
}

/// Fill a ring of `mixin + 1` members with fabricated decoys, placing the
/// real pair at a uniformly random index, which is returned.
///
/// `mixin` is the explicit decoy bound; zero is allowed and produces a
/// ring of one.
pub fn populate_from_blockchain_simple(mix_ring: &mut Vec<CtKey>, in_pk: &CtKey, mixin: usize) -> usize {
    let index = rand::thread_rng().gen_range(0..=mixin);
    mix_ring.clear();
    mix_ring.reserve(mixin + 1);
    for i in 0..=mixin {
        if i == index {
            mix_ring.push(*in_pk);
        } else {
            mix_ring.push(random_ctkey());
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_real_key_at_returned_index() {
        let real = random_ctkey();
        let mut ring = Vec::new();
        let index = populate_from_blockchain_simple(&mut ring, &real, 10);
        assert_eq!(ring.len(), 11);
        assert_eq!(ring[index], real);
        assert_eq!(ring.iter().filter(|k| **k == real).count(), 1);
    }

    #[test]
    fn zero_mixin_gives_a_ring_of_one() {
        let real = random_ctkey();
        let mut ring = Vec::new();
        let index = populate_from_blockchain_simple(&mut ring, &real, 0);
        assert_eq!(index, 0);
        assert_eq!(ring, vec![real]);
    }
}
