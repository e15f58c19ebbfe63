//! The key-handling device capability.
//!
//! Assembly routes three operations through a device so that hardware
//! wallets can keep amount keys on-device: deterministic commitment-mask
//! derivation, ECDH blob sealing, and the final message-hash step (some
//! devices display output details during that call). The device also
//! announces a mode; `TransactionCreateFake` selects structurally valid but
//! cryptographically void bulletproofs for watch-only simulation.
//!
//! The capability is a trait with a software default rather than an
//! inheritance tree, so the common path stays fully inlineable.

use curve25519_dalek::scalar::Scalar;

use crate::ops::keccak256;
use crate::types::rct::{CtKey, EcdhTuple, Key};

/// Operating mode announced by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceMode {
    /// Normal operation.
    #[default]
    Default,
    /// Producing a real transaction.
    TransactionCreateReal,
    /// Simulating a transaction without valid proofs (watch-only).
    TransactionCreateFake,
    /// Parsing an incoming transaction.
    TransactionParse,
}

/// The three key-handling operations assembly delegates.
pub trait Device {
    /// The device's current mode.
    fn mode(&self) -> DeviceMode {
        DeviceMode::Default
    }

    /// Deterministic commitment mask for one output's amount key.
    fn gen_commitment_mask(&self, amount_key: &Key) -> Scalar;

    /// Seal an output's `(mask, amount)` blob.
    fn ecdh_encode(&self, ecdh: &mut EcdhTuple, amount_key: &Key, short_amount: bool);

    /// Open an output's `(mask, amount)` blob.
    fn ecdh_decode(&self, ecdh: &mut EcdhTuple, amount_key: &Key, short_amount: bool);

    /// The final message-hash step of the pre-MLSAG hash: bind the
    /// serialized signature base and the component hashes into the message
    /// every ring signature signs.
    ///
    /// Hardware devices may display `out_pk` details to the user here; the
    /// software default hashes the three component hashes.
    fn mlsag_prehash(
        &self,
        _base_blob: &[u8],
        _inputs: usize,
        _outputs: usize,
        hashes: &[Key],
        _out_pk: &[CtKey],
    ) -> Key {
        let mut data = Vec::with_capacity(hashes.len() * 32);
        for h in hashes {
            data.extend_from_slice(h);
        }
        keccak256(&data)
    }
}

/// The in-process software device.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareDevice {
    mode: DeviceMode,
}

impl SoftwareDevice {
    /// A software device in the default mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A software device pinned to the given mode. Watch-only callers use
    /// `TransactionCreateFake` to request dummy range proofs.
    #[must_use]
    pub fn with_mode(mode: DeviceMode) -> Self {
        Self { mode }
    }
}

impl Device for SoftwareDevice {
    fn mode(&self) -> DeviceMode {
        self.mode
    }

    fn gen_commitment_mask(&self, amount_key: &Key) -> Scalar {
        crate::pedersen::gen_commitment_mask(amount_key)
    }

    fn ecdh_encode(&self, ecdh: &mut EcdhTuple, amount_key: &Key, short_amount: bool) {
        crate::ecdh::ecdh_encode(ecdh, amount_key, short_amount);
    }

    fn ecdh_decode(&self, ecdh: &mut EcdhTuple, amount_key: &Key, short_amount: bool) {
        crate::ecdh::ecdh_decode(ecdh, amount_key, short_amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{d2h, h2d};

    #[test]
    fn software_device_round_trips_ecdh() {
        let device = SoftwareDevice::new();
        let amount_key = [5u8; 32];
        let mut ecdh = EcdhTuple {
            mask: [0u8; 32],
            amount: d2h(777).to_bytes(),
        };
        device.ecdh_encode(&mut ecdh, &amount_key, true);
        device.ecdh_decode(&mut ecdh, &amount_key, true);
        assert_eq!(h2d(&ecdh.amount), 777);
    }

    #[test]
    fn default_mode_is_not_fake() {
        assert_eq!(SoftwareDevice::new().mode(), DeviceMode::Default);
        let fake = SoftwareDevice::with_mode(DeviceMode::TransactionCreateFake);
        assert_eq!(fake.mode(), DeviceMode::TransactionCreateFake);
    }

    #[test]
    fn prehash_binds_all_component_hashes() {
        let device = SoftwareDevice::new();
        let a = device.mlsag_prehash(&[], 1, 1, &[[1u8; 32], [2u8; 32], [3u8; 32]], &[]);
        let b = device.mlsag_prehash(&[], 1, 1, &[[1u8; 32], [2u8; 32], [4u8; 32]], &[]);
        assert_ne!(a, b);
    }
}
