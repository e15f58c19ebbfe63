//! Wire structures of the RingCT signature.
//!
//! Every scalar and compressed point on the wire is a 32-byte little-endian
//! string ([`Key`]). Published points that carry an eighth-torsion clearing
//! factor (`out_pk` masks, the CLSAG auxiliary image `D`, all bulletproof
//! points) are stored divided by 8 and restored with a `·8` on read.

use zeroize::Zeroize;

/// A 32-byte wire string: either a canonical scalar mod ℓ or a compressed
/// Edwards point, depending on position.
pub type Key = [u8; 32];

/// The all-zero key. As a scalar this is 0; it is not a valid point encoding.
pub const KEY_ZERO: Key = [0u8; 32];

/// Compressed encoding of the group identity.
pub const KEY_IDENTITY: Key = {
    let mut k = [0u8; 32];
    k[0] = 1;
    k
};

/// A commitment+key pair.
///
/// In a mix-ring, `dest` is a one-time output public key and `mask` the
/// output's Pedersen commitment. When privately held by a signer, `dest` is
/// the output secret key and `mask` the commitment's blinding scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct CtKey {
    /// One-time output key (public or secret depending on context).
    pub dest: Key,
    /// Commitment, or its blinding mask when privately held.
    pub mask: Key,
}

impl CtKey {
    /// A pair of zero keys.
    #[must_use]
    pub fn zero() -> Self {
        CtKey {
            dest: KEY_ZERO,
            mask: KEY_ZERO,
        }
    }
}

/// The encrypted (mask, amount) blob attached to each output for the
/// recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct EcdhTuple {
    /// Blinding mask; zeroed on the wire for short-amount epochs.
    pub mask: Key,
    /// Amount; full-width for legacy epochs, 8 significant bytes afterwards.
    pub amount: Key,
}

impl EcdhTuple {
    /// A blob of zeroes.
    #[must_use]
    pub fn zero() -> Self {
        EcdhTuple {
            mask: KEY_ZERO,
            amount: KEY_ZERO,
        }
    }
}

/// A CLSAG ring signature for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct Clsag {
    /// Response scalars, one per ring member.
    pub s: Vec<Key>,
    /// The challenge at ring position 0.
    pub c1: Key,
    /// Key image `p · Hp(P[l])`.
    pub I: Key,
    /// Auxiliary commitment image `z · Hp(P[l])`, published divided by 8.
    pub D: Key,
}

/// A legacy MLSAG ring signature.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct MgSig {
    /// Response matrix, one column per ring member, one row per key row.
    pub ss: Vec<Vec<Key>>,
    /// The closing challenge.
    pub cc: Key,
    /// Key images for the linkable rows.
    pub II: Vec<Key>,
}

/// A 64-element key vector, used by the Borromean range signature.
pub type Key64 = [Key; 64];

/// A Borromean ring signature over 64 bit-commitments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoroSig {
    /// First response per bit.
    pub s0: Key64,
    /// Second response per bit.
    pub s1: Key64,
    /// Shared challenge.
    pub ee: Key,
}

/// A legacy per-output range signature: 64 bit-commitments plus the
/// Borromean ring proving each commits to 0 or `2^i`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct RangeSig {
    /// The Borromean signature.
    pub asig: BoroSig,
    /// Bit commitments summing to the output commitment.
    pub Ci: Key64,
}

/// An aggregated Bulletproof range proof.
///
/// All points are published multiplied by `INV_EIGHT`; `taux`, `mu`, `a`,
/// `b` and `t` are scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct Bulletproof {
    /// Output commitments covered by this proof, divided by 8.
    pub V: Vec<Key>,
    /// Bit-vector commitment.
    pub A: Key,
    /// Blinding-vector commitment.
    pub S: Key,
    /// Degree-1 polynomial commitment.
    pub T1: Key,
    /// Degree-2 polynomial commitment.
    pub T2: Key,
    /// Blinding opening of the polynomial commitment.
    pub taux: Key,
    /// Blinding opening of the vector commitments.
    pub mu: Key,
    /// Left folding points of the inner-product argument.
    pub L: Vec<Key>,
    /// Right folding points of the inner-product argument.
    pub R: Vec<Key>,
    /// Folded left scalar.
    pub a: Key,
    /// Folded right scalar.
    pub b: Key,
    /// The inner product `⟨l, r⟩`.
    pub t: Key,
}

/// The rule epoch a signature was produced under. Verification dispatches on
/// this tag; legacy columns stay frozen for historical replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RctType {
    /// No RingCT data.
    Null,
    /// Original aggregate MLSAG with Borromean ranges.
    Full,
    /// Per-input MLSAG with Borromean ranges.
    Simple,
    /// First Bulletproof epoch (full-width ECDH blobs).
    Bulletproof,
    /// Bulletproof epoch with 8-byte encrypted amounts.
    Bulletproof2,
    /// First CLSAG epoch.
    Clsag,
    /// CLSAG with xAsset colours.
    ClsagN,
    /// Consolidated single-column commitments, source-colour fees.
    Haven2,
    /// Haven2 plus conversion collateral.
    Haven3,
}

impl RctType {
    /// True for epochs whose range proofs are Bulletproofs.
    #[must_use]
    pub fn is_bulletproof(self) -> bool {
        matches!(
            self,
            RctType::Bulletproof
                | RctType::Bulletproof2
                | RctType::Clsag
                | RctType::ClsagN
                | RctType::Haven2
                | RctType::Haven3
        )
    }

    /// True for epochs whose ring signatures are CLSAGs.
    #[must_use]
    pub fn is_clsag(self) -> bool {
        matches!(
            self,
            RctType::Clsag | RctType::ClsagN | RctType::Haven2 | RctType::Haven3
        )
    }

    /// True for per-input (simple) signature layouts.
    #[must_use]
    pub fn is_simple(self) -> bool {
        !matches!(self, RctType::Null | RctType::Full)
    }

    /// True for epochs that truncate the encrypted amount to 8 bytes.
    #[must_use]
    pub fn short_amount(self) -> bool {
        matches!(
            self,
            RctType::Bulletproof2
                | RctType::Clsag
                | RctType::ClsagN
                | RctType::Haven2
                | RctType::Haven3
        )
    }

    /// Wire tag of the epoch.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            RctType::Null => 0,
            RctType::Full => 1,
            RctType::Simple => 2,
            RctType::Bulletproof => 3,
            RctType::Bulletproof2 => 4,
            RctType::Clsag => 5,
            RctType::ClsagN => 6,
            RctType::Haven2 => 7,
            RctType::Haven3 => 8,
        }
    }
}

/// Which range-proof family and batching shape assembly should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeProofType {
    /// Legacy per-output Borromean signatures (verification only).
    Borromean,
    /// One Bulletproof per output.
    Bulletproof,
    /// Power-of-two batches of Bulletproofs.
    MultiOutputBulletproof,
    /// A single padded Bulletproof covering all outputs. The only shape
    /// produced from `RctType::Haven2` onward.
    PaddedBulletproof,
}

/// Assembly-time configuration: proof shape plus the bulletproof version
/// that selects the rule epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RctConfig {
    /// Range-proof family and batching.
    pub range_proof_type: RangeProofType,
    /// Bulletproof version; maps onto [`RctType`] during assembly.
    pub bp_version: u8,
}

/// A pre-committed multisig nonce share for one input.
#[derive(Debug, Clone, Copy, Zeroize)]
#[allow(non_snake_case)]
pub struct MultisigKLRki {
    /// The secret nonce share.
    pub k: Key,
    /// `k·G`, aggregated across cosigners.
    pub L: Key,
    /// `k·Hp(P)`, aggregated across cosigners.
    pub R: Key,
    /// The aggregated key image.
    pub ki: Key,
}

/// Per-input data exported to cosigners so they can complete a multisig
/// signature.
#[derive(Debug, Clone, Default)]
pub struct MultisigOut {
    /// The closing challenge of each ring.
    pub c: Vec<Key>,
    /// The `μ_P` aggregation coefficient of each ring (CLSAG only).
    pub mu_p: Vec<Key>,
}

/// The prunable portion of an RCT signature.
#[derive(Debug, Clone, Default)]
pub struct RctSigPrunable {
    /// Legacy per-output range signatures.
    pub range_sigs: Vec<RangeSig>,
    /// Aggregated bulletproofs.
    pub bulletproofs: Vec<Bulletproof>,
    /// Legacy MLSAG ring signatures, one per input.
    pub mgs: Vec<MgSig>,
    /// CLSAG ring signatures, one per input.
    pub clsags: Vec<Clsag>,
    /// Re-randomised input commitments, one per input (bulletproof epochs).
    pub pseudo_outs: Vec<Key>,
}

/// A complete RingCT signature.
///
/// Constructed once by [`crate::rct::gen_rct_simple`] and immutable
/// thereafter. Legacy epochs carry value in exactly one of the three
/// per-colour output-commitment columns per output; `Haven2`/`Haven3` use
/// `out_pk` alone and read colours from the companion transaction outputs.
#[derive(Debug, Clone, Default)]
pub struct RctSig {
    /// Rule epoch tag. `None` encodes the null signature.
    pub rct_type: Option<RctType>,
    /// The transaction hash bound into every ring signature.
    pub message: Key,
    /// One ring of commitment+key pairs per input.
    pub mix_ring: Vec<Vec<CtKey>>,
    /// Pseudo-output commitments for the pre-bulletproof `Simple` epoch.
    pub pseudo_outs: Vec<Key>,
    /// Encrypted (mask, amount) blobs, one per output.
    pub ecdh_info: Vec<EcdhTuple>,
    /// Output commitments (XHV column for legacy epochs, the only column
    /// from Haven2 onward).
    pub out_pk: Vec<CtKey>,
    /// Legacy XUSD output-commitment column.
    pub out_pk_usd: Vec<CtKey>,
    /// Legacy xAsset output-commitment column.
    pub out_pk_xasset: Vec<CtKey>,
    /// Miner fee in the source colour.
    pub txn_fee: u64,
    /// Legacy miner fee paid in XUSD.
    pub txn_fee_usd: u64,
    /// Legacy miner fee paid in an xAsset.
    pub txn_fee_xasset: u64,
    /// Conversion fee in the source colour.
    pub txn_offshore_fee: u64,
    /// Legacy conversion fee paid in XUSD.
    pub txn_offshore_fee_usd: u64,
    /// Legacy conversion fee paid in an xAsset.
    pub txn_offshore_fee_xasset: u64,
    /// Prover-published mask sums for conversion checking: `[0]` input masks
    /// of the converted colour, `[1]` change-output masks, `[2]` collateral
    /// masks (Haven3 conversions only).
    pub mask_sums: Vec<Key>,
    /// The prunable part.
    pub p: RctSigPrunable,
}

impl RctSig {
    /// The epoch tag, or `Null` when unset.
    #[must_use]
    pub fn rct_type(&self) -> RctType {
        self.rct_type.unwrap_or(RctType::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_predicates() {
        assert!(RctType::Haven3.is_bulletproof());
        assert!(RctType::Haven3.is_clsag());
        assert!(RctType::Haven3.is_simple());
        assert!(RctType::Haven3.short_amount());

        assert!(RctType::Bulletproof.is_bulletproof());
        assert!(!RctType::Bulletproof.is_clsag());
        assert!(!RctType::Bulletproof.short_amount());

        assert!(!RctType::Full.is_simple());
        assert!(!RctType::Simple.is_bulletproof());
    }

    #[test]
    fn wire_tags_are_stable() {
        assert_eq!(RctType::Null.to_u8(), 0);
        assert_eq!(RctType::Clsag.to_u8(), 5);
        assert_eq!(RctType::Haven2.to_u8(), 7);
        assert_eq!(RctType::Haven3.to_u8(), 8);
    }

    #[test]
    fn identity_encoding() {
        assert_eq!(KEY_IDENTITY[0], 1);
        assert!(KEY_IDENTITY[1..].iter().all(|&b| b == 0));
    }
}
