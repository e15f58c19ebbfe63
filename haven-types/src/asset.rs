//! Asset colours and transaction classification.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Tag of the native volatile asset.
pub const XHV: &str = "XHV";

/// Tag of the USD-pegged stable asset.
pub const XUSD: &str = "XUSD";

/// The fixed registry of asset tags recognised by consensus.
///
/// Every source or destination asset of a transaction must appear here.
/// `XHV` and `XUSD` are structural; the remainder are the xAsset family.
pub const ASSET_TYPES: &[&str] = &[
    "XHV", "XAG", "XAU", "XAUD", "XBTC", "XCAD", "XCHF", "XCNY", "XEUR", "XGBP", "XJPY", "XNOK",
    "XNZD", "XUSD",
];

/// Returns true when `tag` is a registered asset type.
#[must_use]
pub fn is_valid_asset_type(tag: &str) -> bool {
    ASSET_TYPES.contains(&tag)
}

/// Direction of value flow between asset colours.
///
/// `Offshore` and `Onshore` are the XHV↔XUSD conversions; the xAsset pair
/// converts between XUSD and one of the pegged tokens. The `*Transfer`
/// variants move value within a single colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Not yet classified. Never valid on the consensus path.
    Unset,
    /// XHV to XHV.
    Transfer,
    /// XHV to XUSD conversion.
    Offshore,
    /// XUSD to XHV conversion.
    Onshore,
    /// XUSD to XUSD.
    OffshoreTransfer,
    /// XUSD to an xAsset conversion.
    XusdToXasset,
    /// An xAsset to XUSD conversion.
    XassetToXusd,
    /// xAsset to the same xAsset.
    XassetTransfer,
}

impl TransactionType {
    /// True for the four directions that cross a colour boundary.
    #[must_use]
    pub fn is_conversion(self) -> bool {
        matches!(
            self,
            TransactionType::Offshore
                | TransactionType::Onshore
                | TransactionType::XusdToXasset
                | TransactionType::XassetToXusd
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionType::Unset => "UNSET",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Offshore => "OFFSHORE",
            TransactionType::Onshore => "ONSHORE",
            TransactionType::OffshoreTransfer => "OFFSHORE_TRANSFER",
            TransactionType::XusdToXasset => "XUSD_TO_XASSET",
            TransactionType::XassetToXusd => "XASSET_TO_XUSD",
            TransactionType::XassetTransfer => "XASSET_TRANSFER",
        };
        f.write_str(s)
    }
}

/// Which chain the engine is operating against.
///
/// The cryptography itself is network-agnostic; the tag exists so that
/// collaborators can select address prefixes and the engine can select
/// test-only behaviour on `Fakechain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    /// Production chain.
    Mainnet,
    /// Public test chain.
    Testnet,
    /// Staging chain with mainnet rules.
    Stagenet,
    /// In-process chain used by tests.
    Fakechain,
}
