use crate::error::SpecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Royalty basis points equal to 100%.
pub const MAX_BASIS_POINTS: u16 = 10_000;

/// An account address on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: Address,
    /// Percentage of royalties, all shares of an asset sum to 100.
    pub share: u8,
    /// Set by the ledger once the creator has signed.
    #[serde(default)]
    pub verified: bool,
}

impl Creator {
    pub fn new(address: Address, share: u8) -> Self {
        Self {
            address,
            share,
            verified: false,
        }
    }
}

/// The values submitted at mint time.
///
/// Only obtainable through [`AssetMintSpec::new`], so every instance has at
/// least one creator, shares summing to 100 and royalties within bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetMintSpec {
    name: String,
    symbol: String,
    description: String,
    uri: String,
    royalties: u16,
    creators: Vec<Creator>,
}

impl AssetMintSpec {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        description: impl Into<String>,
        uri: impl Into<String>,
        royalties: u16,
        creators: Vec<Creator>,
    ) -> Result<Self, SpecError> {
        if creators.is_empty() {
            return Err(SpecError::NoCreators);
        }

        let total: u32 = creators.iter().map(|c| u32::from(c.share)).sum();
        if total != 100 {
            return Err(SpecError::CreatorShares { total });
        }

        if royalties > MAX_BASIS_POINTS {
            return Err(SpecError::RoyaltiesOutOfRange(royalties));
        }

        Ok(Self {
            name: name.into(),
            symbol: symbol.into(),
            description: description.into(),
            uri: uri.into(),
            royalties,
            creators,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Royalty basis points.
    pub fn royalties(&self) -> u16 {
        self.royalties
    }

    pub fn creators(&self) -> &[Creator] {
        &self.creators
    }
}

/// Asset standard understood by the ledger program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Standard {
    #[default]
    NonFungible,
}

/// Everything the ledger needs to mint one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub owner: Address,
    pub authority: Address,
    pub payer: Address,
    pub mutable: bool,
    pub standard: Standard,
    pub spec: AssetMintSpec,
}

impl MintRequest {
    /// Extensions to attach to the asset, in submission order.
    pub fn extensions(&self) -> Vec<Extension> {
        vec![
            Extension::Metadata(MetadataExtension {
                symbol: self.spec.symbol().to_string(),
                description: self.spec.description().to_string(),
                uri: self.spec.uri().to_string(),
                image_uri: None,
            }),
            Extension::Royalties(Royalties {
                basis_points: u64::from(self.spec.royalties()),
                constraint: None,
            }),
            Extension::Creators(self.spec.creators().to_vec()),
        ]
    }
}

/// Numeric discriminants used on chain to tag extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExtensionKind {
    Attributes = 1,
    Blob = 2,
    Creators = 3,
    Links = 4,
    Metadata = 5,
    Royalties = 7,
}

impl ExtensionKind {
    pub fn discriminant(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub trait_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataExtension {
    pub symbol: String,
    pub description: String,
    pub uri: String,
    #[serde(default)]
    pub image_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Royalties {
    pub basis_points: u64,
    /// Allow/deny list of programs, opaque to this crate.
    #[serde(default)]
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Extension {
    Attributes(Vec<Trait>),
    Blob(Blob),
    Creators(Vec<Creator>),
    Links(Vec<Link>),
    Metadata(MetadataExtension),
    Royalties(Royalties),
}

impl Extension {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Extension::Attributes(_) => ExtensionKind::Attributes,
            Extension::Blob(_) => ExtensionKind::Blob,
            Extension::Creators(_) => ExtensionKind::Creators,
            Extension::Links(_) => ExtensionKind::Links,
            Extension::Metadata(_) => ExtensionKind::Metadata,
            Extension::Royalties(_) => ExtensionKind::Royalties,
        }
    }
}

/// Asset state as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainAssetSnapshot {
    pub address: Address,
    pub owner: Address,
    pub name: String,
    pub extensions: Vec<Extension>,
}

impl OnChainAssetSnapshot {
    pub fn extension(&self, kind: ExtensionKind) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.kind() == kind)
    }

    pub fn creators(&self) -> Option<&[Creator]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Creators(creators) => Some(creators.as_slice()),
            _ => None,
        })
    }

    pub fn metadata(&self) -> Option<&MetadataExtension> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Metadata(metadata) => Some(metadata),
            _ => None,
        })
    }

    pub fn royalties(&self) -> Option<&Royalties> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Royalties(royalties) => Some(royalties),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(share: u8) -> Creator {
        Creator::new(Address::new(format!("creator-{share}")), share)
    }

    #[test]
    fn accepts_single_full_share_creator() {
        let spec = AssetMintSpec::new("NAME", "SYMBOL", "desc", "uri", 500, vec![creator(100)])
            .unwrap();

        assert_eq!(spec.royalties(), 500);
        assert_eq!(spec.creators().len(), 1);
        assert_eq!(spec.creators()[0].share, 100);
    }

    #[test]
    fn rejects_shares_not_summing_to_100() {
        let err = AssetMintSpec::new("NAME", "SYMBOL", "desc", "uri", 500, vec![creator(90)])
            .unwrap_err();
        assert_eq!(err, SpecError::CreatorShares { total: 90 });

        let err = AssetMintSpec::new(
            "NAME",
            "SYMBOL",
            "desc",
            "uri",
            500,
            vec![creator(60), creator(50)],
        )
        .unwrap_err();
        assert_eq!(err, SpecError::CreatorShares { total: 110 });
    }

    #[test]
    fn rejects_missing_creators_and_excess_royalties() {
        assert_eq!(
            AssetMintSpec::new("N", "S", "D", "U", 500, vec![]).unwrap_err(),
            SpecError::NoCreators
        );
        assert_eq!(
            AssetMintSpec::new("N", "S", "D", "U", 10_001, vec![creator(100)]).unwrap_err(),
            SpecError::RoyaltiesOutOfRange(10_001)
        );
    }

    #[test]
    fn extension_kinds_match_on_chain_discriminants() {
        assert_eq!(ExtensionKind::Creators.discriminant(), 3);
        assert_eq!(ExtensionKind::Metadata.discriminant(), 5);
        assert_eq!(ExtensionKind::Royalties.discriminant(), 7);
    }

    #[test]
    fn snapshot_finds_extensions_by_kind() {
        let spec =
            AssetMintSpec::new("NAME", "SYM", "desc", "uri", 500, vec![creator(100)]).unwrap();
        let request = MintRequest {
            owner: Address::new("owner"),
            authority: Address::new("owner"),
            payer: Address::new("owner"),
            mutable: false,
            standard: Standard::NonFungible,
            spec,
        };
        let snapshot = OnChainAssetSnapshot {
            address: Address::new("asset"),
            owner: Address::new("owner"),
            name: "NAME".into(),
            extensions: request.extensions(),
        };

        assert_eq!(snapshot.metadata().map(|m| m.uri.as_str()), Some("uri"));
        assert_eq!(snapshot.royalties().map(|r| r.basis_points), Some(500));
        assert_eq!(snapshot.creators().map(<[Creator]>::len), Some(1));
        assert!(snapshot.extension(ExtensionKind::Links).is_none());
    }
}
