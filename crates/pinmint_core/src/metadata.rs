use crate::asset::Trait;
use serde::{Deserialize, Serialize};

/// The off-chain JSON document the asset's metadata URI points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub description: String,
    /// Full gateway URI of the pinned image.
    pub image: String,
    pub attributes: Vec<Trait>,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub files: Vec<FileDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Media type, e.g. `image/jpeg`.
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uri: String,
}

/// Static description of the asset to publish and mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetDetails {
    pub name: String,
    pub symbol: String,
    pub description: String,
    /// Royalty basis points, `500` = 5%.
    pub royalties: u16,
    pub attributes: Vec<Trait>,
}

impl Default for AssetDetails {
    fn default() -> Self {
        Self {
            name: "NAME".to_string(),
            symbol: "SYMBOL".to_string(),
            description: String::new(),
            royalties: 500,
            attributes: Vec::new(),
        }
    }
}

impl AssetDetails {
    /// Composes the metadata document for an image pinned at `image_uri`.
    pub fn metadata_document(&self, image_uri: &str, image_type: &str) -> AssetMetadata {
        AssetMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            image: image_uri.to_string(),
            attributes: self.attributes.clone(),
            properties: Properties {
                files: vec![FileDescriptor {
                    mime_type: image_type.to_string(),
                    uri: image_uri.to_string(),
                }],
            },
        }
    }
}
