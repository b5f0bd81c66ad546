use crate::asset::ExtensionKind;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Local configuration problems. Always raised before any network call.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required credential header: {0}")]
    MissingCredential(String),

    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Pinning credentials are empty: {0}")]
    EmptyCredential(&'static str),

    #[error("Invalid wallet file {path:?}: {reason}")]
    InvalidWallet { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[source] BoxError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Malformed JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PinError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Pinning service returned error {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Pinning service response ({status}) has no content identifier: {body}")]
    MissingIdentifier { status: u16, body: String },
}

/// An [`AssetMintSpec`](crate::asset::AssetMintSpec) that no backend should accept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("An asset needs at least one creator")]
    NoCreators,

    #[error("Creator shares must sum to 100, got {total}")]
    CreatorShares { total: u32 },

    #[error("Royalties of {0} basis points exceed 10000")]
    RoyaltiesOutOfRange(u16),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Transaction not confirmed: {0}")]
    Unconfirmed(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Ledger error: {0}")]
    Generic(String),
}

/// The pipeline stage a [`WorkflowError`] was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    UploadImage,
    UploadMetadata,
    MintAsset,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::UploadImage => "upload image",
            Stage::UploadMetadata => "upload metadata",
            Stage::MintAsset => "mint asset",
            Stage::Verify => "verify",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read image {path:?}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to upload image: {0}")]
    UploadImage(#[source] PinError),

    #[error("Failed to serialize metadata document: {0}")]
    MetadataDocument(#[source] serde_json::Error),

    #[error("Failed to upload metadata: {0}")]
    UploadMetadata(#[source] PinError),

    #[error("Refusing to mint: {0}")]
    InvalidMintSpec(#[from] SpecError),

    #[error("Failed to mint asset: {0}")]
    MintAsset(#[source] LedgerError),
}

impl WorkflowError {
    /// Configuration problems are reported against the first stage, since
    /// nothing has run yet.
    pub fn stage(&self) -> Stage {
        match self {
            WorkflowError::Config(_)
            | WorkflowError::ReadImage { .. }
            | WorkflowError::UploadImage(_) => Stage::UploadImage,
            WorkflowError::MetadataDocument(_) | WorkflowError::UploadMetadata(_) => {
                Stage::UploadMetadata
            }
            WorkflowError::InvalidMintSpec(_) | WorkflowError::MintAsset(_) => Stage::MintAsset,
        }
    }
}

/// A single failed verification check. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Field {
        check: String,
        expected: String,
        actual: String,
    },
    ExtensionNotFound(ExtensionKind),
}

impl Mismatch {
    pub fn field(
        check: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Mismatch::Field {
            check: check.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Field {
                check,
                expected,
                actual,
            } => write!(f, "{check} mismatch: expected `{expected}`, found `{actual}`"),
            Mismatch::ExtensionNotFound(kind) => {
                write!(f, "{kind:?} extension (type {}) not found", kind.discriminant())
            }
        }
    }
}
