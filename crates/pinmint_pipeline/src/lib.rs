pub mod config;
pub mod mint;
pub mod publish;
pub mod verify;

pub mod prelude {
    pub use super::config::MintConfig;
    pub use super::mint::{MintOutcome, MintWorkflow, MintedAsset};
    pub use super::publish::{PinnedImage, PinnedMetadata, Publisher};
    pub use super::verify::{ExpectedAsset, Verification};
}

#[cfg(test)]
pub(crate) mod test_helpers;
