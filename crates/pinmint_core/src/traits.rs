use crate::asset::{Address, MintRequest, OnChainAssetSnapshot};
use crate::config::SigningIdentity;
use crate::error::*;
use crate::file::{ContentId, GenericFile};

/// A pinning backend that publishes files to IPFS.
///
/// Pinning is billable and not idempotent: every call may pin a new copy, so
/// implementations must not retry on their own.
pub trait Pinner: Send + Sync + 'static + Clone {
    fn pin(&self, file: GenericFile) -> impl Future<Output = Result<ContentId, PinError>> + Send;
}

/// The ledger the asset is minted on.
pub trait Ledger: Send + Sync + 'static + Clone {
    /// Submits the mint and waits for confirmation. Returns the new asset's address.
    fn mint(
        &self,
        signer: &SigningIdentity,
        request: &MintRequest,
    ) -> impl Future<Output = Result<Address, LedgerError>> + Send;

    fn fetch_asset(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<OnChainAssetSnapshot, LedgerError>> + Send;
}
