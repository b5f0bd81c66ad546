use crate::config::MintConfig;
use crate::publish::{PinnedMetadata, Publisher};
use crate::verify::{self, ExpectedAsset, Verification};
use pinmint_core::prelude::*;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// An asset the ledger confirmed, together with what was submitted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedAsset {
    pub address: Address,
    pub owner: Address,
    pub spec: AssetMintSpec,
}

impl MintedAsset {
    pub fn expected(&self) -> ExpectedAsset<'_> {
        ExpectedAsset {
            address: &self.address,
            owner: &self.owner,
            spec: &self.spec,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MintOutcome {
    pub image_cid: ContentId,
    pub metadata_cid: ContentId,
    pub metadata_uri: String,
    pub asset: MintedAsset,
    pub verification: Verification,
}

/// Upload image → upload metadata → mint → verify, strictly in that order.
///
/// Each stage consumes the previous stage's output, so the stages can only be
/// chained one way: [`MintWorkflow::mint_asset`] needs a [`PinnedMetadata`],
/// which only exists once both uploads succeeded.
pub struct MintWorkflow<P: Pinner, L: Ledger> {
    publisher: Publisher<P>,
    ledger: L,
    config: MintConfig,
}

impl<P: Pinner, L: Ledger> MintWorkflow<P, L> {
    pub fn new(config: MintConfig, pinner: P, ledger: L) -> Result<Self, WorkflowError> {
        config.validate()?;

        Ok(Self {
            publisher: Publisher::new(pinner, config.gateway.clone(), config.details.clone()),
            ledger,
            config,
        })
    }

    pub fn publisher(&self) -> &Publisher<P> {
        &self.publisher
    }

    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    /// Mints with the signer as sole creator.
    pub async fn mint_asset(&self, metadata: &PinnedMetadata) -> Result<MintedAsset, WorkflowError> {
        let creator = Creator::new(self.config.identity.address().clone(), 100);
        self.mint_with_creators(metadata, vec![creator]).await
    }

    /// Builds and validates the [`AssetMintSpec`] before anything is submitted.
    #[instrument(
        skip(self, metadata, creators),
        fields(stage = %Stage::MintAsset, cluster = %self.config.cluster.rpc_url(), uri = %metadata.uri())
    )]
    pub async fn mint_with_creators(
        &self,
        metadata: &PinnedMetadata,
        creators: Vec<Creator>,
    ) -> Result<MintedAsset, WorkflowError> {
        let details = &self.config.details;
        let spec = AssetMintSpec::new(
            details.name.as_str(),
            details.symbol.as_str(),
            details.description.as_str(),
            metadata.uri(),
            details.royalties,
            creators,
        )
        .inspect_err(|e| error!("Refusing to mint: {e}"))?;

        let signer = self.config.identity.address().clone();
        let request = MintRequest {
            owner: signer.clone(),
            authority: signer.clone(),
            payer: signer.clone(),
            mutable: false,
            standard: Standard::NonFungible,
            spec,
        };

        let address = self
            .ledger
            .mint(&self.config.identity, &request)
            .await
            .map_err(|e| {
                error!("Error minting a new asset: {e}");
                WorkflowError::MintAsset(e)
            })?;

        info!(%address, "Minted a new asset");

        Ok(MintedAsset {
            address,
            owner: request.owner,
            spec: request.spec,
        })
    }

    /// Never fails: problems end up in the returned [`Verification`].
    #[instrument(skip(self, asset), fields(stage = %Stage::Verify, asset = %asset.address))]
    pub async fn verify(&self, asset: &MintedAsset) -> Verification {
        match verify::verify(&self.ledger, &asset.expected()).await {
            Ok(mismatches) => {
                for mismatch in &mismatches {
                    warn!("Verification failed: {mismatch}");
                }
                let verification = Verification::from(mismatches);
                if verification.is_passed() {
                    info!("Verified asset data");
                }
                verification
            }
            Err(e) => {
                error!("Error verifying asset data: {e}");
                Verification::Unavailable(e.to_string())
            }
        }
    }

    /// Runs all four stages for the image at `image_path`.
    pub async fn run(&self, image_path: &Path) -> Result<MintOutcome, WorkflowError> {
        let image = self.publisher.upload_image(image_path).await?;
        let metadata = self.publisher.upload_metadata(&image).await?;
        let asset = self.mint_asset(&metadata).await?;
        let verification = self.verify(&asset).await;

        Ok(MintOutcome {
            image_cid: image.cid().clone(),
            metadata_cid: metadata.cid().clone(),
            metadata_uri: metadata.uri().to_string(),
            asset,
            verification,
        })
    }
}
