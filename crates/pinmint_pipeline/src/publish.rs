use pinmint_core::prelude::*;
use std::path::Path;
use tracing::{error, info, instrument};

pub const METADATA_FILE_NAME: &str = "metadata.json";

/// An image that has been pinned. Only [`Publisher::upload_image`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedImage {
    cid: ContentId,
    uri: String,
    content_type: String,
}

impl PinnedImage {
    pub fn cid(&self) -> &ContentId {
        &self.cid
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// A metadata document that has been pinned and references a [`PinnedImage`].
/// Only [`Publisher::upload_metadata`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedMetadata {
    cid: ContentId,
    uri: String,
    image: PinnedImage,
    document: AssetMetadata,
}

impl PinnedMetadata {
    pub fn cid(&self) -> &ContentId {
        &self.cid
    }

    /// The URI stored on chain.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn image(&self) -> &PinnedImage {
        &self.image
    }

    pub fn document(&self) -> &AssetMetadata {
        &self.document
    }
}

/// Runs the two publishing stages: image first, then the metadata pointing at it.
#[derive(Clone)]
pub struct Publisher<P: Pinner> {
    pinner: P,
    gateway: String,
    details: AssetDetails,
}

impl<P: Pinner> Publisher<P> {
    pub fn new(pinner: P, gateway: impl Into<String>, details: AssetDetails) -> Self {
        Self {
            pinner,
            gateway: gateway.into(),
            details,
        }
    }

    pub fn details(&self) -> &AssetDetails {
        &self.details
    }

    #[instrument(skip(self), fields(stage = %Stage::UploadImage))]
    pub async fn upload_image(&self, path: &Path) -> Result<PinnedImage, WorkflowError> {
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        let file = GenericFile::from_path(path, Some(content_type.clone()))
            .await
            .map_err(|source| {
                error!("Error reading image {path:?}: {source}");
                WorkflowError::ReadImage {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let cid = self.pinner.pin(file).await.map_err(|e| {
            error!("Error uploading image: {e}");
            WorkflowError::UploadImage(e)
        })?;

        let uri = cid.gateway_uri(&self.gateway);
        info!(%cid, %uri, "Uploaded image to IPFS");

        Ok(PinnedImage {
            cid,
            uri,
            content_type,
        })
    }

    #[instrument(skip(self, image), fields(stage = %Stage::UploadMetadata, image = %image.cid))]
    pub async fn upload_metadata(&self, image: &PinnedImage) -> Result<PinnedMetadata, WorkflowError> {
        let document = self
            .details
            .metadata_document(&image.uri, &image.content_type);

        let file = GenericFile::from_json(&document, METADATA_FILE_NAME)
            .map_err(WorkflowError::MetadataDocument)?;

        let cid = self.pinner.pin(file).await.map_err(|e| {
            error!("Error uploading metadata: {e}");
            WorkflowError::UploadMetadata(e)
        })?;

        let uri = cid.gateway_uri(&self.gateway);
        info!(%cid, %uri, "Uploaded metadata to IPFS");

        Ok(PinnedMetadata {
            cid,
            uri,
            image: image.clone(),
            document,
        })
    }

    /// Both publishing stages in order.
    pub async fn publish(&self, image_path: &Path) -> Result<PinnedMetadata, WorkflowError> {
        let image = self.upload_image(image_path).await?;
        self.upload_metadata(&image).await
    }
}

#[cfg(test)]
pub(crate) fn pinned_metadata(cid: &str, gateway: &str, details: &AssetDetails) -> PinnedMetadata {
    let image_cid = ContentId::new("QmImage");
    let image = PinnedImage {
        uri: image_cid.gateway_uri(gateway),
        cid: image_cid,
        content_type: "image/jpeg".into(),
    };
    let cid = ContentId::new(cid);

    PinnedMetadata {
        uri: cid.gateway_uri(gateway),
        document: details.metadata_document(&image.uri, &image.content_type),
        cid,
        image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    const GATEWAY: &str = "https://gateway.pinata.cloud/ipfs";

    #[tokio::test]
    async fn metadata_references_the_pinned_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir).await;
        let pinner = RecordingPinner::answering(vec![Ok("QmImage"), Ok("QmMeta")]);
        let publisher = Publisher::new(pinner.clone(), GATEWAY, AssetDetails::default());

        let metadata = publisher.publish(&path).await.unwrap();

        assert_eq!(metadata.image().uri(), format!("{GATEWAY}/QmImage"));
        assert_eq!(metadata.uri(), format!("{GATEWAY}/QmMeta"));
        assert_eq!(metadata.document().image, metadata.image().uri());
        assert_eq!(
            metadata.document().properties.files[0].uri,
            metadata.image().uri()
        );

        let pinned = pinner.pinned();
        assert_eq!(pinned.len(), 2);
        assert_eq!(pinned[0].file_name(), "image.jpg");
        assert_eq!(pinned[0].content_type(), Some("image/jpeg"));
        assert_eq!(pinned[1].file_name(), METADATA_FILE_NAME);
        assert!(pinned[1].is_json());

        let document: AssetMetadata = serde_json::from_slice(pinned[1].bytes()).unwrap();
        assert_eq!(&document, metadata.document());
    }

    #[tokio::test]
    async fn failed_image_upload_stops_before_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir).await;
        let pinner = RecordingPinner::answering(vec![Err(500)]);
        let publisher = Publisher::new(pinner.clone(), GATEWAY, AssetDetails::default());

        let err = publisher.publish(&path).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::UploadImage(PinError::Rejected { status: 500, .. })
        ));
        assert_eq!(err.stage(), Stage::UploadImage);
        assert_eq!(pinner.pinned().len(), 1);
    }

    #[tokio::test]
    async fn failed_metadata_upload_is_reported_as_such() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir).await;
        let pinner = RecordingPinner::answering(vec![Ok("QmImage"), Err(403)]);
        let publisher = Publisher::new(pinner, GATEWAY, AssetDetails::default());

        let err = publisher.publish(&path).await.unwrap_err();

        assert_eq!(err.stage(), Stage::UploadMetadata);
    }

    #[tokio::test]
    async fn missing_image_never_pins() {
        let dir = tempfile::tempdir().unwrap();
        let pinner = RecordingPinner::new();
        let publisher = Publisher::new(pinner.clone(), GATEWAY, AssetDetails::default());

        let err = publisher
            .upload_image(&dir.path().join("missing.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::ReadImage { .. }));
        assert!(pinner.pinned().is_empty());
    }
}
