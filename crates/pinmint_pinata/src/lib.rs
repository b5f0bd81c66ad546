//! # pinmint Pinata
//!
//! A [`Pinner`] backed by the [Pinata](https://pinata.cloud) pinning API.
//!
//! Binary files are pinned with `pinFileToIPFS` as a multipart form, JSON
//! documents with `pinJSONToIPFS`. Documents are forwarded byte for byte. Every request carries the
//! `pinata_api_key` / `pinata_secret_api_key` header pair and goes through
//! [`PinataTransport`], which refuses to send anything without them.
//!
//! ## Usage
//!
//! ```no_run
//! use pinmint_core::prelude::*;
//! use pinmint_pinata::{PinataClient, PinataConfig};
//!
//! # async fn run() -> Result<(), PinError> {
//! let client = PinataClient::new(PinataConfig::new(PinningCredentials::new("key", "secret")));
//! let file = GenericFile::new(b"hello".to_vec(), "hello.txt", Some("text/plain".into()));
//! let cid = client.pin(file).await?;
//! println!("pinned at {cid}");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use pinmint_core::prelude::*;
use reqwest::Method;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub mod transport;

pub use transport::*;

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";

#[derive(Clone, Debug)]
pub struct PinataConfig {
    pub credentials: PinningCredentials,
    /// Defaults to [`DEFAULT_API_URL`].
    pub api_url: String,
}

impl PinataConfig {
    pub fn new(credentials: PinningCredentials) -> Self {
        Self {
            credentials,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Success body of the pinning endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PinReceipt {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: ContentId,
    #[serde(rename = "PinSize", default)]
    pub pin_size: Option<u64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "isDuplicate", default)]
    pub is_duplicate: Option<bool>,
}

impl PinReceipt {
    pub fn pinned_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPin<'a> {
    pinata_content: &'a RawValue,
    pinata_metadata: PinMetadata<'a>,
}

#[derive(Serialize)]
struct PinMetadata<'a> {
    name: &'a str,
}

#[derive(Clone, Debug)]
pub struct PinataClient {
    transport: PinataTransport,
    config: PinataConfig,
    signal: Option<CancellationToken>,
}

impl PinataClient {
    pub fn new(config: PinataConfig) -> Self {
        Self {
            transport: PinataTransport::new(),
            config,
            signal: None,
        }
    }

    pub fn with_transport(mut self, transport: PinataTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Every request issued by this client is aborted once `signal` fires.
    pub fn with_cancellation(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    fn request(&self, method: Method, path: &str) -> PinRequest {
        let url = format!("{}{path}", self.config.api_url.trim_end_matches('/'));
        let credentials = &self.config.credentials;

        PinRequest::new(method, url)
            .with_header(API_KEY_HEADER, credentials.api_key.as_str())
            .with_header(SECRET_KEY_HEADER, credentials.secret_api_key.as_str())
            .with_signal(self.signal.clone())
    }

    /// Pins `file` as the `file` field of a multipart form.
    #[instrument(skip(self, file), fields(file = %file.file_name(), size = file.len()))]
    pub async fn pin_file(&self, file: &GenericFile) -> Result<PinReceipt, PinError> {
        let parts = vec![
            FormPart::File {
                name: "file".to_string(),
                file_name: file.file_name().to_string(),
                content_type: file.content_type().map(str::to_string),
                data: file.bytes().clone(),
            },
            FormPart::Text {
                name: "pinataMetadata".to_string(),
                value: json!({ "name": file.file_name() }).to_string(),
            },
        ];

        let request = self
            .request(Method::POST, "/pinning/pinFileToIPFS")
            .with_body(RequestBody::Multipart(parts));

        receipt(self.transport.send(request).await?)
    }

    /// Pins `document` under the display name `name`, keeping its text as is.
    #[instrument(skip(self, document))]
    pub async fn pin_json(&self, document: &RawValue, name: &str) -> Result<PinReceipt, PinError> {
        let body = serde_json::to_vec(&JsonPin {
            pinata_content: document,
            pinata_metadata: PinMetadata { name },
        })
        .map_err(TransportError::Decode)?;

        let request = self
            .request(Method::POST, "/pinning/pinJSONToIPFS")
            .with_header(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE)
            .with_body(RequestBody::Raw(Bytes::from(body)));

        receipt(self.transport.send(request).await?)
    }

    /// Checks the credentials without pinning anything.
    pub async fn test_authentication(&self) -> Result<String, PinError> {
        self.config.credentials.validate()?;

        let response = self
            .transport
            .send(self.request(Method::GET, "/data/testAuthentication"))
            .await?;
        check_response(&response)?;

        Ok(response
            .json_str("message")
            .map(str::to_string)
            .unwrap_or(response.body))
    }
}

impl Pinner for PinataClient {
    async fn pin(&self, file: GenericFile) -> Result<ContentId, PinError> {
        self.config.credentials.validate()?;

        info!(
            file = file.file_name(),
            size = file.len(),
            digest = %file.digest(),
            "Pinning file"
        );

        let document = file
            .is_json()
            .then(|| serde_json::from_slice::<&RawValue>(file.bytes()).ok())
            .flatten();

        let receipt = match document {
            Some(document) => self.pin_json(document, file.file_name()).await,
            None => self.pin_file(&file).await,
        }
        .inspect_err(|e| error!("Failed to pin {}: {e}", file.file_name()))?;

        if receipt.is_duplicate == Some(true) {
            warn!(cid = %receipt.ipfs_hash, "Content was already pinned");
        }

        Ok(receipt.ipfs_hash)
    }
}

fn check_response(response: &PinResponse) -> Result<(), PinError> {
    if response.ok {
        return Ok(());
    }

    Err(PinError::Rejected {
        status: response.status.as_u16(),
        message: error_message(response),
    })
}

fn receipt(response: PinResponse) -> Result<PinReceipt, PinError> {
    check_response(&response)?;

    let receipt = response
        .json()
        .and_then(|data| serde_json::from_value::<PinReceipt>(data.clone()).ok())
        .ok_or_else(|| PinError::MissingIdentifier {
            status: response.status.as_u16(),
            body: response.body.clone(),
        })?;

    if receipt.ipfs_hash.as_str().trim().is_empty() {
        return Err(PinError::MissingIdentifier {
            status: response.status.as_u16(),
            body: response.body,
        });
    }

    debug!(
        cid = %receipt.ipfs_hash,
        size = ?receipt.pin_size,
        pinned_at = ?receipt.pinned_at(),
        "Pinned"
    );
    Ok(receipt)
}

/// Pinata reports errors as `{"error": "..."}` or
/// `{"error": {"reason": "...", "details": "..."}}`.
fn error_message(response: &PinResponse) -> String {
    let from_json = response
        .json()
        .and_then(|data| data.get("error"))
        .and_then(|err| match err {
            Value::String(message) => Some(message.clone()),
            Value::Object(fields) => {
                let reason = fields.get("reason").and_then(Value::as_str);
                let details = fields.get("details").and_then(Value::as_str);
                match (reason, details) {
                    (Some(reason), Some(details)) => Some(format!("{reason}: {details}")),
                    (Some(text), None) | (None, Some(text)) => Some(text.to_string()),
                    (None, None) => None,
                }
            }
            _ => None,
        });

    from_json
        .or_else(|| (!response.body.trim().is_empty()).then(|| response.body.clone()))
        .unwrap_or_else(|| response.status_text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn client(server: &ServerGuard) -> PinataClient {
        PinataClient::new(
            PinataConfig::new(PinningCredentials::new("key", "secret")).with_api_url(server.url()),
        )
    }

    fn image() -> GenericFile {
        GenericFile::new(b"0123456789".to_vec(), "image.jpg", Some("image/jpeg".into()))
    }

    #[tokio::test]
    async fn pins_binary_file_as_multipart() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pinning/pinFileToIPFS")
            .match_header(API_KEY_HEADER, "key")
            .match_header(SECRET_KEY_HEADER, "secret")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"filename="image.jpg""#.into()),
                Matcher::Regex(r#"name="pinataMetadata""#.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"IpfsHash":"QmImage","PinSize":10,"Timestamp":"2024-05-01T12:00:00.000Z"}"#)
            .expect(1)
            .create_async()
            .await;

        let receipt = client(&server).pin_file(&image()).await.unwrap();

        assert_eq!(receipt.ipfs_hash.as_str(), "QmImage");
        assert_eq!(receipt.pin_size, Some(10));
        assert!(receipt.pinned_at().is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn pins_json_file_as_document() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pinning/pinJSONToIPFS")
            .match_body(Matcher::PartialJson(json!({
                "pinataContent": { "name": "NAME" },
                "pinataMetadata": { "name": "metadata.json" },
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"IpfsHash":"QmMeta"}"#)
            .expect(1)
            .create_async()
            .await;

        let file = GenericFile::from_json(&json!({ "name": "NAME" }), "metadata.json").unwrap();
        let cid = client(&server).pin(file).await.unwrap();

        assert_eq!(cid, ContentId::new("QmMeta"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn json_document_is_pinned_byte_for_byte() {
        let document = r#"{"name":"NAME","description":"","image":"https://gw/ipfs/Qma","attributes":[]}"#;

        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pinning/pinJSONToIPFS")
            .match_header("content-type", JSON_CONTENT_TYPE)
            .match_body(Matcher::Exact(format!(
                r#"{{"pinataContent":{document},"pinataMetadata":{{"name":"metadata.json"}}}}"#
            )))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"IpfsHash":"QmMeta"}"#)
            .expect(1)
            .create_async()
            .await;

        let file = GenericFile::new(
            document.as_bytes().to_vec(),
            "metadata.json",
            Some(JSON_CONTENT_TYPE.into()),
        );
        let cid = client(&server).pin(file).await.unwrap();

        assert_eq!(cid.as_str(), "QmMeta");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_backend_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"reason":"INVALID_CREDENTIALS","details":"Invalid API key"}}"#)
            .create_async()
            .await;

        let err = client(&server).pin(image()).await.unwrap_err();

        match err {
            PinError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "INVALID_CREDENTIALS: Invalid API key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn server_error_without_body_uses_status_text() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client(&server).pin(image()).await.unwrap_err();

        assert!(
            matches!(&err, PinError::Rejected { status: 500, message } if message == "Internal Server Error"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn success_without_identifier_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"PinSize":10}"#)
            .create_async()
            .await;

        let err = client(&server).pin(image()).await.unwrap_err();

        assert!(matches!(err, PinError::MissingIdentifier { status: 200, .. }));
    }

    #[tokio::test]
    async fn blank_identifier_is_an_error() {
        for body in [r#"{"IpfsHash":""}"#, r#"{"IpfsHash":"  "}"#] {
            let mut server = Server::new_async().await;
            server
                .mock("POST", Matcher::Any)
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body)
                .create_async()
                .await;

            let err = client(&server).pin(image()).await.unwrap_err();

            assert!(
                matches!(&err, PinError::MissingIdentifier { status: 200, body: got } if got == body),
                "unexpected error: {err}"
            );
        }
    }

    #[tokio::test]
    async fn empty_credentials_never_reach_the_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = PinataClient::new(
            PinataConfig::new(PinningCredentials::new("key", "")).with_api_url(server.url()),
        );
        let err = client.pin(image()).await.unwrap_err();

        assert!(matches!(
            err,
            PinError::Configuration(ConfigError::EmptyCredential("secret_api_key"))
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn cancellation_is_threaded_into_requests() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let signal = CancellationToken::new();
        let client = client(&server).with_cancellation(signal.clone());
        signal.cancel();

        let err = client.pin(image()).await.unwrap_err();

        assert!(matches!(err, PinError::Transport(TransportError::Cancelled)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn authentication_check_returns_message() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/data/testAuthentication")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Congratulations! You are communicating with the Pinata API!"}"#)
            .create_async()
            .await;

        let message = client(&server).test_authentication().await.unwrap();

        assert!(message.starts_with("Congratulations"));
    }
}
