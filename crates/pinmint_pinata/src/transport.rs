use bytes::Bytes;
use pinmint_core::file::{JSON_CONTENT_TYPE, is_json_content_type};
use pinmint_core::prelude::*;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

pub const API_KEY_HEADER: &str = "pinata_api_key";
pub const SECRET_KEY_HEADER: &str = "pinata_secret_api_key";

const REQUIRED_HEADERS: [&str; 2] = [API_KEY_HEADER, SECRET_KEY_HEADER];

/// One field of a multipart form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        data: Bytes,
    },
    Text {
        name: String,
        value: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Raw(Bytes),
    Multipart(Vec<FormPart>),
    Json(Value),
}

/// A transport-agnostic description of a call to the pinning service.
#[derive(Debug, Clone)]
pub struct PinRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
    /// Cancels the call when fired, including before it was sent.
    pub signal: Option<CancellationToken>,
}

impl PinRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: RequestBody::Empty,
            signal: None,
        }
    }

    /// Sets a header, replacing any existing one regardless of case.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_signal(mut self, signal: Option<CancellationToken>) -> Self {
        self.signal = signal;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct PinResponse {
    pub status: StatusCode,
    pub ok: bool,
    pub status_text: String,
    /// Lower-cased header names. Repeated headers are joined with `", "`.
    pub headers: HashMap<String, String>,
    pub body: String,
    pub data: ResponseData,
}

impl PinResponse {
    pub fn json(&self) -> Option<&Value> {
        match &self.data {
            ResponseData::Json(value) => Some(value),
            ResponseData::Text(_) => None,
        }
    }

    pub fn json_str(&self, field: &str) -> Option<&str> {
        self.json()?.get(field)?.as_str()
    }
}

/// Sends [`PinRequest`]s with `reqwest`.
///
/// Never retries: the pinning service may bill every attempt.
#[derive(Clone, Debug, Default)]
pub struct PinataTransport {
    client: Client,
}

impl PinataTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: PinRequest) -> Result<PinResponse, PinError> {
        validate_credentials(&request)?;

        let PinRequest {
            method,
            url,
            headers,
            body,
            signal,
        } = request;

        let mut header_map = to_header_map(&headers)?;
        let builder = self.client.request(method, &url);

        let builder = match body {
            RequestBody::Empty => builder.headers(header_map),
            RequestBody::Raw(bytes) => builder.headers(header_map).body(bytes),
            RequestBody::Json(value) => {
                if !header_map.contains_key(CONTENT_TYPE) {
                    header_map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                }
                let text = serde_json::to_string(&value).map_err(TransportError::Decode)?;
                builder.headers(header_map).body(text)
            }
            RequestBody::Multipart(parts) => {
                // The form supplies its own boundary.
                header_map.remove(CONTENT_TYPE);
                builder.headers(header_map).multipart(multipart_form(parts)?)
            }
        };

        match signal {
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => {
                        warn!("Request cancelled before completion");
                        Err(TransportError::Cancelled.into())
                    }
                    response = execute(builder) => response,
                }
            }
            None => execute(builder).await,
        }
    }
}

fn validate_credentials(request: &PinRequest) -> Result<(), ConfigError> {
    REQUIRED_HEADERS
        .iter()
        .find(|key| request.header(key).is_none())
        .map_or(Ok(()), |key| {
            Err(ConfigError::MissingCredential(key.to_string()))
        })
}

fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let invalid = |name: &str, reason: String| ConfigError::InvalidHeader {
        name: name.to_string(),
        reason,
    };

    headers
        .iter()
        .map(|(name, value)| {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid(name, e.to_string()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| invalid(name, e.to_string()))?;
            Ok::<_, ConfigError>((header_name, header_value))
        })
        .collect()
}

fn multipart_form(parts: Vec<FormPart>) -> Result<Form, ConfigError> {
    parts.into_iter().try_fold(Form::new(), |form, part| match part {
        FormPart::Text { name, value } => Ok(form.text(name, value)),
        FormPart::File {
            name,
            file_name,
            content_type,
            data,
        } => {
            let mut file = Part::bytes(data.to_vec()).file_name(file_name);
            if let Some(content_type) = content_type.filter(|ct| !ct.is_empty()) {
                file = file
                    .mime_str(&content_type)
                    .map_err(|e| ConfigError::InvalidHeader {
                        name: CONTENT_TYPE.to_string(),
                        reason: e.to_string(),
                    })?;
            }
            Ok(form.part(name, file))
        }
    })
}

async fn execute(builder: RequestBuilder) -> Result<PinResponse, PinError> {
    let response = builder.send().await.map_err(|e| {
        error!("Request to pinning service failed: {e}");
        TransportError::Network(Box::new(e))
    })?;

    let status = response.status();
    let headers = normalize_headers(response.headers());
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Network(Box::new(e)))?;

    let is_json = headers
        .get(CONTENT_TYPE.as_str())
        .is_some_and(|ct| is_json_content_type(ct));

    let data = if is_json {
        match serde_json::from_str(&body) {
            Ok(value) => ResponseData::Json(value),
            // Error pages are still reported by status, not as a decode failure.
            Err(e) if !status.is_success() => {
                debug!("Ignoring malformed JSON in error response: {e}");
                ResponseData::Text(body.clone())
            }
            Err(e) => return Err(TransportError::Decode(e).into()),
        }
    } else {
        ResponseData::Text(body.clone())
    };

    debug!(status = status.as_u16(), "Pinning service responded");

    Ok(PinResponse {
        status,
        ok: status.is_success(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
        data,
    })
}

fn normalize_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut normalized: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        normalized
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    normalized
}
