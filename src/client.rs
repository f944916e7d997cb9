use crate::auth::{self, SDK_VERSION, SignedHeaders};
use crate::decode::{self, Decoded, ResponseFormat};
use crate::request::{CsbRequest, Method};
use crate::types::{error::CsbError, models::ErrorBody};
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw gateway response, before body decoding
#[derive(Debug, Clone)]
pub struct CsbResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

impl CsbResponse {
    pub fn format(&self) -> ResponseFormat {
        ResponseFormat::classify(&self.content_type)
    }

    /// Decode the body according to the response's content type
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Decoded<T>, CsbError> {
        decode::decode(self.format(), &self.body)
    }
}

/// Client for calling APIs published through CSB
///
/// Connection pooling, TLS and redirects are left to the wrapped `reqwest::Client`.
/// The client holds no per-call state and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct CsbClient {
    client: Client,
}

impl CsbClient {
    /// Create a new client with the given default timeout
    pub fn new(timeout: Duration) -> Result<Self, CsbError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?;

        Ok(Self { client })
    }

    /// Create a new client with the default 30 second timeout.
    pub fn with_default_timeout() -> Result<Self, CsbError> {
        Self::new(DEFAULT_TIMEOUT)
    }

    /// Sign and send a request, then decode the body into `T`
    ///
    /// JSON and XML bodies are deserialized; anything else comes back as text.
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: &CsbRequest,
    ) -> Result<Decoded<T>, CsbError> {
        self.send(request).await?.decode()
    }

    /// Sign and send a request, returning the raw response
    ///
    /// Non-success statuses are turned into `CsbError::Service` using the
    /// gateway's error document when it can be parsed.
    pub async fn send(&self, request: &CsbRequest) -> Result<CsbResponse, CsbError> {
        let params = request.signing_params();
        let signed = auth::sign(
            &params,
            request.api_name(),
            request.api_version(),
            request.credentials(),
        );
        let headers = build_headers(request, &signed)?;

        let url = request.target_url();
        tracing::debug!(
            method = request.method().as_str(),
            url = %url,
            api_name = request.api_name(),
            api_version = request.api_version(),
            timestamp = signed.timestamp(),
            "CSB request"
        );

        let mut builder = self
            .client
            .request(request.method().into(), url)
            .headers(headers);

        let body = request.body_bytes();
        if !body.is_empty() || request.method() == Method::Post {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;

        tracing::debug!(status = status.as_u16(), content_type = %content_type, "CSB response");

        let response = CsbResponse {
            status,
            content_type,
            body,
        };

        if !status.is_success() {
            return Err(service_error(&response));
        }

        Ok(response)
    }
}

fn user_agent() -> String {
    format!(
        "csb-client-rust/{} (sdk {})",
        env!("CARGO_PKG_VERSION"),
        SDK_VERSION
    )
}

/// Assemble outgoing headers: caller headers, then content type, then the signed set
///
/// Signed headers replace any caller header with the same name.
fn build_headers(request: &CsbRequest, signed: &SignedHeaders) -> Result<HeaderMap, CsbError> {
    let mut headers = HeaderMap::new();

    for (name, value) in request.headers() {
        let (name, value) = header_pair(name, value)?;
        headers.append(name, value);
    }

    if !headers.contains_key(CONTENT_TYPE) {
        let (_, value) = header_pair(CONTENT_TYPE.as_str(), request.content_type())?;
        headers.insert(CONTENT_TYPE, value);
    }

    let signed = HeaderMap::try_from(signed)?;
    for (name, value) in signed.iter() {
        headers.insert(name.clone(), value.clone());
    }

    Ok(headers)
}

/// The five signed headers as an HTTP header map
impl TryFrom<&SignedHeaders> for HeaderMap {
    type Error = CsbError;

    fn try_from(signed: &SignedHeaders) -> Result<Self, Self::Error> {
        let mut headers = HeaderMap::with_capacity(5);
        for (name, value) in signed.iter() {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), CsbError> {
    let invalid = |source: Box<dyn std::error::Error + Send + Sync>| CsbError::InvalidHeader {
        name: name.to_string(),
        source,
    };

    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(Box::new(e)))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(Box::new(e)))?;
    Ok((header_name, header_value))
}

/// Build a service error from a non-success response
fn service_error(response: &CsbResponse) -> CsbError {
    let parsed: Option<ErrorBody> = match response.format() {
        ResponseFormat::Json => serde_json::from_slice(&response.body).ok(),
        ResponseFormat::Xml => std::str::from_utf8(&response.body)
            .ok()
            .and_then(|text| quick_xml::de::from_str(text).ok()),
        ResponseFormat::Plain => None,
    };

    let (message, request_id) = match parsed {
        Some(body) => (body.message, body.request_id),
        None => (String::from_utf8_lossy(&response.body).into_owned(), None),
    };

    tracing::warn!(
        status = response.status.as_u16(),
        request_id = request_id.as_deref().unwrap_or("-"),
        "CSB returned error: {}",
        message
    );

    CsbError::Service {
        status: response.status.as_u16(),
        message,
        request_id,
    }
}
