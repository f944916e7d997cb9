use crate::auth::Credentials;
use crate::config::RequestConfig;
use crate::types::error::CsbError;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// HTTP methods accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl FromStr for Method {
    type Err = CsbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("get") {
            Ok(Method::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Ok(Method::Post)
        } else {
            Err(CsbError::InvalidMethod(s.to_string()))
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A validated, immutable description of one CSB call
#[derive(Debug, Clone)]
pub struct CsbRequest {
    url: Url,
    method: Method,
    credentials: Credentials,
    api_name: String,
    api_version: String,
    content_type: String,
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    form: BTreeMap<String, String>,
    body: Option<Bytes>,
    timeout: Option<Duration>,
}

impl TryFrom<RequestConfig> for CsbRequest {
    type Error = CsbError;

    /// Validate a request description
    ///
    /// Checks run in order: method, credentials, api name/version, content type, url.
    /// The first failing check is reported.
    fn try_from(config: RequestConfig) -> Result<Self, Self::Error> {
        let method: Method = config.api_method.parse()?;
        let credentials = Credentials::from_parts(config.access_key, config.secret_key)?;

        if config.api_name.is_empty() || config.api_version.is_empty() {
            return Err(CsbError::MissingApi);
        }
        if config.content_type.is_empty() {
            return Err(CsbError::MissingContentType);
        }

        let url = Url::parse(&config.url).map_err(|source| CsbError::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;

        Ok(Self {
            url,
            method,
            credentials,
            api_name: config.api_name,
            api_version: config.api_version,
            content_type: config.content_type,
            headers: config.headers.into_iter().collect(),
            query: config.query.into_iter().collect(),
            form: config.form.into_iter().collect(),
            body: config.body.map(Bytes::from),
            timeout: config.timeout_ms.map(Duration::from_millis),
        })
    }
}

impl CsbRequest {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Caller-supplied headers, sent before the signed ones
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Replace the body with raw bytes (files, JSON documents, ...)
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The parameter set covered by the signature: query parameters merged with
    /// form parameters, a form value winning over a query value with the same key
    pub fn signing_params(&self) -> HashMap<String, String> {
        self.query
            .iter()
            .chain(self.form.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Request URL with the query parameters appended
    ///
    /// Parameters are URL-encoded and added after any query already present in the URL.
    pub fn target_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }

    /// The explicit body if one was given, otherwise the url-encoded form parameters
    pub fn body_bytes(&self) -> Bytes {
        match &self.body {
            Some(body) => body.clone(),
            None => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(self.form.iter())
                    .finish();
                Bytes::from(encoded)
            }
        }
    }
}
