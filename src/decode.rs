//! Content-type driven decoding of CSB response bodies.

use crate::types::error::CsbError;
use serde::de::DeserializeOwned;
use std::fmt;

/// Body formats the gateway can answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Xml,
    Plain,
}

impl ResponseFormat {
    /// Classify a `Content-Type` header value
    ///
    /// Matching is by case-sensitive substring, so parameters such as
    /// `; charset=utf-8` are ignored. Only `application/json` and `text/xml`
    /// select a structured decoder.
    pub fn classify(content_type: &str) -> Self {
        if content_type.contains("application/json") {
            ResponseFormat::Json
        } else if content_type.contains("text/xml") {
            ResponseFormat::Xml
        } else {
            ResponseFormat::Plain
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
            ResponseFormat::Plain => "plain",
        };
        f.write_str(name)
    }
}

/// A decoded response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    /// JSON or XML body deserialized into the caller's type
    Structured(T),
    /// Any other body, returned verbatim
    Text(String),
}

impl<T> Decoded<T> {
    pub fn structured(self) -> Option<T> {
        match self {
            Decoded::Structured(value) => Some(value),
            Decoded::Text(_) => None,
        }
    }

    pub fn text(self) -> Option<String> {
        match self {
            Decoded::Structured(_) => None,
            Decoded::Text(text) => Some(text),
        }
    }
}

/// Decode `body` according to `format`
pub fn decode<T: DeserializeOwned>(
    format: ResponseFormat,
    body: &[u8],
) -> Result<Decoded<T>, CsbError> {
    match format {
        ResponseFormat::Json => serde_json::from_slice(body)
            .map(Decoded::Structured)
            .map_err(|e| decode_error(format, e)),
        ResponseFormat::Xml => {
            let text = std::str::from_utf8(body).map_err(|e| decode_error(format, e))?;
            quick_xml::de::from_str(text)
                .map(Decoded::Structured)
                .map_err(|e| decode_error(format, e))
        }
        ResponseFormat::Plain => Ok(Decoded::Text(String::from_utf8_lossy(body).into_owned())),
    }
}

fn decode_error(
    format: ResponseFormat,
    source: impl std::error::Error + Send + Sync + 'static,
) -> CsbError {
    tracing::warn!(%format, error = %source, "Failed to decode response body");
    CsbError::Decode {
        format,
        source: Box::new(source),
    }
}
