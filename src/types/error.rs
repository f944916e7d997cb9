use super::models::ErrorBody;
use crate::decode::ResponseFormat;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quick_xml::se::to_string as to_xml_string;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to callers of the CSB client
#[derive(Debug, Error)]
pub enum CsbError {
    /// Method other than `get` / `post`
    #[error("bad method '{0}', only 'get' or 'post' are supported")]
    InvalidMethod(String),

    /// Neither access key nor secret key supplied.
    #[error("bad request params, accessKey and secretKey must be defined")]
    MissingCredentials,

    /// Only one of access key / secret key supplied.
    #[error("bad request params, accessKey and secretKey must be defined together")]
    PartialCredentials,

    #[error("bad request params, api name or version not defined")]
    MissingApi,

    #[error("content-type must be defined")]
    MissingContentType,

    #[error("bad request url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Caller-supplied header that cannot be put on the wire.
    #[error("invalid header '{name}'")]
    InvalidHeader {
        name: String,
        #[source]
        source: BoxError,
    },

    /// Connection, timeout or protocol failure from the HTTP transport.
    #[error("http request failed")]
    Transport(#[from] reqwest::Error),

    #[error("{format} decode failed")]
    Decode {
        format: ResponseFormat,
        #[source]
        source: BoxError,
    },

    /// Non-success status returned by the gateway.
    #[error(
        "csb: service returned error: status={status}, message={message}, request_id={}",
        .request_id.as_deref().unwrap_or("-")
    )]
    Service {
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    #[error("failed to load config from '{path}'")]
    Config {
        path: String,
        #[source]
        source: BoxError,
    },
}

impl CsbError {
    /// True for precondition failures detected before any network activity
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CsbError::InvalidMethod(_)
                | CsbError::MissingCredentials
                | CsbError::PartialCredentials
                | CsbError::MissingApi
                | CsbError::MissingContentType
                | CsbError::InvalidUrl { .. }
                | CsbError::InvalidHeader { .. }
        )
    }

    /// Check if the transport gave up because of a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CsbError::Transport(e) if e.is_timeout())
    }
}

/// Gateway-side errors, rendered the way CSB renders them
#[derive(Debug)]
pub enum GatewayError {
    MissingHeader(&'static str),
    AccessDenied,
    SignatureDoesNotMatch,
    RequestTimeTooSkewed,
    InvalidRequest(String),
    InternalError(String),
}

impl GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            GatewayError::AccessDenied => StatusCode::FORBIDDEN,
            GatewayError::SignatureDoesNotMatch => StatusCode::FORBIDDEN,
            GatewayError::RequestTimeTooSkewed => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            GatewayError::MissingHeader(_) => "MissingHeader",
            GatewayError::AccessDenied => "AccessDenied",
            GatewayError::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            GatewayError::RequestTimeTooSkewed => "RequestTimeTooSkewed",
            GatewayError::InvalidRequest(_) => "InvalidRequest",
            GatewayError::InternalError(_) => "InternalError",
        }
    }

    fn message(&self) -> String {
        match self {
            GatewayError::MissingHeader(name) => format!("Missing {} header", name),
            GatewayError::AccessDenied => "Access Denied".to_string(),
            GatewayError::SignatureDoesNotMatch => {
                "The request signature we calculated does not match the signature you provided."
                    .to_string()
            }
            GatewayError::RequestTimeTooSkewed => {
                "The difference between the request time and the server's time is too large."
                    .to_string()
            }
            GatewayError::InvalidRequest(msg) => msg.clone(),
            GatewayError::InternalError(msg) => format!("Internal Error: {}", msg),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let error_response = ErrorBody {
            code: Some(self.error_code().to_string()),
            message: self.message(),
            request_id: Some(uuid::Uuid::new_v4().to_string()),
        };

        let body = to_xml_string(&error_response).unwrap_or_else(|_| {
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
    <Code>InternalError</Code>
    <Message>Failed to serialize error response</Message>
</Error>"#
                .to_string()
        });

        (self.status_code(), [("content-type", "text/xml")], body).into_response()
    }
}
