use serde::{Deserialize, Serialize};

/// Error document returned by the gateway, in XML or JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "Error")]
pub struct ErrorBody {
    #[serde(rename = "Code", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "RequestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Authenticated caller, injected into request extensions by the gateway middleware
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub access_key: String,
    pub api_name: String,
    pub api_version: String,
    /// Query and form parameters covered by the verified signature
    pub parameters: Vec<EchoParameter>,
}

/// Body returned by the gateway's echo endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "EchoResponse")]
pub struct EchoResponse {
    pub api_name: String,
    pub api_version: String,
    pub access_key: String,
    #[serde(default)]
    pub parameters: Vec<EchoParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoParameter {
    pub name: String,
    pub value: String,
}
