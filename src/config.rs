use crate::types::error::CsbError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Everything needed to describe one CSB call
///
/// All fields are spelled out; defaults are empty. Turn it into a validated
/// [`CsbRequest`](crate::request::CsbRequest) with `CsbRequest::try_from`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub api_name: String,
    pub api_method: String,
    pub api_version: String,
    pub content_type: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query: HashMap<String, String>,
    #[serde(default)]
    pub form: HashMap<String, String>,
    /// Raw request body; when absent the form parameters are encoded instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestConfig {
    /// Load a request description from a JSON or YAML file (chosen by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CsbError> {
        let path = path.as_ref();
        let config_error = |source: Box<dyn std::error::Error + Send + Sync>| CsbError::Config {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| config_error(Box::new(e)))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config: RequestConfig = if is_yaml {
            serde_yml::from_str(&content).map_err(|e| config_error(Box::new(e)))?
        } else {
            serde_json::from_str(&content).map_err(|e| config_error(Box::new(e)))?
        };
        Ok(config)
    }
}
