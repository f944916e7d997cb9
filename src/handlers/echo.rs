use crate::types::{AuthContext, EchoResponse, error::GatewayError};
use axum::{
    Extension,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use quick_xml::se::to_string as to_xml_string;

/// GET|POST /{*path} - Echo back what the gateway verified
///
/// The last path segment picks the response format: `xml`, `plain`, or JSON otherwise.
pub async fn echo(
    uri: Uri,
    Extension(auth): Extension<AuthContext>,
) -> Result<Response, GatewayError> {
    tracing::info!(
        "Echo: api={}, version={}, access_key={}, params={}",
        auth.api_name,
        auth.api_version,
        auth.access_key,
        auth.parameters.len()
    );

    let echo = EchoResponse {
        api_name: auth.api_name,
        api_version: auth.api_version,
        access_key: auth.access_key,
        parameters: auth.parameters,
    };

    let format = uri.path().rsplit('/').next().unwrap_or_default();
    let response = match format {
        "xml" => {
            let body = to_xml_string(&echo)
                .map_err(|e| GatewayError::InternalError(format!("XML encoding: {}", e)))?;
            (StatusCode::OK, [("content-type", "text/xml")], body).into_response()
        }
        "plain" => {
            let body = echo
                .parameters
                .iter()
                .map(|p| format!("{}={}", p.name, p.value))
                .collect::<Vec<_>>()
                .join("\n");
            (StatusCode::OK, [("content-type", "text/plain")], body).into_response()
        }
        _ => {
            let body = serde_json::to_string(&echo)
                .map_err(|e| GatewayError::InternalError(format!("JSON encoding: {}", e)))?;
            (StatusCode::OK, [("content-type", "application/json")], body).into_response()
        }
    };

    Ok(response)
}
