use super::signature::{
    ACCESS_KEY_FIELD, API_NAME_FIELD, API_VERSION_FIELD, SIGNATURE_FIELD, SignatureClaims,
    TIMESTAMP_FIELD, validate_timestamp, verify_signature,
};
use crate::{
    app_state::AppState,
    types::{AuthContext, EchoParameter, error::GatewayError},
};
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::{BTreeMap, HashMap};

/// Largest request body the gateway will buffer for signature checks
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// CSB signature authentication middleware
///
/// Validates incoming requests the way the CSB gateway does:
/// 1. Reads the api name, version, access key, timestamp and signature headers
/// 2. Looks up credentials by access key
/// 3. Rejects timestamps outside the configured skew window
/// 4. Collects query parameters and, for form bodies, form parameters
/// 5. Recomputes the signature and compares it with the presented one
/// 6. Injects AuthContext into request extensions for downstream handlers
///
/// Note: app_state must be captured in a closure when creating the middleware layer
pub async fn auth_middleware(app_state: AppState, request: Request, next: Next) -> Response {
    match authenticate(&app_state, request).await {
        Ok(request) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

async fn authenticate(app_state: &AppState, request: Request) -> Result<Request, GatewayError> {
    let claims = claims_from_headers(request.headers())?;

    let credentials = app_state.credentials.get(&claims.access_key).ok_or_else(|| {
        tracing::warn!("Unknown access key: {}", claims.access_key);
        GatewayError::AccessDenied
    })?;

    let max_skew_millis = i64::try_from(app_state.max_skew.as_millis()).unwrap_or(i64::MAX);
    validate_timestamp(
        &claims.timestamp,
        chrono::Utc::now().timestamp_millis(),
        max_skew_millis,
    )?;

    let mut params: HashMap<String, String> = request
        .uri()
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    // The body has to be buffered to read form parameters, then put back
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("Failed to read body: {}", e)))?;

    if is_form(&parts.headers) {
        params.extend(form_urlencoded::parse(&bytes).into_owned());
    }

    verify_signature(&params, &claims, credentials)?;

    let parameters = params
        .into_iter()
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .map(|(name, value)| EchoParameter { name, value })
        .collect();

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(AuthContext {
        access_key: claims.access_key,
        api_name: claims.api_name,
        api_version: claims.api_version,
        parameters,
    });

    Ok(request)
}

/// Read the five signature headers
fn claims_from_headers(headers: &HeaderMap) -> Result<SignatureClaims, GatewayError> {
    let required = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(GatewayError::MissingHeader(name))
    };

    Ok(SignatureClaims {
        api_name: required(API_NAME_FIELD)?,
        api_version: required(API_VERSION_FIELD)?,
        access_key: required(ACCESS_KEY_FIELD)?,
        timestamp: required(TIMESTAMP_FIELD)?,
        signature: required(SIGNATURE_FIELD)?,
    })
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}
