use super::canonical::canonicalize;
use super::credentials::Credentials;
use crate::types::error::GatewayError;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::HashMap;

type HmacSha1 = Hmac<Sha1>;

/// Protocol version of the CSB signing scheme implemented here
pub const SDK_VERSION: &str = "1.1.0";

pub const API_NAME_FIELD: &str = "_api_name";
pub const API_VERSION_FIELD: &str = "_api_version";
pub const ACCESS_KEY_FIELD: &str = "_api_access_key";
pub const SECRET_KEY_FIELD: &str = "_api_secret_key";
pub const SIGNATURE_FIELD: &str = "_api_signature";
pub const TIMESTAMP_FIELD: &str = "_api_timestamp";

/// The header set produced by signing one request
///
/// Always carries exactly five entries: api name, api version, timestamp,
/// access key and signature. The canonical string is kept for diagnostics
/// but is never sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    api_name: String,
    api_version: String,
    timestamp: String,
    access_key: String,
    signature: String,
    canonical: String,
}

impl SignedHeaders {
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The string the signature was computed over
    pub fn canonical_string(&self) -> &str {
        &self.canonical
    }

    /// Iterate over `(header name, value)` pairs in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (API_NAME_FIELD, self.api_name.as_str()),
            (API_VERSION_FIELD, self.api_version.as_str()),
            (TIMESTAMP_FIELD, self.timestamp.as_str()),
            (ACCESS_KEY_FIELD, self.access_key.as_str()),
            (SIGNATURE_FIELD, self.signature.as_str()),
        ]
        .into_iter()
    }

    /// Look up one header value by wire name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// Sign a request's parameters using the current wall-clock time
///
/// See [`sign_at`] for the algorithm.
pub fn sign(
    params: &HashMap<String, String>,
    api_name: &str,
    api_version: &str,
    credentials: &Credentials,
) -> SignedHeaders {
    let now = chrono::Utc::now().timestamp_millis();
    sign_at(params, api_name, api_version, credentials, now)
}

/// Sign a request's parameters at a fixed timestamp (milliseconds since epoch)
///
/// The caller's map is left untouched. A working copy:
/// 1. Receives the api name, api version, timestamp and access key fields
/// 2. Loses any secret key or signature entries
/// 3. Is canonicalized and signed with HMAC-SHA1 keyed by the secret key
///
/// The base64-encoded digest is returned alongside the four metadata fields.
pub fn sign_at(
    params: &HashMap<String, String>,
    api_name: &str,
    api_version: &str,
    credentials: &Credentials,
    timestamp_millis: i64,
) -> SignedHeaders {
    let timestamp = timestamp_millis.to_string();

    let signing_params = with_metadata(
        params,
        api_name,
        api_version,
        &timestamp,
        credentials.access_key(),
    );
    let canonical = canonicalize(&signing_params);
    tracing::trace!(canonical = %canonical, "Canonical parameter string");

    let signature = compute_signature(&canonical, credentials.expose_secret());

    SignedHeaders {
        api_name: api_name.to_string(),
        api_version: api_version.to_string(),
        timestamp,
        access_key: credentials.access_key().to_string(),
        signature,
        canonical,
    }
}

/// HMAC-SHA1 over the canonical string, base64 (standard alphabet) encoded
pub fn compute_signature(canonical: &str, secret_key: &str) -> String {
    let mac = keyed_mac(canonical, secret_key);
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Signature metadata presented by a caller, as read from the request headers
#[derive(Debug, Clone)]
pub struct SignatureClaims {
    pub api_name: String,
    pub api_version: String,
    pub access_key: String,
    pub timestamp: String,
    pub signature: String,
}

/// Recompute the signature for a received request and compare it with the claim
///
/// `params` holds the request's query and form parameters. The comparison runs in
/// constant time.
pub fn verify_signature(
    params: &HashMap<String, String>,
    claims: &SignatureClaims,
    credentials: &Credentials,
) -> Result<(), GatewayError> {
    let signing_params = with_metadata(
        params,
        &claims.api_name,
        &claims.api_version,
        &claims.timestamp,
        &claims.access_key,
    );
    let canonical = canonicalize(&signing_params);

    let provided = BASE64_STANDARD.decode(&claims.signature).map_err(|e| {
        tracing::warn!("Signature is not valid base64: {}", e);
        GatewayError::SignatureDoesNotMatch
    })?;

    keyed_mac(&canonical, credentials.expose_secret())
        .verify_slice(&provided)
        .map_err(|_| {
            tracing::warn!(
                access_key = %claims.access_key,
                "Signature mismatch for canonical string: {}",
                canonical
            );
            GatewayError::SignatureDoesNotMatch
        })
}

/// Check that a `_api_timestamp` value is within `max_skew_millis` of `now_millis`
pub fn validate_timestamp(
    timestamp: &str,
    now_millis: i64,
    max_skew_millis: i64,
) -> Result<(), GatewayError> {
    let request_time: i64 = timestamp.parse().map_err(|e| {
        tracing::warn!("Failed to parse timestamp '{}': {}", timestamp, e);
        GatewayError::InvalidRequest(format!("Invalid {} value", TIMESTAMP_FIELD))
    })?;

    if now_millis.abs_diff(request_time) > max_skew_millis.unsigned_abs() {
        return Err(GatewayError::RequestTimeTooSkewed);
    }

    Ok(())
}

fn with_metadata(
    params: &HashMap<String, String>,
    api_name: &str,
    api_version: &str,
    timestamp: &str,
    access_key: &str,
) -> HashMap<String, String> {
    let mut signing_params = params.clone();

    signing_params.insert(API_NAME_FIELD.to_string(), api_name.to_string());
    signing_params.insert(API_VERSION_FIELD.to_string(), api_version.to_string());
    signing_params.insert(TIMESTAMP_FIELD.to_string(), timestamp.to_string());
    signing_params.insert(ACCESS_KEY_FIELD.to_string(), access_key.to_string());

    signing_params.remove(SECRET_KEY_FIELD);
    signing_params.remove(SIGNATURE_FIELD);

    signing_params
}

fn keyed_mac(canonical: &str, secret_key: &str) -> HmacSha1 {
    // HMAC accepts keys of any length, including empty ones
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(canonical.as_bytes());
    mac
}
