use csb_client::auth::{
    ACCESS_KEY_FIELD, API_NAME_FIELD, API_VERSION_FIELD, SECRET_KEY_FIELD, SIGNATURE_FIELD,
    TIMESTAMP_FIELD, compute_signature,
};
use csb_client::{Credentials, CsbError, CsbRequest, RequestConfig, canonicalize, sign_at};
use std::collections::HashMap;

const TIMESTAMP: i64 = 1_700_000_000_000;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_end_to_end_example() {
    let creds = Credentials::new("AK123", "SK456");
    let headers = sign_at(&params(&[("foo", "bar")]), "echo", "1.0", &creds, TIMESTAMP);

    let canonical =
        "_api_access_key=AK123&_api_name=echo&_api_timestamp=1700000000000&_api_version=1.0&foo=bar";
    assert_eq!(headers.canonical_string(), canonical);
    assert_eq!(headers.signature(), compute_signature(canonical, "SK456"));
    assert_eq!(headers.signature(), "OUGfgY4lbqw44ewd7ojnxN6FYOk=");
}

#[test]
fn test_order_independence() {
    let creds = Credentials::new("AK123", "SK456");

    let mut forward = HashMap::new();
    forward.insert("a".to_string(), "1".to_string());
    forward.insert("b".to_string(), "2".to_string());

    let mut backward = HashMap::new();
    backward.insert("b".to_string(), "2".to_string());
    backward.insert("a".to_string(), "1".to_string());

    assert_eq!(canonicalize(&forward), canonicalize(&backward));
    assert_eq!(
        sign_at(&forward, "echo", "1.0", &creds, TIMESTAMP).signature(),
        sign_at(&backward, "echo", "1.0", &creds, TIMESTAMP).signature()
    );
}

#[test]
fn test_exclusion_invariant() {
    let creds = Credentials::new("AK123", "SK456");
    let clean = params(&[("foo", "bar")]);
    let polluted = params(&[
        ("foo", "bar"),
        (SECRET_KEY_FIELD, "SK456"),
        (SIGNATURE_FIELD, "c29tZXRoaW5n"),
    ]);

    assert_eq!(
        sign_at(&clean, "echo", "1.0", &creds, TIMESTAMP).signature(),
        sign_at(&polluted, "echo", "1.0", &creds, TIMESTAMP).signature()
    );
}

#[test]
fn test_sort_correctness() {
    let keys = params(&[("b", "x"), ("a", "x"), ("B", "x"), ("10", "x"), ("2", "x")]);
    assert_eq!(canonicalize(&keys), "10=x&2=x&B=x&a=x&b=x");
}

#[test]
fn test_metadata_completeness() {
    let creds = Credentials::new("AK123", "SK456");

    for input in [
        params(&[]),
        params(&[("foo", "bar")]),
        params(&[(SIGNATURE_FIELD, "x"), (API_NAME_FIELD, "y"), ("z", "1")]),
    ] {
        let headers = sign_at(&input, "echo", "1.0", &creds, TIMESTAMP);
        let mut names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        names.sort_unstable();

        assert_eq!(
            names,
            vec![
                ACCESS_KEY_FIELD,
                API_NAME_FIELD,
                SIGNATURE_FIELD,
                TIMESTAMP_FIELD,
                API_VERSION_FIELD
            ]
        );
    }
}

#[test]
fn test_timestamp_changes_signature() {
    let creds = Credentials::new("AK123", "SK456");
    let input = params(&[("foo", "bar")]);

    assert_ne!(
        sign_at(&input, "echo", "1.0", &creds, TIMESTAMP).signature(),
        sign_at(&input, "echo", "1.0", &creds, TIMESTAMP + 1).signature()
    );
}

#[test]
fn test_validation_rejection() {
    let valid = RequestConfig {
        url: "http://localhost:8086/CSB".to_string(),
        access_key: Some("AK123".to_string()),
        secret_key: Some("SK456".to_string()),
        api_name: "echo".to_string(),
        api_method: "get".to_string(),
        api_version: "1.0".to_string(),
        content_type: "application/json".to_string(),
        ..Default::default()
    };
    assert!(CsbRequest::try_from(valid.clone()).is_ok());

    let put = RequestConfig {
        api_method: "put".to_string(),
        ..valid.clone()
    };
    assert!(matches!(
        CsbRequest::try_from(put),
        Err(CsbError::InvalidMethod(_))
    ));

    let partial = RequestConfig {
        secret_key: Some(String::new()),
        ..valid.clone()
    };
    assert!(matches!(
        CsbRequest::try_from(partial),
        Err(CsbError::PartialCredentials)
    ));

    let no_credentials = RequestConfig {
        access_key: None,
        secret_key: None,
        ..valid.clone()
    };
    let err = CsbRequest::try_from(no_credentials).unwrap_err();
    assert!(matches!(err, CsbError::MissingCredentials));
    assert!(err.is_validation());

    let no_content_type = RequestConfig {
        content_type: String::new(),
        ..valid
    };
    assert!(matches!(
        CsbRequest::try_from(no_content_type),
        Err(CsbError::MissingContentType)
    ));
}
