use crate::{app_state::AppState, auth, handlers};
use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    routing::get,
};
use tower_http::trace::TraceLayer;

/// Create the local gateway router with all routes and middleware
///
/// Every path accepts GET and POST and requires a valid CSB signature.
/// This function is used by both main.rs and integration tests to ensure
/// the same gateway configuration is used in both.
pub fn create_app(app_state: AppState) -> Router {
    use handlers::echo;

    Router::new()
        .route("/", get(echo).post(echo))
        .route("/{*path}", get(echo).post(echo))
        // Add authentication middleware (captures app_state)
        .layer(middleware::from_fn(move |request: Request, next: Next| {
            let state = app_state.clone();
            async move { auth::auth_middleware(state, request, next).await }
        }))
        // Add tracing
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::DEFAULT_MAX_SKEW;
    use crate::auth::{Credentials, CredentialsStore, sign};
    use axum::{body::Body, http, http::StatusCode};
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn app() -> Router {
        let store = CredentialsStore::new([Credentials::new("AK123", "SK456")]);
        create_app(AppState::new(store, DEFAULT_MAX_SKEW))
    }

    fn signed_request(uri: &str, params: &HashMap<String, String>, secret: &str) -> Request {
        let headers = sign(params, "echo", "1.0", &Credentials::new("AK123", secret));

        let mut builder = http::Request::builder().uri(uri);
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_unsigned_request_rejected() {
        let response = app()
            .oneshot(http::Request::builder().uri("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signed_query_accepted() {
        let params = HashMap::from([("foo".to_string(), "bar".to_string())]);
        let response = app()
            .oneshot(signed_request("/echo?foo=bar", &params, "SK456"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let params = HashMap::from([("foo".to_string(), "bar".to_string())]);
        let response = app()
            .oneshot(signed_request("/echo?foo=bar", &params, "wrong"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unsigned_query_param_rejected() {
        let params = HashMap::from([("foo".to_string(), "bar".to_string())]);
        let response = app()
            .oneshot(signed_request("/echo?foo=bar&extra=1", &params, "SK456"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_extreme_timestamp_rejected() {
        let request = http::Request::builder()
            .uri("/echo")
            .header("_api_name", "echo")
            .header("_api_version", "1.0")
            .header("_api_access_key", "AK123")
            .header("_api_timestamp", i64::MIN.to_string())
            .header("_api_signature", "abc=")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
