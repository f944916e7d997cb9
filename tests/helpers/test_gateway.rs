use csb_client::{
    AppState, Credentials, CredentialsStore, CsbClient, RequestConfig,
    app_state::DEFAULT_MAX_SKEW, create_app,
};
use tokio::task::JoinHandle;

/// Test gateway handle that automatically shuts down on drop
///
/// This starts a real HTTP server on a random port for integration testing.
/// The gateway uses the actual production code via create_app().
/// It also provides a CsbClient and request configs pointing at the gateway.
pub struct TestGateway {
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    #[allow(dead_code)] // Keep handle alive to prevent task abort
    handle: JoinHandle<()>,
    pub client: CsbClient,
    pub base_url: String,
}

impl TestGateway {
    /// Start a gateway that accepts a single access key / secret key pair
    pub async fn start(access_key: &str, secret_key: &str) -> Self {
        let credentials = CredentialsStore::new([Credentials::new(access_key, secret_key)]);
        let app_state = AppState::new(credentials, DEFAULT_MAX_SKEW);

        // Use the ACTUAL production create_app function
        let app = create_app(app_state);

        // Bind to a random available port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Spawn server task
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        let client = CsbClient::with_default_timeout().unwrap();

        TestGateway {
            shutdown_tx: Some(shutdown_tx),
            handle,
            client,
            base_url: format!("http://{}", addr),
        }
    }

    /// A valid request description for `path` signed with the given keys
    pub fn request(&self, path: &str, access_key: &str, secret_key: &str) -> RequestConfig {
        RequestConfig {
            url: format!("{}{}", self.base_url, path),
            access_key: Some(access_key.to_string()),
            secret_key: Some(secret_key.to_string()),
            api_name: super::TEST_API_NAME.to_string(),
            api_method: "get".to_string(),
            api_version: super::TEST_API_VERSION.to_string(),
            content_type: "application/x-www-form-urlencoded".to_string(),
            ..Default::default()
        }
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        // Signal shutdown (ignore errors if already shut down)
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
