use crate::auth::CredentialsStore;
use std::time::Duration;

/// Default tolerated difference between a request timestamp and the gateway clock
pub const DEFAULT_MAX_SKEW: Duration = Duration::from_secs(15 * 60);

/// Shared gateway state
#[derive(Clone, Debug)]
pub struct AppState {
    pub credentials: CredentialsStore,
    pub max_skew: Duration,
}

impl AppState {
    pub fn new(credentials: CredentialsStore, max_skew: Duration) -> Self {
        Self {
            credentials,
            max_skew,
        }
    }
}
